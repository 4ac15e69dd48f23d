//! Structured logging for signing and validation paths
//!
//! Entries are written to stderr as a single line:
//! `[timestamp] LEVEL [module] message | key=value ...`
//!
//! Field values are redacted by key name before they are stored:
//! - private keys and secrets are replaced entirely
//! - addresses keep their first and last characters
//! - hashes, raw encodings and signatures keep a short prefix and suffix

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Turn debug-level entries on or off at runtime
pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// How a field value is masked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Redaction {
    None,
    Full,
    Address,
    Digest,
}

const SECRET_KEYS: &[&str] = &["private_key", "privatekey", "secret", "key_hex", "signing_key"];
const ADDRESS_KEYS: &[&str] = &["address", "from", "fee_payer", "to"];
const DIGEST_KEYS: &[&str] = &["hash", "raw", "signature", "payload"];

fn classify(key: &str) -> Redaction {
    let key = key.to_lowercase();
    if SECRET_KEYS.iter().any(|k| key.contains(k)) {
        Redaction::Full
    } else if DIGEST_KEYS.iter().any(|k| key.contains(k)) {
        Redaction::Digest
    } else if ADDRESS_KEYS.iter().any(|k| key == *k || key.ends_with(&format!("_{}", k))) {
        Redaction::Address
    } else {
        Redaction::None
    }
}

fn apply(redaction: Redaction, value: &str) -> String {
    match redaction {
        Redaction::None => value.to_string(),
        Redaction::Full => redact_value(value),
        Redaction::Address => mask_middle(value, 6, 4),
        Redaction::Digest => mask_middle(value, 10, 6),
    }
}

fn redact_value(value: &str) -> String {
    if value.is_empty() {
        "[EMPTY]".to_string()
    } else {
        format!("[REDACTED:{}chars]", value.len())
    }
}

/// Keep `head` characters after an optional `0x` and the last `tail`
fn mask_middle(value: &str, head: usize, tail: usize) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let prefix_len = if trimmed.starts_with("0x") { head + 2 } else { head };
    if !trimmed.is_ascii() || trimmed.len() <= prefix_len + tail + 3 {
        return trimmed.to_string();
    }

    format!("{}...{}", &trimmed[..prefix_len], &trimmed[trimmed.len() - tail..])
}

/// One structured log line
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach a field, masked according to its key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let masked = apply(classify(key), &value.to_string());
        self.fields.push((key, masked));
        self
    }

    /// Attach a field that is always fully masked
    pub fn secret_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, redact_value(&value.to_string())));
        self
    }

    fn enabled(&self) -> bool {
        self.level != LogLevel::Debug || is_debug_enabled()
    }

    pub fn log(self) {
        if !self.enabled() {
            return;
        }
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        eprintln!("[{}] {}", timestamp, self);
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.level, self.module, self.message)?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " | " } else { " " };
            write!(f, "{}{}={}", sep, k, v)?;
        }
        Ok(())
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::$level,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($args:tt)*) => { $crate::__log_at!(Debug, $($args)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($args:tt)*) => { $crate::__log_at!(Info, $($args)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($args:tt)*) => { $crate::__log_at!(Warn, $($args)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($args:tt)*) => { $crate::__log_at!(Error, $($args)*) };
}
