// src/models/log_entry.rs

//! Execution log entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A single line of a lambda's execution log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub message: String,
}

/// Severity parsed out of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(AppError::validation(format!("unknown log level '{other}'"))),
        }
    }
}

/// Level named by a runtime log token; only the exact upper-case names count.
fn level_token(token: &str) -> Option<LogLevel> {
    match token {
        "DEBUG" => Some(LogLevel::Debug),
        "INFO" => Some(LogLevel::Info),
        "WARN" => Some(LogLevel::Warn),
        "ERROR" => Some(LogLevel::Error),
        _ => None,
    }
}

impl LogEntry {
    /// Split the message into its level and the text after it.
    ///
    /// Runtime lines look like `<time> <request-id> LEVEL text...`; anything
    /// else is treated as an `INFO` line shown verbatim.
    pub fn parts(&self) -> (LogLevel, String) {
        let parts: Vec<&str> = self.message.split(' ').collect();
        if let Some(level) = parts.get(2).and_then(|t| level_token(t)) {
            return (level, parts[3..].join(" "));
        }
        (LogLevel::Info, self.message.clone())
    }

    pub fn level(&self) -> LogLevel {
        self.parts().0
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Render as `<local time> [LEVEL] text`.
    pub fn display_line(&self) -> String {
        let (level, text) = self.parts();
        let time = self
            .time()
            .map(|t| {
                t.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| self.timestamp.to_string());
        format!("{time} [{level}] {text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: 1_700_000_000_000,
            message: message.to_string(),
        }
    }

    #[test]
    fn parses_level_in_third_position() {
        let (level, text) =
            entry("2024-01-15T10:30:00Z 8f1c ERROR smtp timeout after 30s").parts();
        assert_eq!(level, LogLevel::Error);
        assert_eq!(text, "smtp timeout after 30s");
    }

    #[test]
    fn defaults_to_info() {
        let e = entry("START RequestId: 1234");
        assert_eq!(e.level(), LogLevel::Info);
        assert_eq!(e.parts().1, "START RequestId: 1234");
    }

    #[test]
    fn level_must_match_exactly() {
        assert_eq!(entry("a b warn c").level(), LogLevel::Info);
        assert_eq!(entry("a b WARNING c").level(), LogLevel::Info);
        assert_eq!(entry("a b WARN").parts(), (LogLevel::Warn, String::new()));
    }

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    }

    #[test]
    fn display_line_contains_level_and_text() {
        let line = entry("t r DEBUG cache warm").display_line();
        assert!(line.ends_with("[DEBUG] cache warm"));
    }
}
