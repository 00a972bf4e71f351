// src/models/value.rs

//! Primitive type tags for configuration values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Primitive kind of a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
}

impl ValueKind {
    /// Infer the kind of a stored value.
    pub fn infer(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed == "true" || trimmed == "false" {
            ValueKind::Boolean
        } else if is_number(trimmed) {
            ValueKind::Number
        } else {
            ValueKind::String
        }
    }

    /// Check that `value` is acceptable for this kind.
    pub fn check(self, key: &str, value: &str) -> Result<()> {
        let ok = match self {
            ValueKind::String => true,
            ValueKind::Number => is_number(value.trim()),
            ValueKind::Boolean => matches!(value.trim(), "true" | "false"),
        };
        if ok {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "value '{value}' for '{key}' is not a valid {self}"
            )))
        }
    }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.parse::<f64>().is_ok_and(f64::is_finite)
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
        })
    }
}

impl FromStr for ValueKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "string" => Ok(ValueKind::String),
            "number" => Ok(ValueKind::Number),
            "boolean" | "bool" => Ok(ValueKind::Boolean),
            other => Err(AppError::validation(format!("unknown value kind '{other}'"))),
        }
    }
}
