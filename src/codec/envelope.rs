//! Gateway envelope unwrapping.
//!
//! API gateways sometimes hand back the raw proxy integration result,
//! `{ "statusCode": 200, "headers": {...}, "body": "<json text>" }`, instead
//! of the payload itself. [`unwrap_response`] peels off exactly one such
//! layer; any other value passes through untouched.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};

/// A decoded response, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Object carrying both `statusCode` and `body`
    Envelope { status_code: Value, body: Value },
    /// Anything else
    Direct(Value),
}

impl Payload {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(mut map) if map.contains_key("statusCode") && map.contains_key("body") => {
                let status_code = map.remove("statusCode").unwrap_or(Value::Null);
                let body = map.remove("body").unwrap_or(Value::Null);
                Payload::Envelope { status_code, body }
            }
            other => Payload::Direct(other),
        }
    }

    /// The effective payload.
    pub fn into_inner(self) -> Result<Value> {
        match self {
            Payload::Envelope {
                body: Value::String(text),
                status_code,
            } => {
                log::debug!("Unwrapping gateway envelope (statusCode {status_code})");
                serde_json::from_str(&text).map_err(AppError::malformed_envelope)
            }
            Payload::Envelope { body, .. } => Ok(body),
            Payload::Direct(value) => Ok(value),
        }
    }
}

/// Unwrap one level of gateway envelope, if present.
pub fn unwrap_response(value: Value) -> Result<Value> {
    Payload::classify(value).into_inner()
}

/// Unwrap, then deserialize into the expected payload type.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(unwrap_response(value)?)?)
}
