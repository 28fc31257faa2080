//! Error payload returned by Binance on failed requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error_codes::{C2cErrorCode, ErrorCategory, RecoveryStrategy, TIMESTAMP_OUTSIDE_RECV_WINDOW};

/// `{"code": -1021, "msg": "..."}` body of a non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    /// Error code, only when the body carried it as a JSON number
    #[serde(default, deserialize_with = "de_code")]
    pub code: Option<i64>,
    /// Error message
    #[serde(default)]
    pub msg: Option<String>,
}

impl ApiErrorPayload {
    /// Parse an error body, returning `None` if it is not a JSON object
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Get the known error code, if recognized
    pub fn error_code(&self) -> Option<C2cErrorCode> {
        self.code.and_then(C2cErrorCode::from_code)
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        self.code
            .map(ErrorCategory::from_code)
            .unwrap_or(ErrorCategory::Unknown)
    }

    /// Get the recovery strategy for this payload
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        self.error_code()
            .map(|c| c.recovery_strategy())
            .unwrap_or_default()
    }

    /// Check if this payload reports clock skew (`-1021`)
    pub fn is_clock_skew(&self) -> bool {
        self.code == Some(TIMESTAMP_OUTSIDE_RECV_WINDOW)
    }
}

// A code sent as a string is not a Binance error code and never drives a retry.
fn de_code<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    })
}
