//! Error types for REST API operations

use c2c_auth::AuthError;
use c2c_types::{ApiErrorPayload, C2cErrorCode, RecoveryStrategy};

use crate::transport::TransportError;

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// No response was obtained (connection error, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Credential or signing failure
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// API answered with a non-success status
    #[error("API error (HTTP {status}, code {code:?}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Binance error code, if the body carried one
        code: Option<i64>,
        /// Error message from the API (or the raw body)
        message: String,
        /// Raw response body
        body: String,
    },

    /// Failed to parse a response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Every attempt was used up without a definitive answer
    #[error("Gave up after {attempts} attempts")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
    },
}

impl RestError {
    /// Create an API error from a failed response
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let payload = ApiErrorPayload::parse(&body).unwrap_or_default();
        let message = payload.msg.clone().unwrap_or_else(|| body.clone());

        Self::Api {
            status,
            code: payload.code,
            message,
            body,
        }
    }

    /// Get the Binance error code, if this is a recognized API error
    pub fn error_code(&self) -> Option<C2cErrorCode> {
        match self {
            Self::Api { code, .. } => code.and_then(C2cErrorCode::from_code),
            _ => None,
        }
    }

    /// Get the recovery strategy for this error
    ///
    /// Only clock skew (`-1021`) yields a retrying strategy. Transport
    /// failures are not retried: the request may already have been applied.
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            Self::Api { .. } => self
                .error_code()
                .map(|c| c.recovery_strategy())
                .unwrap_or_default(),
            Self::Transport(_) | Self::Parse(_) => RecoveryStrategy::Manual,
            Self::Auth(_) | Self::InvalidParameter(_) | Self::RetriesExhausted { .. } => {
                RecoveryStrategy::Fatal
            }
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.recovery_strategy().allows_retry()
    }

    /// Check if this error is the server rejecting a stale timestamp
    pub fn is_clock_skew(&self) -> bool {
        self.error_code().is_some_and(|c| c.is_clock_skew())
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
