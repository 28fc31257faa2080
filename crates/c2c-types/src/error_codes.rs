//! Binance API error code mapping with recovery strategies
//!
//! Binance reports failures as a negative numeric `code`. Only one of them,
//! `-1021` (timestamp outside of recvWindow), is caused by clock drift and is
//! fixed by re-signing with a fresh timestamp, so it is the only code mapped
//! to a retrying strategy.

/// Code returned when the request timestamp falls outside `recvWindow`
pub const TIMESTAMP_OUTSIDE_RECV_WINDOW: i64 = -1021;

/// Recovery strategy for handling API errors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecoveryStrategy {
    /// Re-sign with a fresh timestamp and resend
    ///
    /// The pause before resending is client configuration.
    Retry,
    /// Requires user intervention (e.g. fix the API key permissions)
    UserAction { message: &'static str },
    /// Cannot recover programmatically
    Fatal,
    /// Manual investigation needed
    #[default]
    Manual,
}

impl RecoveryStrategy {
    /// Check if this strategy allows retry
    pub fn allows_retry(&self) -> bool {
        matches!(self, Self::Retry)
    }
}

/// Binance error categories, derived from the code range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// -1000..=-1099: server or network issues
    Server,
    /// -1100..=-1199: request parameter issues
    Request,
    /// -2000..=-2099: key and order processing issues
    Processing,
    /// Anything else, including C2C-specific codes
    Unknown,
}

impl ErrorCategory {
    /// Categorize a raw Binance error code
    pub fn from_code(code: i64) -> Self {
        match code {
            -1099..=-1000 => Self::Server,
            -1199..=-1100 => Self::Request,
            -2099..=-2000 => Self::Processing,
            _ => Self::Unknown,
        }
    }
}

/// Known Binance error codes relevant to signed SAPI requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum C2cErrorCode {
    /// -1000: unknown error while processing the request
    Unknown,
    /// -1002: not authorized to execute this request
    Unauthorized,
    /// -1003: too many requests
    TooManyRequests,
    /// -1007: backend timed out
    Timeout,
    /// -1021: timestamp outside of recvWindow
    TimestampOutsideRecvWindow,
    /// -1022: signature is not valid
    InvalidSignature,
    /// -1100: illegal characters in a parameter
    IllegalChars,
    /// -1102: mandatory parameter missing or malformed
    MandatoryParamEmptyOrMalformed,
    /// -1104: not all sent parameters were read
    UnreadParameters,
    /// -1131: recvWindow must be less than 60000
    BadRecvWindow,
    /// -2014: API key format invalid
    BadApiKeyFormat,
    /// -2015: invalid API key, IP, or permissions for action
    RejectedApiKey,
}

impl C2cErrorCode {
    /// Map a raw code to a known error code
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            -1000 => Self::Unknown,
            -1002 => Self::Unauthorized,
            -1003 => Self::TooManyRequests,
            -1007 => Self::Timeout,
            TIMESTAMP_OUTSIDE_RECV_WINDOW => Self::TimestampOutsideRecvWindow,
            -1022 => Self::InvalidSignature,
            -1100 => Self::IllegalChars,
            -1102 => Self::MandatoryParamEmptyOrMalformed,
            -1104 => Self::UnreadParameters,
            -1131 => Self::BadRecvWindow,
            -2014 => Self::BadApiKeyFormat,
            -2015 => Self::RejectedApiKey,
            _ => return None,
        })
    }

    /// Raw numeric code
    pub fn code(&self) -> i64 {
        match self {
            Self::Unknown => -1000,
            Self::Unauthorized => -1002,
            Self::TooManyRequests => -1003,
            Self::Timeout => -1007,
            Self::TimestampOutsideRecvWindow => TIMESTAMP_OUTSIDE_RECV_WINDOW,
            Self::InvalidSignature => -1022,
            Self::IllegalChars => -1100,
            Self::MandatoryParamEmptyOrMalformed => -1102,
            Self::UnreadParameters => -1104,
            Self::BadRecvWindow => -1131,
            Self::BadApiKeyFormat => -2014,
            Self::RejectedApiKey => -2015,
        }
    }

    /// Get the recovery strategy for this error code
    ///
    /// Rate limiting and backend timeouts are deliberately not retried: a
    /// retried ad creation could post the same advertisement twice.
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            Self::TimestampOutsideRecvWindow => RecoveryStrategy::Retry,

            Self::Unauthorized | Self::BadApiKeyFormat | Self::RejectedApiKey => {
                RecoveryStrategy::UserAction {
                    message: "API key rejected - check key, IP whitelist and permissions",
                }
            }
            Self::TooManyRequests => RecoveryStrategy::UserAction {
                message: "Rate limited - slow down before sending more requests",
            },

            Self::InvalidSignature | Self::BadRecvWindow => RecoveryStrategy::Fatal,
            Self::IllegalChars | Self::MandatoryParamEmptyOrMalformed | Self::UnreadParameters => {
                RecoveryStrategy::Fatal
            }

            Self::Unknown | Self::Timeout => RecoveryStrategy::Manual,
        }
    }

    /// Get a human-readable description of this error
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown error while processing the request",
            Self::Unauthorized => "Not authorized to execute this request",
            Self::TooManyRequests => "Too many requests",
            Self::Timeout => "Timeout waiting for response from backend server",
            Self::TimestampOutsideRecvWindow => "Timestamp for this request is outside of the recvWindow",
            Self::InvalidSignature => "Signature for this request is not valid",
            Self::IllegalChars => "Illegal characters found in a parameter",
            Self::MandatoryParamEmptyOrMalformed => "A mandatory parameter was not sent, was empty or malformed",
            Self::UnreadParameters => "Not all sent parameters were read",
            Self::BadRecvWindow => "recvWindow must be less than 60000",
            Self::BadApiKeyFormat => "API key format invalid",
            Self::RejectedApiKey => "Invalid API key, IP, or permissions for action",
        }
    }

    /// Check if this error is caused by client/server clock skew
    pub fn is_clock_skew(&self) -> bool {
        matches!(self, Self::TimestampOutsideRecvWindow)
    }

    /// Check if this is an authentication-related error
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::InvalidSignature
                | Self::BadApiKeyFormat
                | Self::RejectedApiKey
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_clock_skew_is_retryable() {
        let skew = C2cErrorCode::from_code(-1021).unwrap();
        assert!(skew.is_clock_skew());
        assert!(skew.recovery_strategy().allows_retry());

        for code in [-1000, -1002, -1003, -1007, -1022, -1100, -1102, -1104, -1131, -2014, -2015] {
            let parsed = C2cErrorCode::from_code(code).unwrap();
            assert!(!parsed.recovery_strategy().allows_retry(), "code {code}");
        }
    }

    #[test]
    fn test_code_roundtrips_through_enum() {
        let code = C2cErrorCode::InvalidSignature;
        assert_eq!(C2cErrorCode::from_code(code.code()), Some(code));
        assert!(code.is_auth_error());
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(C2cErrorCode::from_code(-9999), None);
        assert_eq!(ErrorCategory::from_code(-9999), ErrorCategory::Unknown);
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorCategory::from_code(-1021), ErrorCategory::Server);
        assert_eq!(ErrorCategory::from_code(-1102), ErrorCategory::Request);
        assert_eq!(ErrorCategory::from_code(-2015), ErrorCategory::Processing);
    }

    #[test]
    fn test_strategy_retry() {
        assert!(RecoveryStrategy::Retry.allows_retry());
        assert!(!RecoveryStrategy::Fatal.allows_retry());
        assert_eq!(RecoveryStrategy::default(), RecoveryStrategy::Manual);
    }
}
