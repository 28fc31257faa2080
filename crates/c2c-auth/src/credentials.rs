//! Authentication credentials for the Binance API
//!
//! Implements HMAC-SHA256 signing as required by Binance's SIGNED endpoints.
//!
//! # Security
//!
//! The secret key is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop (prevents memory scanning)
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the API key
const API_KEY_VAR: &str = "API_KEY";
/// Environment variable holding the secret key
const SECRET_KEY_VAR: &str = "SECRET_KEY";

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// API credentials for authenticated requests
///
/// The secret key is never transmitted; it only keys the HMAC. It is
/// zeroized when the Credentials are dropped.
pub struct Credentials {
    /// API key (sent as `X-MBX-APIKEY`)
    api_key: String,
    /// Secret key (zeroized on drop)
    secret_key: SecretString,
}

impl Credentials {
    /// Create new credentials from an API key and a secret key
    ///
    /// # Errors
    /// Returns `AuthError::InvalidCredentials` if either value is blank.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> AuthResult<Self> {
        let api_key = api_key.into();
        let secret_key = secret_key.into();

        if api_key.trim().is_empty() {
            return Err(AuthError::InvalidCredentials("API key is empty".to_string()));
        }
        if secret_key.trim().is_empty() {
            return Err(AuthError::InvalidCredentials("secret key is empty".to_string()));
        }

        Ok(Self {
            api_key,
            secret_key: SecretString::from(secret_key),
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `API_KEY` and `SECRET_KEY` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| AuthError::EnvVarNotSet(API_KEY_VAR.to_string()))?;
        let secret_key = std::env::var(SECRET_KEY_VAR)
            .map_err(|_| AuthError::EnvVarNotSet(SECRET_KEY_VAR.to_string()))?;

        Self::new(api_key, secret_key)
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a message for Binance's API
    ///
    /// Returns the lowercase hex HMAC-SHA256 of `message` keyed by the
    /// secret key.
    pub fn sign(&self, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            secret_key: SecretString::from(self.secret_key.expose_secret().to_owned()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.api_key.chars().take(8).collect();
        f.debug_struct("Credentials")
            .field("api_key", &format!("{}...", prefix))
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_known_vector() {
        // Example from Binance's SIGNED endpoint documentation
        let creds = Credentials::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        )
        .unwrap();

        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

        assert_eq!(
            creds.sign(query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signing_consistency() {
        let creds = Credentials::new("key", "secret").unwrap();
        let message = "adsNo=1&recvWindow=5000&timestamp=1700000000000";

        let signature = creds.sign(message);
        assert_eq!(signature, creds.sign(message));
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        assert_ne!(signature, creds.sign("adsNo=1&recvWindow=5000&timestamp=1700000000001"));
    }

    #[test]
    fn test_sign_empty_message() {
        let creds = Credentials::new("key", "secret").unwrap();
        assert_eq!(creds.sign("").len(), 64);
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let creds = Credentials::new("test_api_key_123", "super_secret_value").unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super_secret_value"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("test_api"));
    }

    #[test]
    fn test_blank_credentials_rejected() {
        assert!(matches!(
            Credentials::new("", "secret"),
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(matches!(
            Credentials::new("key", "   "),
            Err(AuthError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn test_clone_keeps_secret() {
        let creds = Credentials::new("key", "secret").unwrap();
        let cloned = creds.clone();
        assert_eq!(cloned.api_key(), "key");
        assert_eq!(cloned.sign("a=1"), creds.sign("a=1"));
    }

    #[test]
    fn test_timestamp_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(timestamp_ms() > 1_577_836_800_000);
    }
}
