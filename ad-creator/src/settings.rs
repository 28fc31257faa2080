//! Process configuration read from the environment

use anyhow::{Context, Result};
use c2c_auth::Credentials;
use secrecy::SecretString;

/// Settings loaded once at startup
pub struct Settings {
    /// Signing credentials (`API_KEY`, `SECRET_KEY`)
    pub credentials: Credentials,
    /// `AUTH_SECRET`, loaded for parity with the account setup but not used for signing
    pub auth_secret: Option<SecretString>,
    /// Payment method id attached to the new advertisement (`PAY_ID`)
    pub pay_id: String,
    /// Existing advertisement whose payment methods are listed first (`ADS_NO`)
    pub ads_no: Option<String>,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through a lookup function
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("environment variable {key} is not set"))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials = Credentials::new(required("API_KEY")?, required("SECRET_KEY")?)
            .context("invalid API credentials")?;

        Ok(Self {
            credentials,
            auth_secret: optional("AUTH_SECRET").map(SecretString::from),
            pay_id: required("PAY_ID")?,
            ads_no: optional("ADS_NO"),
        })
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("credentials", &self.credentials)
            .field("auth_secret", &self.auth_secret.as_ref().map(|_| "[REDACTED]"))
            .field("pay_id", &self.pay_id)
            .field("ads_no", &self.ads_no)
            .finish()
    }
}
