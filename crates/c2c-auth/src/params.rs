//! Ordered request parameters and the signed query string built from them

use std::fmt;

use tracing::trace;

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};

/// Parameter carrying the request timestamp in milliseconds
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Parameter carrying the staleness tolerance in milliseconds
pub const RECV_WINDOW_KEY: &str = "recvWindow";
/// Parameter carrying the hex signature
pub const SIGNATURE_KEY: &str = "signature";

/// Ordered mapping from parameter name to value
///
/// Keys keep the position of their first insertion; inserting an existing
/// key replaces its value in place. The serialized query string follows
/// this order, so signing and sending always see the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, String)>,
}

impl RequestParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a parameter, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Check whether a parameter is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate over parameters in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to `key=value&...` in order, leaving out any `signature`
    ///
    /// Values are form-urlencoded so the string can go on the wire as-is.
    pub fn to_query_string(&self) -> AuthResult<String> {
        let unsigned: Vec<(&str, &str)> = self.iter().filter(|(k, _)| *k != SIGNATURE_KEY).collect();

        serde_urlencoded::to_string(&unsigned).map_err(|e| AuthError::Encode(e.to_string()))
    }

    /// Serialize once and sign exactly that string
    pub fn sign(&self, credentials: &Credentials) -> AuthResult<SignedQuery> {
        let query = self.to_query_string()?;
        let signature = credentials.sign(&query);

        trace!(query = %query, "Signed query string");

        Ok(SignedQuery { query, signature })
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// A query string together with the signature computed over it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    query: String,
    signature: String,
}

impl SignedQuery {
    /// The exact string that was signed
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Hex HMAC-SHA256 of [`query`](Self::query)
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Wire form: the signed string with `signature` appended
    pub fn to_query_string(&self) -> String {
        if self.query.is_empty() {
            format!("{}={}", SIGNATURE_KEY, self.signature)
        } else {
            format!("{}&{}={}", self.query, SIGNATURE_KEY, self.signature)
        }
    }
}

impl fmt::Display for SignedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}
