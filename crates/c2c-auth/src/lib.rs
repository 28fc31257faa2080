//! Credentials and request signing for the Binance C2C API
//!
//! Binance SAPI endpoints authenticate a request with an `X-MBX-APIKEY`
//! header plus a `signature` query parameter: the lowercase hex
//! HMAC-SHA256 of the query string, keyed by the secret key.
//!
//! # Example
//!
//! ```no_run
//! use c2c_auth::{Credentials, RequestParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let creds = Credentials::from_env()?;
//!
//! let mut params = RequestParams::new();
//! params.insert("adsNo", "11530978893442387968");
//! params.insert("recvWindow", 5000);
//! params.insert("timestamp", c2c_auth::timestamp_ms());
//!
//! let signed = params.sign(&creds)?;
//! println!("?{}", signed.to_query_string());
//! # Ok(())
//! # }
//! ```

mod credentials;
mod error;
mod params;

pub use credentials::{timestamp_ms, Credentials};
pub use error::{AuthError, AuthResult};
pub use params::{RequestParams, SignedQuery, RECV_WINDOW_KEY, SIGNATURE_KEY, TIMESTAMP_KEY};
