//! Signed REST client for the Binance C2C advertisement API
//!
//! This crate signs requests to Binance's C2C (peer-to-peer) SAPI endpoints
//! and exposes the advertisement operations built on top of them.
//!
//! # Features
//!
//! - **Signed requests**: HMAC-SHA256 over the exact query string sent
//! - **Clock skew recovery**: re-signs and resends on code `-1021` only
//! - **Advertisements**: ad detail lookup, payment methods, ad creation
//!
//! # Example
//!
//! ```no_run
//! use c2c_rest::{C2cRestClient, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = Credentials::from_env()?;
//!     let client = C2cRestClient::new(creds)?;
//!
//!     for method in client.get_trade_methods("11530978893442387968").await? {
//!         println!("{} -> payId {}", method.identifier, method.pay_id);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Retries
//!
//! Only a rejected timestamp is retried (up to `max_attempts`, default 3,
//! with a 1 second pause). Everything else, including rate limiting and
//! network errors, fails on the first attempt so that a non-idempotent
//! POST is never sent twice by the client.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;
pub mod types;

// Re-export main types
pub use c2c_auth::{Credentials, RequestParams};
pub use client::{C2cRestClient, ClientConfig, SignedRequest};
pub use error::{RestError, RestResult};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;

// Re-export endpoint-specific types
pub use types::{AdDetail, BuyerFilters, C2cResponse, PriceType, SellAdRequest, TradeMethod, TradeType};
