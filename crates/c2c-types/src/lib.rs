//! Shared types for the Binance C2C REST API
//!
//! This crate provides the wire-level error payload and the error code
//! mapping used by the signing and REST crates. It has minimal dependencies
//! and can be used independently.
//!
//! # Key Types
//!
//! - [`ApiErrorPayload`] - The `{code, msg}` body Binance returns on failure
//! - [`C2cErrorCode`] - Known Binance error codes
//! - [`RecoveryStrategy`] - How a caller should react to an error code

pub mod error_codes;
pub mod payload;

pub use error_codes::*;
pub use payload::*;
