//! API endpoint implementations

pub mod ads;

pub use ads::AdsEndpoints;
