//! HTTP transport abstraction
//!
//! This module provides a trait-based abstraction over the HTTP client,
//! enabling unit testing of the signing and retry logic without real
//! network calls.
//!
//! The query string is passed through untouched: it is the exact string
//! that was signed, so the transport must not re-encode or reorder it.

use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Transport layer errors (no HTTP response was obtained)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// HTTP client could not be built
    #[error("client build failed: {0}")]
    Build(String),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out before a response
    #[error("request timed out")]
    Timeout,

    /// Request failed before a response
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Response body could not be read
    #[error("reading response body failed: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            Self::Build(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

/// HTTP verbs used by signed requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Parameters in the query string only
    Get,
    /// Parameters in the query string, JSON entity in the body
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// A fully assembled request, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP verb
    pub method: HttpMethod,
    /// Base URL plus endpoint path, without query
    pub url: String,
    /// Signed query string, including `signature`
    pub query: String,
    /// Headers in send order
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body
    pub body: Option<String>,
}

impl HttpRequest {
    /// URL with the query string appended
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, self.query)
        }
    }

    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter value as it appears on the wire
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }
}

/// Response status and raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body text (may be empty)
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP transport abstraction
///
/// Implementations return `Ok` for any HTTP response, success or not, and
/// `Err` only when no response was obtained.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and read the whole response body
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Real HTTPS transport using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with the given timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.full_url());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        debug!(status, len = body.len(), "Received response");

        Ok(HttpResponse { status, body })
    }
}

/// Mock transport for testing
///
/// Returns scripted responses in order and records every request.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: parking_lot::Mutex<std::collections::VecDeque<Result<HttpResponse, TransportError>>>,
    requests: parking_lot::Mutex<Vec<HttpRequest>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response to be returned on the next send
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.responses
            .lock()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Add a Binance error response (`{"code":..,"msg":..}`)
    pub fn push_api_error(&self, status: u16, code: i64, msg: &str) {
        let body = serde_json::json!({ "code": code, "msg": msg }).to_string();
        self.push_response(status, body);
    }

    /// Simulate a failure with no response
    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::RequestFailed("no scripted response".into())))
    }
}
