//! Main REST client implementation

use c2c_auth::{timestamp_ms, Credentials, RequestParams, RECV_WINDOW_KEY, SIGNATURE_KEY, TIMESTAMP_KEY};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::endpoints::AdsEndpoints;
use crate::error::{RestError, RestResult};
use crate::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};
use crate::types::{SellAdRequest, TradeMethod};

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
/// Default staleness tolerance sent as `recvWindow`
pub const DEFAULT_RECV_WINDOW_MS: u64 = 5000;
/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default number of attempts per logical request
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default pause before re-signing after a `-1021`
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Header identifying the caller
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Binance C2C REST API client
///
/// Every request goes through [`execute`](Self::execute), which signs the
/// query string and retries only when the server rejects the timestamp as
/// outside `recvWindow`.
///
/// # Example
///
/// ```no_run
/// use c2c_rest::{C2cRestClient, Credentials, SellAdRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let creds = Credentials::from_env()?;
///     let client = C2cRestClient::new(creds)?;
///
///     let detail = client.get_ad_detail("11530978893442387968").await?;
///     println!("{detail}");
///
///     let created = client.create_ad(&SellAdRequest::new("123456")).await?;
///     println!("{created}");
///     Ok(())
/// }
/// ```
pub struct C2cRestClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    credentials: Credentials,
    config: ClientConfig,
}

impl C2cRestClient<ReqwestTransport> {
    /// Create a new client with default configuration
    pub fn new(credentials: Credentials) -> RestResult<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> RestResult<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or("c2c-rest/0.1.0");
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs), user_agent)?;

        info!(base_url = %config.base_url, "Created C2C REST client");

        Ok(Self::with_transport(credentials, config, transport))
    }
}

impl<T: HttpTransport> C2cRestClient<T> {
    /// Create a client over a custom transport
    pub fn with_transport(credentials: Credentials, config: ClientConfig, transport: T) -> Self {
        Self {
            transport,
            credentials,
            config,
        }
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the API key (safe to log)
    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    // ========================================================================
    // Signed request execution
    // ========================================================================

    /// Sign and send a request, retrying on clock skew
    ///
    /// Per attempt: a fresh `timestamp`, a query string serialized once and
    /// signed, then sent with that same string. A 2xx with an empty body
    /// yields `{"success": true}`. A non-2xx carrying code `-1021` is retried
    /// after `retry_delay` while attempts remain; every other failure is
    /// returned immediately.
    #[instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
    pub async fn execute(&self, request: SignedRequest) -> RestResult<Value> {
        let SignedRequest {
            endpoint,
            method,
            mut params,
            body,
            headers,
            max_attempts,
        } = request;

        let max_attempts = max_attempts.unwrap_or(self.config.max_attempts);
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let headers = self.merge_headers(headers);
        let body = match (method, body) {
            (HttpMethod::Post, Some(body)) => Some(body.to_string()),
            (HttpMethod::Get, Some(_)) => {
                debug!("Ignoring body on GET request");
                None
            }
            (_, None) => None,
        };

        params.insert(RECV_WINDOW_KEY, self.config.recv_window_ms);

        let mut last_timestamp = None;
        for attempt in 1..=max_attempts {
            let timestamp = next_timestamp(last_timestamp);
            last_timestamp = Some(timestamp);

            params.insert(TIMESTAMP_KEY, timestamp);
            params.remove(SIGNATURE_KEY);
            let signed = params.sign(&self.credentials)?;

            debug!(attempt, max_attempts, timestamp, "Sending signed request");

            let response = match self
                .transport
                .send(HttpRequest {
                    method,
                    url: url.clone(),
                    query: signed.to_query_string(),
                    headers: headers.clone(),
                    body: body.clone(),
                })
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, "Request failed without a response");
                    return Err(e.into());
                }
            };

            if response.is_success() {
                return decode_success(&response.body).map_err(|e| {
                    error!(error = %e, "Unexpected response body");
                    e
                });
            }

            let err = RestError::from_response(response.status, response.body);
            if err.is_retryable() && attempt < max_attempts {
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = self.config.retry_delay.as_millis() as u64,
                    "Timestamp outside recvWindow, retrying with a fresh signature"
                );
                tokio::time::sleep(self.config.retry_delay).await;
                continue;
            }

            error!(error = %err, attempt, "Request failed");
            return Err(err);
        }

        error!(max_attempts, "No attempts left");
        Err(RestError::RetriesExhausted {
            attempts: max_attempts,
        })
    }

    /// Base headers with caller headers merged over them
    fn merge_headers(&self, extra: Vec<(String, String)>) -> Vec<(String, String)> {
        let mut headers = vec![
            (API_KEY_HEADER.to_string(), self.credentials.api_key().to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];

        for (name, value) in extra {
            match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
                Some(existing) => existing.1 = value,
                None => headers.push((name, value)),
            }
        }

        headers
    }

    // ========================================================================
    // Advertisement Endpoints
    // ========================================================================

    /// Get advertisement endpoints
    pub fn ads(&self) -> AdsEndpoints<'_, T> {
        AdsEndpoints::new(self)
    }

    /// Get the detail of an advertisement by its number
    pub async fn get_ad_detail(&self, ads_no: &str) -> RestResult<Value> {
        self.ads().get_detail_by_no(ads_no).await
    }

    /// Get the payment methods attached to an advertisement
    pub async fn get_trade_methods(&self, ads_no: &str) -> RestResult<Vec<TradeMethod>> {
        self.ads().get_trade_methods(ads_no).await
    }

    /// Post a new advertisement
    pub async fn create_ad(&self, ad: &SellAdRequest) -> RestResult<Value> {
        self.ads().post(ad).await
    }
}

impl<T: HttpTransport> std::fmt::Debug for C2cRestClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("C2cRestClient")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .finish()
    }
}

/// Millisecond timestamp strictly after `previous`
fn next_timestamp(previous: Option<i64>) -> i64 {
    let now = timestamp_ms();
    match previous {
        Some(prev) if now <= prev => prev + 1,
        _ => now,
    }
}

fn decode_success(body: &str) -> RestResult<Value> {
    if body.trim().is_empty() {
        return Ok(serde_json::json!({ "success": true }));
    }

    serde_json::from_str(body).map_err(|e| RestError::Parse(format!("{}: {}", e, body)))
}

/// A request to sign and send
#[derive(Debug, Clone)]
pub struct SignedRequest {
    endpoint: String,
    method: HttpMethod,
    params: RequestParams,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    max_attempts: Option<u32>,
}

impl SignedRequest {
    /// Create a request for an endpoint path (e.g. `/sapi/v1/c2c/ads/post`)
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            params: RequestParams::new(),
            body: None,
            headers: Vec::new(),
            max_attempts: None,
        }
    }

    /// Create a GET request
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    /// Create a POST request
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Replace all query parameters
    pub fn params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Set the JSON body
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize a value as the JSON body
    pub fn json<B: Serialize>(self, body: &B) -> RestResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| RestError::Parse(e.to_string()))?;
        Ok(self.body(value))
    }

    /// Add a header, overriding a base header of the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the client's attempt limit for this request
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Endpoint path
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// HTTP verb
    pub fn method(&self) -> HttpMethod {
        self.method
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host, without trailing path
    pub base_url: String,
    /// `recvWindow` sent with every request, in milliseconds
    pub recv_window_ms: u64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Pause before re-signing after a clock skew rejection
    pub retry_delay: Duration,
    /// Attempts per logical request
    pub max_attempts: u32,
    /// Custom user agent
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set `recvWindow`
    pub fn with_recv_window(mut self, millis: u64) -> Self {
        self.recv_window_ms = millis;
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the clock skew retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set attempts per logical request
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportError};
    use serde_json::json;

    fn mock_client(max_attempts: u32) -> C2cRestClient<MockTransport> {
        let creds = Credentials::new("test-api-key", "test-secret").unwrap();
        let config = ClientConfig::new()
            .with_base_url("https://mock.test")
            .with_retry_delay(Duration::ZERO)
            .with_max_attempts(max_attempts);
        C2cRestClient::with_transport(creds, config, MockTransport::new())
    }

    fn timestamps(client: &C2cRestClient<MockTransport>) -> Vec<i64> {
        client
            .transport()
            .requests()
            .iter()
            .map(|r| r.query_param("timestamp").unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(60)
            .with_recv_window(10_000)
            .with_user_agent("test-agent");

        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.recv_window_ms, 10_000);
        assert_eq!(config.user_agent, Some("test-agent".to_string()));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_next_timestamp_strictly_increases() {
        let far_future = timestamp_ms() + 60_000;
        assert_eq!(next_timestamp(Some(far_future)), far_future + 1);
        assert!(next_timestamp(None) > 0);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let client = mock_client(3);
        let debug = format!("{:?}", client);
        assert!(!debug.contains("test-secret"));
    }

    #[tokio::test]
    async fn test_query_string_is_the_signed_string() {
        let client = mock_client(3);
        client.transport().push_response(200, r#"{"ok":true}"#);

        client
            .execute(SignedRequest::get("/sapi/v1/test").param("adsNo", "X"))
            .await
            .unwrap();

        let request = &client.transport().requests()[0];
        let (message, signature) = request.query.rsplit_once("&signature=").unwrap();
        assert!(message.starts_with("adsNo=X&recvWindow=5000&timestamp="));

        let creds = Credentials::new("test-api-key", "test-secret").unwrap();
        assert_eq!(signature, creds.sign(message));
        assert_eq!(request.url, "https://mock.test/sapi/v1/test");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn test_always_clock_skew_uses_every_attempt() {
        let client = mock_client(3);
        for _ in 0..5 {
            client.transport().push_api_error(400, -1021, "Timestamp outside recvWindow");
        }

        let result = client.execute(SignedRequest::post("/sapi/v1/test")).await;

        assert!(matches!(result, Err(RestError::Api { code: Some(-1021), .. })));
        assert_eq!(client.transport().request_count(), 3);
    }

    #[tokio::test]
    async fn test_other_error_code_not_retried() {
        let client = mock_client(3);
        client.transport().push_api_error(400, -1022, "Signature for this request is not valid.");
        client.transport().push_response(200, "{}");

        let result = client.execute(SignedRequest::post("/sapi/v1/test")).await;

        assert!(matches!(result, Err(RestError::Api { code: Some(-1022), .. })));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_string_clock_skew_code_not_retried() {
        let client = mock_client(3);
        for _ in 0..3 {
            client.transport().push_response(400, r#"{"code":"-1021","msg":"x"}"#);
        }

        let result = client.execute(SignedRequest::post("/p")).await;

        assert!(matches!(result, Err(RestError::Api { code: None, .. })));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_error_not_retried() {
        let client = mock_client(3);
        client.transport().push_response(503, "<html>Service Unavailable</html>");

        let result = client.execute(SignedRequest::get("/sapi/v1/test")).await;

        assert!(matches!(result, Err(RestError::Api { status: 503, code: None, .. })));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_not_retried() {
        let client = mock_client(3);
        client.transport().push_error(TransportError::Timeout);
        client.transport().push_response(200, "{}");

        let result = client.execute(SignedRequest::post("/sapi/v1/test")).await;

        assert!(matches!(result, Err(RestError::Transport(TransportError::Timeout))));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_retries_refresh_timestamp_and_signature() {
        let client = mock_client(3);
        client.transport().push_api_error(400, -1021, "stale");
        client.transport().push_api_error(400, -1021, "stale");
        client.transport().push_response(200, "{}");

        client
            .execute(SignedRequest::post("/sapi/v1/test").param("adsNo", "X"))
            .await
            .unwrap();

        let ts = timestamps(&client);
        assert_eq!(ts.len(), 3);
        assert!(ts[0] < ts[1] && ts[1] < ts[2]);

        let requests = client.transport().requests();
        let signatures: Vec<_> = requests.iter().map(|r| r.query_param("signature").unwrap()).collect();
        assert_ne!(signatures[0], signatures[1]);
        assert_ne!(signatures[1], signatures[2]);

        // exactly one signature per attempt, no stale one carried over
        for request in &requests {
            assert_eq!(request.query.matches("signature=").count(), 1);
            assert_eq!(request.query.matches("timestamp=").count(), 1);
        }
    }

    #[tokio::test]
    async fn test_empty_success_body_is_sentinel() {
        let client = mock_client(3);
        client.transport().push_response(200, "");

        let result = client.execute(SignedRequest::post("/sapi/v1/test")).await.unwrap();
        assert_eq!(result, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_whitespace_success_body_is_sentinel() {
        let client = mock_client(3);
        client.transport().push_response(200, "  \n");

        let result = client.execute(SignedRequest::post("/sapi/v1/test")).await.unwrap();
        assert_eq!(result, json!({ "success": true }));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_parse_error() {
        let client = mock_client(3);
        client.transport().push_response(200, "not json");

        let result = client.execute(SignedRequest::post("/sapi/v1/test")).await;
        assert!(matches!(result, Err(RestError::Parse(_))));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_post_sends_body_and_get_does_not() {
        let client = mock_client(3);
        client.transport().push_response(200, "{}");
        client.transport().push_response(200, "{}");

        let body = json!({ "asset": "USDT" });
        client
            .execute(SignedRequest::post("/p").body(body.clone()))
            .await
            .unwrap();
        client
            .execute(SignedRequest::get("/g").body(body.clone()))
            .await
            .unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"asset":"USDT"}"#));
        assert!(requests[0].query.contains("recvWindow=5000"));
        assert_eq!(requests[1].body, None);
        assert!(requests[1].query.contains("recvWindow=5000"));
    }

    #[tokio::test]
    async fn test_extra_headers_override_base_headers() {
        let client = mock_client(3);
        client.transport().push_response(200, "{}");

        client
            .execute(
                SignedRequest::post("/p")
                    .header("content-type", "text/plain")
                    .header("X-Trace", "abc"),
            )
            .await
            .unwrap();

        let request = &client.transport().requests()[0];
        assert_eq!(request.header(API_KEY_HEADER), Some("test-api-key"));
        assert_eq!(request.header("Content-Type"), Some("text/plain"));
        assert_eq!(request.header("X-Trace"), Some("abc"));
        assert_eq!(request.headers.len(), 3);
    }

    #[tokio::test]
    async fn test_caller_signature_is_discarded() {
        let client = mock_client(3);
        client.transport().push_response(200, "{}");

        client
            .execute(SignedRequest::get("/g").param("signature", "forged").param("a", 1))
            .await
            .unwrap();

        let request = &client.transport().requests()[0];
        assert!(!request.query.contains("forged"));
        assert!(request.query.starts_with("a=1&recvWindow=5000&timestamp="));
    }

    #[tokio::test]
    async fn test_per_request_attempt_override() {
        let client = mock_client(3);
        for _ in 0..5 {
            client.transport().push_api_error(400, -1021, "stale");
        }

        let result = client
            .execute(SignedRequest::post("/p").max_attempts(5))
            .await;

        assert!(result.is_err());
        assert_eq!(client.transport().request_count(), 5);
    }

    #[tokio::test]
    async fn test_zero_attempts_sends_nothing() {
        let client = mock_client(0);

        let result = client.execute(SignedRequest::post("/p")).await;

        assert!(matches!(result, Err(RestError::RetriesExhausted { attempts: 0 })));
        assert_eq!(client.transport().request_count(), 0);
    }
}
