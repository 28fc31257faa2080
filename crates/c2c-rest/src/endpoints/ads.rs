//! C2C advertisement endpoints
//!
//! These endpoints require authentication.

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::client::{C2cRestClient, SignedRequest};
use crate::error::RestResult;
use crate::transport::HttpTransport;
use crate::types::{AdDetail, SellAdRequest, TradeMethod};

/// `POST` endpoint returning an advertisement by number
pub const GET_DETAIL_BY_NO: &str = "/sapi/v1/c2c/ads/getDetailByNo";
/// `POST` endpoint creating an advertisement
pub const POST_AD: &str = "/sapi/v1/c2c/ads/post";

/// Advertisement endpoints
pub struct AdsEndpoints<'a, T: HttpTransport> {
    client: &'a C2cRestClient<T>,
}

impl<'a, T: HttpTransport> AdsEndpoints<'a, T> {
    pub fn new(client: &'a C2cRestClient<T>) -> Self {
        Self { client }
    }

    /// Get the detail of an advertisement
    ///
    /// # Arguments
    /// * `ads_no` - Advertisement number (e.g. "11530978893442387968")
    #[instrument(skip(self))]
    pub async fn get_detail_by_no(&self, ads_no: &str) -> RestResult<Value> {
        self.client
            .execute(SignedRequest::post(GET_DETAIL_BY_NO).param("adsNo", ads_no))
            .await
    }

    /// Get the payment methods accepted on an advertisement
    ///
    /// Useful to find the `payId` to reuse on a new advertisement.
    #[instrument(skip(self))]
    pub async fn get_trade_methods(&self, ads_no: &str) -> RestResult<Vec<TradeMethod>> {
        let response = self.get_detail_by_no(ads_no).await?;
        let methods = AdDetail::from_response(response)?
            .map(|detail| detail.trade_methods)
            .unwrap_or_default();

        debug!(count = methods.len(), "Found trade methods");
        Ok(methods)
    }

    /// Post a new advertisement
    ///
    /// Not retried on anything but clock skew, so a failure never posts
    /// the advertisement twice.
    #[instrument(skip(self, ad), fields(asset = %ad.asset, fiat = %ad.fiat_unit, price = %ad.price))]
    pub async fn post(&self, ad: &SellAdRequest) -> RestResult<Value> {
        ad.validate()?;

        let response = self
            .client
            .execute(SignedRequest::post(POST_AD).json(ad)?)
            .await?;

        info!("Advertisement posted");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::error::RestError;
    use crate::transport::MockTransport;
    use c2c_auth::Credentials;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::time::Duration;

    fn mock_client() -> C2cRestClient<MockTransport> {
        let creds = Credentials::new("test-api-key", "test-secret").unwrap();
        let config = ClientConfig::new()
            .with_base_url("https://mock.test")
            .with_retry_delay(Duration::ZERO)
            .with_max_attempts(3);
        C2cRestClient::with_transport(creds, config, MockTransport::new())
    }

    #[tokio::test]
    async fn test_get_ad_detail_recovers_from_clock_skew() {
        let client = mock_client();
        client.transport().push_api_error(400, -1021, "Timestamp for this request is outside of the recvWindow.");
        client.transport().push_api_error(400, -1021, "Timestamp for this request is outside of the recvWindow.");
        client.transport().push_response(200, r#"{"adsNo":"X"}"#);

        let detail = client.get_ad_detail("X").await.unwrap();

        assert_eq!(detail, json!({ "adsNo": "X" }));
        assert_eq!(client.transport().request_count(), 3);
    }

    #[tokio::test]
    async fn test_get_ad_detail_request_shape() {
        let client = mock_client();
        client.transport().push_response(200, r#"{"adsNo":"X"}"#);

        client.get_ad_detail("13753690538259550208").await.unwrap();

        let request = &client.transport().requests()[0];
        assert_eq!(request.url, format!("https://mock.test{}", GET_DETAIL_BY_NO));
        assert_eq!(request.method, crate::transport::HttpMethod::Post);
        assert_eq!(request.query_param("adsNo"), Some("13753690538259550208"));
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn test_get_trade_methods() {
        let client = mock_client();
        client.transport().push_response(
            200,
            json!({
                "code": "000000",
                "message": "success",
                "data": {
                    "advNo": "X",
                    "tradeMethods": [
                        { "payId": 111, "payType": "BANK_TRANSFER", "identifier": "BankTransfer" }
                    ]
                },
                "success": true
            })
            .to_string(),
        );

        let methods = client.get_trade_methods("X").await.unwrap();
        assert_eq!(methods, vec![TradeMethod::bank_transfer("111")]);
    }

    #[tokio::test]
    async fn test_get_trade_methods_without_data() {
        let client = mock_client();
        client.transport().push_response(200, "");

        let methods = client.get_trade_methods("X").await.unwrap();
        assert!(methods.is_empty());
    }

    #[tokio::test]
    async fn test_create_ad_sends_body() {
        let client = mock_client();
        client.transport().push_response(200, r#"{"code":"000000","data":"11530978893442387968","success":true}"#);

        let result = client.create_ad(&SellAdRequest::new("987654")).await.unwrap();
        assert_eq!(result["success"], true);

        let request = &client.transport().requests()[0];
        assert_eq!(request.url, format!("https://mock.test{}", POST_AD));

        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["tradeType"], "SELL");
        assert_eq!(body["tradeMethods"][0]["payId"], "987654");

        let (message, _) = request.query.rsplit_once("&signature=").unwrap();
        assert!(message.starts_with("recvWindow=5000&timestamp="));
    }

    #[tokio::test]
    async fn test_create_ad_not_retried_on_rate_limit() {
        let client = mock_client();
        client.transport().push_api_error(429, -1003, "Too many requests");
        client.transport().push_response(200, "{}");

        let result = client.create_ad(&SellAdRequest::new("987654")).await;
        assert!(matches!(result, Err(RestError::Api { code: Some(-1003), .. })));
        assert_eq!(client.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_ad_never_sent() {
        let client = mock_client();
        let ad = SellAdRequest::new("987654").with_limits(dec!(50000), dec!(1000));

        let result = client.create_ad(&ad).await;
        assert!(matches!(result, Err(RestError::InvalidParameter(_))));
        assert_eq!(client.transport().request_count(), 0);
    }
}
