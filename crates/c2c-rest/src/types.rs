//! Types for Binance C2C REST API requests and responses

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{RestError, RestResult};

// ============================================================================
// API Response Wrapper
// ============================================================================

/// Success code carried by C2C response envelopes
pub const C2C_SUCCESS_CODE: &str = "000000";

/// Standard C2C response envelope
///
/// `{"code":"000000","message":"success","data":{..},"success":true}`
#[derive(Debug, Clone, Deserialize)]
pub struct C2cResponse<T> {
    /// Business code ("000000" on success)
    #[serde(default, deserialize_with = "de_opt_string")]
    pub code: Option<String>,
    /// Message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload
    pub data: Option<T>,
    /// Success flag
    #[serde(default)]
    pub success: Option<bool>,
}

impl<T> C2cResponse<T> {
    /// Check if the envelope reports success
    pub fn is_success(&self) -> bool {
        self.success != Some(false)
            && self.code.as_deref().map_or(true, |c| c == C2C_SUCCESS_CODE)
    }

    /// Get the payload, returning the envelope's message if it reports failure
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(self
                .message
                .or(self.code)
                .unwrap_or_else(|| "Unknown error".to_string()))
        }
    }
}

// ============================================================================
// Advertisement Detail
// ============================================================================

/// Advertisement detail returned by `getDetailByNo`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDetail {
    /// Advertisement number
    #[serde(default, deserialize_with = "de_string")]
    pub adv_no: String,
    /// Crypto asset (e.g. "USDT")
    #[serde(default)]
    pub asset: Option<String>,
    /// Fiat currency (e.g. "ZAR")
    #[serde(default)]
    pub fiat_unit: Option<String>,
    /// "BUY" or "SELL"
    #[serde(default)]
    pub trade_type: Option<String>,
    /// Price as sent by the API
    #[serde(default, deserialize_with = "de_opt_string")]
    pub price: Option<String>,
    /// Payment methods accepted on this advertisement
    #[serde(default)]
    pub trade_methods: Vec<TradeMethod>,
}

impl AdDetail {
    /// Parse the advertisement out of a raw `getDetailByNo` response
    pub fn from_response(value: Value) -> RestResult<Option<Self>> {
        let body = value.to_string();
        let envelope: C2cResponse<AdDetail> =
            serde_json::from_value(value).map_err(|e| RestError::Parse(e.to_string()))?;

        envelope.into_result().map_err(|message| RestError::Api {
            status: 200,
            code: None,
            message,
            body,
        })
    }

    /// Parsed price
    pub fn price(&self) -> Option<Decimal> {
        self.price.as_deref().and_then(|p| p.parse().ok())
    }
}

/// A payment method, as listed on an advertisement or attached to a new one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeMethod {
    /// Payment method identifier (e.g. "BankTransfer")
    #[serde(default)]
    pub identifier: String,
    /// The account's payment method id
    #[serde(deserialize_with = "de_string")]
    pub pay_id: String,
    /// Payment type (e.g. "BANK_TRANSFER")
    #[serde(default)]
    pub pay_type: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_method_name: Option<String>,
}

impl TradeMethod {
    /// Bank transfer method for a payment method id
    pub fn bank_transfer(pay_id: impl Into<String>) -> Self {
        Self {
            identifier: "BankTransfer".to_string(),
            pay_id: pay_id.into(),
            pay_type: "BANK_TRANSFER".to_string(),
            trade_method_name: None,
        }
    }
}

// ============================================================================
// Advertisement Creation
// ============================================================================

/// Advertisement side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    /// Buy crypto from counterparties
    Buy,
    /// Sell crypto to counterparties
    Sell,
}

/// How the advertisement is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceType {
    /// Fixed price
    Fixed,
    /// Floating price relative to the market
    Floating,
}

impl Serialize for PriceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::Fixed => 1,
            Self::Floating => 2,
        })
    }
}

/// Counterparty filters of an advertisement
///
/// Unset filters are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_all_trade_count_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_all_trade_count_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_buy_trade_count_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_buy_trade_count_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_sell_trade_count_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_sell_trade_count_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_trade_complete_count_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_trade_complete_rate_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_trade_complete_rate_filter_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_trade_count_filter_time: Option<i64>,
}

impl BuyerFilters {
    /// Every filter set to `-1` (no restriction), filter windows at 2
    pub fn unrestricted() -> Self {
        Self {
            user_all_trade_count_max: Some(-1),
            user_all_trade_count_min: Some(-1),
            user_buy_trade_count_max: Some(-1),
            user_buy_trade_count_min: Some(-1),
            user_sell_trade_count_max: Some(-1),
            user_sell_trade_count_min: Some(-1),
            user_trade_complete_count_min: Some(-1),
            user_trade_complete_rate_min: Some(-1),
            user_trade_complete_rate_filter_time: Some(2),
            user_trade_count_filter_time: Some(2),
        }
    }
}

/// Body of `POST /sapi/v1/c2c/ads/post`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellAdRequest {
    pub asset: String,
    pub buyer_kyc_limit: u8,
    pub fiat_unit: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub init_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_single_trans_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_single_trans_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub price_type: PriceType,
    pub trade_type: TradeType,
    pub classify: String,
    pub online_now: bool,
    pub trade_methods: Vec<TradeMethod>,
    pub taker_additional_kyc_required: u8,
    #[serde(flatten)]
    pub filters: BuyerFilters,
}

impl SellAdRequest {
    /// Fixed-price USDT/ZAR sell advertisement paid by bank transfer
    pub fn new(pay_id: impl Into<String>) -> Self {
        Self {
            asset: "USDT".to_string(),
            buyer_kyc_limit: 1,
            fiat_unit: "ZAR".to_string(),
            init_amount: dec!(100),
            min_single_trans_amount: dec!(1000),
            max_single_trans_amount: dec!(20000),
            price: dec!(25.00),
            price_type: PriceType::Fixed,
            trade_type: TradeType::Sell,
            classify: "profession".to_string(),
            online_now: false,
            trade_methods: vec![TradeMethod::bank_transfer(pay_id)],
            taker_additional_kyc_required: 0,
            filters: BuyerFilters {
                user_all_trade_count_min: Some(100_000),
                user_trade_count_filter_time: Some(2),
                ..Default::default()
            },
        }
    }

    /// Set the unit price
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    /// Set the fiat currency
    pub fn with_fiat_unit(mut self, fiat: impl Into<String>) -> Self {
        self.fiat_unit = fiat.into();
        self
    }

    /// Set the total amount of crypto on offer
    pub fn with_init_amount(mut self, amount: Decimal) -> Self {
        self.init_amount = amount;
        self
    }

    /// Set the per-order fiat limits
    pub fn with_limits(mut self, min: Decimal, max: Decimal) -> Self {
        self.min_single_trans_amount = min;
        self.max_single_trans_amount = max;
        self
    }

    /// Replace the counterparty filters
    pub fn with_filters(mut self, filters: BuyerFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Go online immediately after posting
    pub fn with_online_now(mut self, online: bool) -> Self {
        self.online_now = online;
        self
    }

    /// Check the request before sending it
    pub fn validate(&self) -> RestResult<()> {
        if self.trade_methods.is_empty() {
            return Err(RestError::InvalidParameter("at least one trade method is required".into()));
        }
        if let Some(method) = self.trade_methods.iter().find(|m| m.pay_id.trim().is_empty()) {
            return Err(RestError::InvalidParameter(format!(
                "trade method {} has an empty payId",
                method.identifier
            )));
        }
        if self.price <= Decimal::ZERO {
            return Err(RestError::InvalidParameter(format!("price must be positive, got {}", self.price)));
        }
        if self.init_amount <= Decimal::ZERO {
            return Err(RestError::InvalidParameter(format!(
                "initAmount must be positive, got {}",
                self.init_amount
            )));
        }
        if self.min_single_trans_amount <= Decimal::ZERO
            || self.min_single_trans_amount > self.max_single_trans_amount
        {
            return Err(RestError::InvalidParameter(format!(
                "invalid order limits {}..{}",
                self.min_single_trans_amount, self.max_single_trans_amount
            )));
        }
        Ok(())
    }
}

// The API sends ids and prices as numbers or strings depending on the endpoint.
fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    de_opt_string(deserializer).map(Option::unwrap_or_default)
}
