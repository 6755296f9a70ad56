//! Wire types for market data endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// `GET /fapi/v1/time`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTimeResponse {
    #[serde(with = "crate::shared::serde_util::timestamp_ms")]
    pub server_time: DateTime<Utc>,
}

/// `GET /fapi/v1/ticker/price?symbol=...`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: Decimal,
    #[serde(default, with = "crate::shared::serde_util::timestamp_ms_opt")]
    pub time: Option<DateTime<Utc>>,
}
