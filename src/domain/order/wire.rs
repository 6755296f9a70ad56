//! Wire types for order endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Response of `POST`/`DELETE`/`GET /fapi/v1/order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i64,
    pub symbol: String,
    pub status: String,
    #[serde(default)]
    pub client_order_id: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub avg_price: Option<Decimal>,
    #[serde(default)]
    pub orig_qty: Option<Decimal>,
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(default)]
    pub time_in_force: Option<String>,
    #[serde(default, with = "crate::shared::serde_util::timestamp_ms_opt")]
    pub update_time: Option<DateTime<Utc>>,
}

/// Response of `POST /api/v3/order/oco`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcoResponse {
    pub order_list_id: i64,
    #[serde(default)]
    pub contingency_type: String,
    #[serde(default)]
    pub list_status_type: String,
    pub list_order_status: String,
    pub symbol: String,
    #[serde(with = "crate::shared::serde_util::timestamp_ms")]
    pub transaction_time: DateTime<Utc>,
    #[serde(default)]
    pub orders: Vec<OcoLeg>,
    #[serde(default)]
    pub order_reports: Vec<OcoOrderReport>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcoLeg {
    pub symbol: String,
    pub order_id: i64,
    #[serde(default)]
    pub client_order_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcoOrderReport {
    pub order_id: i64,
    pub status: String,
    #[serde(default)]
    pub orig_qty: Option<Decimal>,
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
    #[serde(default)]
    pub cummulative_quote_qty: Option<Decimal>,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
}
