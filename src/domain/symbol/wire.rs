//! Wire types for `GET /fapi/v1/exchangeInfo`.
//!
//! Only the fields the bot reads are declared; everything else in the payload
//! is ignored.

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfoResponse {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub symbols: Vec<SymbolResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolResponse {
    pub symbol: String,
    pub status: String,
    #[serde(default)]
    pub base_asset: String,
    #[serde(default)]
    pub quote_asset: String,
    #[serde(default)]
    pub quantity_precision: Option<u32>,
    #[serde(default)]
    pub price_precision: Option<u32>,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

/// Exchange filters, tagged by `filterType`. Unknown filters are kept as
/// [`SymbolFilter::Other`] so new exchange filters never break parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize {
        min_qty: Decimal,
        max_qty: Decimal,
        step_size: Decimal,
    },
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    PriceFilter {
        min_price: Decimal,
        max_price: Decimal,
        tick_size: Decimal,
    },
    #[serde(other)]
    Other,
}

impl ExchangeInfoResponse {
    /// Find one symbol, matching case-insensitively.
    pub fn take_symbol(self, symbol: &str) -> Option<SymbolResponse> {
        self.symbols
            .into_iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }
}
