//! Exchange-backed symbol rules provider.

use crate::domain::symbol::{SymbolRules, SymbolRulesProvider};
use crate::error::MetadataError;
use crate::http::BinanceHttp;
use crate::shared::Symbol;

/// Fetches symbol rules from `GET /fapi/v1/exchangeInfo`.
#[derive(Debug, Clone)]
pub struct ExchangeInfoClient {
    http: BinanceHttp,
}

impl ExchangeInfoClient {
    pub fn new(http: BinanceHttp) -> Self {
        Self { http }
    }
}

impl SymbolRulesProvider for ExchangeInfoClient {
    async fn fetch_symbol_rules(&self, symbol: &Symbol) -> Result<SymbolRules, MetadataError> {
        let info = self
            .http
            .exchange_info()
            .await
            .map_err(|e| MetadataError::from_http(symbol.as_str(), e))?;

        let resp = info
            .take_symbol(symbol.as_str())
            .ok_or_else(|| MetadataError::NotFound {
                symbol: symbol.to_string(),
            })?;

        SymbolRules::try_from(resp)
    }
}
