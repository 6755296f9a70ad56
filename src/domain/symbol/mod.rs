//! Symbol domain: per-symbol trading rules and the cache that serves them.

pub mod cache;
pub mod client;
mod convert;
pub mod wire;

use std::future::Future;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::MetadataError;
use crate::shared::{Lattice, Symbol};

pub use cache::SymbolCache;
pub use client::ExchangeInfoClient;

// ─── SymbolStatus ────────────────────────────────────────────────────────────

/// Trading status reported by the exchange. Only `Trading` accepts orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SymbolStatus {
    Trading,
    Break,
    Other(String),
}

impl SymbolStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "TRADING" => SymbolStatus::Trading,
            "BREAK" => SymbolStatus::Break,
            other => SymbolStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SymbolStatus::Trading => "TRADING",
            SymbolStatus::Break => "BREAK",
            SymbolStatus::Other(s) => s,
        }
    }

    pub fn is_trading(&self) -> bool {
        matches!(self, SymbolStatus::Trading)
    }
}

impl std::fmt::Display for SymbolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── SymbolRules ─────────────────────────────────────────────────────────────

/// Trading rules for one symbol. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRules {
    pub symbol: Symbol,
    pub status: SymbolStatus,
    pub base_asset: String,
    pub quote_asset: String,
    /// `minQty + k * stepSize`, bounded by `maxQty`.
    pub quantity: Lattice,
    /// `minPrice + k * tickSize`, bounded by `maxPrice`.
    pub price: Lattice,
    pub quantity_precision: u32,
    pub price_precision: u32,
}

impl SymbolRules {
    pub fn min_qty(&self) -> Decimal {
        self.quantity.min
    }

    pub fn max_qty(&self) -> Decimal {
        self.quantity.max
    }

    pub fn step_size(&self) -> Decimal {
        self.quantity.step
    }

    pub fn min_price(&self) -> Decimal {
        self.price.min
    }

    pub fn max_price(&self) -> Decimal {
        self.price.max
    }

    pub fn tick_size(&self) -> Decimal {
        self.price.step
    }
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// Source of symbol rules. The exchange client implements this; tests plug in
/// fabricated rules.
pub trait SymbolRulesProvider: Send + Sync {
    /// Fetch the current rules for `symbol`.
    ///
    /// Unknown symbols are `MetadataError::NotFound`; transport failures are
    /// `MetadataError::Connection`.
    fn fetch_symbol_rules(
        &self,
        symbol: &Symbol,
    ) -> impl Future<Output = Result<SymbolRules, MetadataError>> + Send;
}

impl<P: SymbolRulesProvider> SymbolRulesProvider for std::sync::Arc<P> {
    fn fetch_symbol_rules(
        &self,
        symbol: &Symbol,
    ) -> impl Future<Output = Result<SymbolRules, MetadataError>> + Send {
        (**self).fetch_symbol_rules(symbol)
    }
}
