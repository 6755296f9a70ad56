//! Conversions: exchange wire types → `SymbolRules`.

use rust_decimal::Decimal;

use super::wire::{SymbolFilter, SymbolResponse};
use super::{SymbolRules, SymbolStatus};
use crate::error::MetadataError;
use crate::shared::{Lattice, Symbol};

/// The exchange reports "no upper bound" as a maximum of zero.
fn upper_bound(max: Decimal) -> Decimal {
    if max.is_zero() {
        Decimal::MAX
    } else {
        max
    }
}

impl TryFrom<SymbolResponse> for SymbolRules {
    type Error = MetadataError;

    fn try_from(resp: SymbolResponse) -> Result<Self, Self::Error> {
        let malformed = |reason: String| MetadataError::Malformed {
            symbol: resp.symbol.clone(),
            reason,
        };

        let mut quantity = None;
        let mut price = None;
        for filter in &resp.filters {
            match filter {
                SymbolFilter::LotSize {
                    min_qty,
                    max_qty,
                    step_size,
                } => {
                    let lattice = Lattice::new(*min_qty, upper_bound(*max_qty), *step_size)
                        .map_err(|e| malformed(format!("LOT_SIZE: {}", e)))?;
                    quantity = Some(lattice);
                }
                SymbolFilter::PriceFilter {
                    min_price,
                    max_price,
                    tick_size,
                } => {
                    let lattice = Lattice::new(*min_price, upper_bound(*max_price), *tick_size)
                        .map_err(|e| malformed(format!("PRICE_FILTER: {}", e)))?;
                    price = Some(lattice);
                }
                SymbolFilter::Other => {}
            }
        }

        let quantity = quantity.ok_or_else(|| malformed("missing LOT_SIZE filter".into()))?;
        let price = price.ok_or_else(|| malformed("missing PRICE_FILTER filter".into()))?;

        Ok(SymbolRules {
            symbol: Symbol::new(&resp.symbol),
            status: SymbolStatus::parse(&resp.status),
            quantity_precision: resp.quantity_precision.unwrap_or_else(|| quantity.precision()),
            price_precision: resp.price_precision.unwrap_or_else(|| price.precision()),
            base_asset: resp.base_asset,
            quote_asset: resp.quote_asset,
            quantity,
            price,
        })
    }
}
