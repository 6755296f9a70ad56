//! Static price grid.
//!
//! Limit orders are placed at evenly spaced levels between a lower and upper
//! price: buys below the reference price, sells above it. Placement is
//! one-shot; filled orders are not replaced.

use rust_decimal::Decimal;

use super::StrategyError;
use crate::domain::order::{OrderGateway, OrderId, OrderManager, OrderPrices, OrderStatus};
use crate::domain::symbol::{SymbolRules, SymbolRulesProvider};
use crate::domain::validation::{check_symbol_syntax, OrderDraft};
use crate::shared::{Side, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPlan {
    pub symbol: String,
    pub lower_price: Decimal,
    pub upper_price: Decimal,
    pub levels: u32,
    /// Spread evenly over all levels.
    pub total_quantity: Decimal,
}

/// One grid level. `side` is `None` when the level sits exactly on the
/// reference price and is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLevel {
    /// 1-based.
    pub index: u32,
    pub price: Decimal,
    pub side: Option<Side>,
}

impl GridPlan {
    fn check(&self) -> Result<(), StrategyError> {
        if self.lower_price <= Decimal::ZERO {
            return Err(StrategyError::InvalidPlan(
                "lower price must be positive".into(),
            ));
        }
        if self.upper_price <= self.lower_price {
            return Err(StrategyError::InvalidPlan(
                "upper price must be greater than lower price".into(),
            ));
        }
        if self.levels < 2 {
            return Err(StrategyError::InvalidPlan(
                "number of grid levels must be at least 2".into(),
            ));
        }
        if self.total_quantity <= Decimal::ZERO {
            return Err(StrategyError::InvalidPlan(
                "total quantity must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Evenly spaced prices snapped to the tick lattice. Levels that collapse
    /// onto the same tick are merged. The whole range must lie within the
    /// symbol's price bounds.
    pub fn prices(&self, rules: &SymbolRules) -> Result<Vec<Decimal>, StrategyError> {
        self.check()?;
        let bounds = &rules.price;
        if self.lower_price < bounds.min || self.upper_price > bounds.max {
            return Err(StrategyError::InvalidPlan(format!(
                "grid range {} - {} is outside the price limits {} - {} for {}",
                self.lower_price.normalize(),
                self.upper_price.normalize(),
                bounds.min.normalize(),
                bounds.max.normalize(),
                rules.symbol
            )));
        }

        let spacing = (self.upper_price - self.lower_price) / Decimal::from(self.levels - 1);
        let mut prices = Vec::with_capacity(self.levels as usize);
        for i in 0..self.levels {
            let raw = self.lower_price + spacing * Decimal::from(i);
            let snapped = bounds.snap(raw).ok_or_else(|| {
                StrategyError::InvalidPlan(format!("cannot snap level {} to the price grid", raw))
            })?;
            prices.push(snapped);
        }
        prices.dedup();
        Ok(prices)
    }

    /// Quantity placed at every level: the total split evenly, floored to
    /// the step size.
    pub fn quantity_per_level(&self, rules: &SymbolRules) -> Result<Decimal, StrategyError> {
        self.check()?;
        let even = self.total_quantity / Decimal::from(self.levels);
        rules.quantity.floor(even).ok_or_else(|| {
            StrategyError::InvalidPlan(format!(
                "quantity per level {} is below the minimum {} for {}; use fewer levels",
                even.normalize(),
                rules.quantity.min,
                rules.symbol
            ))
        })
    }

    /// Levels with their side relative to `reference_price`.
    pub fn levels(
        &self,
        rules: &SymbolRules,
        reference_price: Decimal,
    ) -> Result<Vec<GridLevel>, StrategyError> {
        Ok(self
            .prices(rules)?
            .into_iter()
            .enumerate()
            .map(|(i, price)| GridLevel {
                index: i as u32 + 1,
                price,
                side: side_for(price, reference_price),
            })
            .collect())
    }
}

fn side_for(price: Decimal, reference_price: Decimal) -> Option<Side> {
    match price.cmp(&reference_price) {
        std::cmp::Ordering::Less => Some(Side::Buy),
        std::cmp::Ordering::Greater => Some(Side::Sell),
        std::cmp::Ordering::Equal => None,
    }
}

/// A resting grid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOrder {
    pub symbol: Symbol,
    pub level: u32,
    pub order_id: OrderId,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridPlacement {
    pub placed: Vec<GridOrder>,
    /// Levels at the reference price.
    pub skipped: Vec<GridLevel>,
    pub failed: Vec<(GridLevel, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridStopReport {
    pub cancelled: usize,
    pub failed: Vec<(OrderId, String)>,
}

/// Places a grid and remembers its orders so they can be cancelled.
pub struct GridStrategy<'a, P, G> {
    manager: &'a OrderManager<P, G>,
    active: Vec<GridOrder>,
}

impl<'a, P: SymbolRulesProvider, G: OrderGateway> GridStrategy<'a, P, G> {
    pub fn new(manager: &'a OrderManager<P, G>) -> Self {
        Self {
            manager,
            active: Vec::new(),
        }
    }

    pub fn active_orders(&self) -> &[GridOrder] {
        &self.active
    }

    pub fn is_running(&self) -> bool {
        !self.active.is_empty()
    }

    /// Place one limit order per level. Levels that fail are recorded and
    /// placement moves on to the next one.
    pub async fn place(
        &mut self,
        plan: &GridPlan,
        reference_price: Decimal,
    ) -> Result<GridPlacement, StrategyError> {
        let symbol = check_symbol_syntax(&plan.symbol)
            .map_err(|r| StrategyError::InvalidPlan(r.to_string()))?;
        let rules = self.manager.validator().cache().get_rules(&symbol).await?;
        let levels = plan.levels(&rules, reference_price)?;
        let quantity = plan.quantity_per_level(&rules)?;

        tracing::info!(
            symbol = %symbol,
            levels = levels.len(),
            quantity_per_level = %quantity,
            reference_price = %reference_price,
            "Placing grid orders"
        );

        let mut placement = GridPlacement::default();
        for level in levels {
            let Some(side) = level.side else {
                tracing::debug!(level = level.index, price = %level.price, "Skipping grid level at reference price");
                placement.skipped.push(level);
                continue;
            };

            let draft = OrderDraft::new(
                symbol.as_str(),
                side.as_str(),
                quantity,
                OrderPrices::Limit { price: level.price },
            );
            match self.manager.execute(&draft).await {
                Ok(ack) => {
                    let order = GridOrder {
                        symbol: symbol.clone(),
                        level: level.index,
                        order_id: ack.order_id,
                        side,
                        price: level.price,
                        quantity,
                        status: ack.status,
                    };
                    self.active.push(order.clone());
                    placement.placed.push(order);
                }
                Err(e) => {
                    tracing::error!(level = level.index, price = %level.price, error = %e, "Grid order failed");
                    placement.failed.push((level, e.to_string()));
                }
            }
        }

        tracing::info!(
            symbol = %symbol,
            placed = placement.placed.len(),
            skipped = placement.skipped.len(),
            failed = placement.failed.len(),
            "Grid placement complete"
        );
        Ok(placement)
    }

    /// Cancel every active grid order.
    pub async fn stop(&mut self) -> GridStopReport {
        let mut report = GridStopReport::default();
        for order in self.active.drain(..) {
            match self.manager.gateway().cancel(&order.symbol, order.order_id).await {
                Ok(_) => report.cancelled += 1,
                Err(e) => {
                    tracing::warn!(symbol = %order.symbol, order_id = order.order_id, error = %e, "Failed to cancel grid order");
                    report.failed.push((order.order_id, e.to_string()));
                }
            }
        }

        tracing::info!(
            cancelled = report.cancelled,
            failed = report.failed.len(),
            "Grid stopped"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::SymbolStatus;
    use crate::shared::Lattice;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rules() -> SymbolRules {
        SymbolRules {
            symbol: Symbol::new("BTCUSDT"),
            status: SymbolStatus::Trading,
            base_asset: "BTC".into(),
            quote_asset: "USDT".into(),
            quantity: Lattice::new(dec("0.001"), dec("1000"), dec("0.001")).unwrap(),
            price: Lattice::new(dec("556.80"), dec("4529764"), dec("0.10")).unwrap(),
            quantity_precision: 3,
            price_precision: 1,
        }
    }

    fn plan(lower: &str, upper: &str, levels: u32, total: &str) -> GridPlan {
        GridPlan {
            symbol: "BTCUSDT".into(),
            lower_price: dec(lower),
            upper_price: dec(upper),
            levels,
            total_quantity: dec(total),
        }
    }

    #[test]
    fn test_prices_evenly_spaced() {
        let prices = plan("40000", "44000", 5, "0.05").prices(&rules()).unwrap();
        let expected: Vec<Decimal> = ["40000", "41000", "42000", "43000", "44000"]
            .iter()
            .map(|s| dec(s))
            .collect();
        assert_eq!(prices, expected);
    }

    #[test]
    fn test_prices_snap_to_tick() {
        let prices = plan("40000", "40001", 4, "0.04").prices(&rules()).unwrap();
        // 40000, 40000.333.., 40000.666.., 40001
        assert_eq!(
            prices,
            vec![dec("40000"), dec("40000.3"), dec("40000.7"), dec("40001")]
        );
        assert!(prices.iter().all(|p| rules().price.is_aligned(*p)));
    }

    #[test]
    fn test_quantity_per_level_is_floored() {
        let qty = plan("40000", "44000", 3, "0.1").quantity_per_level(&rules()).unwrap();
        assert_eq!(qty, dec("0.033"));
        assert!(plan("40000", "44000", 3, "0.002").quantity_per_level(&rules()).is_err());
    }

    #[test]
    fn test_levels_sides_follow_reference_price() {
        let levels = plan("40000", "44000", 5, "0.05")
            .levels(&rules(), dec("42000"))
            .unwrap();
        let sides: Vec<Option<Side>> = levels.iter().map(|l| l.side).collect();
        assert_eq!(
            sides,
            vec![Some(Side::Buy), Some(Side::Buy), None, Some(Side::Sell), Some(Side::Sell)]
        );
        assert_eq!(levels[0].index, 1);
    }

    #[test]
    fn test_plan_checks() {
        assert!(plan("0", "44000", 5, "1").prices(&rules()).is_err());
        assert!(plan("44000", "44000", 5, "1").prices(&rules()).is_err());
        assert!(plan("40000", "44000", 1, "1").prices(&rules()).is_err());
        assert!(plan("40000", "44000", 5, "0").prices(&rules()).is_err());
    }

    #[test]
    fn test_range_outside_price_limits_is_rejected() {
        let err = plan("100", "1000", 4, "0.04").prices(&rules()).unwrap_err();
        assert!(matches!(err, StrategyError::InvalidPlan(ref m) if m.contains("outside the price limits")));
        assert!(plan("40000", "5000000", 4, "0.04").prices(&rules()).is_err());
        assert!(plan("556.80", "1000", 4, "0.04").prices(&rules()).is_ok());
    }
}
