//! Time-weighted order splitting.
//!
//! A total quantity is cut into `intervals` market orders placed
//! `duration / intervals` apart. Every slice sits on the quantity lattice; the
//! last slice absorbs whatever the floored slices left over.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{sleep_unless_cancelled, CancelToken, StrategyError};
use crate::domain::order::{OrderAck, OrderGateway, OrderManager, OrderPrices};
use crate::domain::symbol::{SymbolRules, SymbolRulesProvider};
use crate::domain::validation::{check_symbol_syntax, OrderDraft};
use crate::shared::Side;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwapPlan {
    pub symbol: String,
    pub side: Side,
    pub total_quantity: Decimal,
    pub duration: Duration,
    /// Defaults to the duration in whole minutes (at least one).
    pub intervals: Option<u32>,
}

/// Slice sizes plus the pause between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwapSchedule {
    pub slices: Vec<Decimal>,
    pub delay: Duration,
}

impl TwapPlan {
    pub fn intervals(&self) -> u32 {
        self.intervals
            .unwrap_or_else(|| (self.duration.as_secs() / 60).max(1) as u32)
    }

    /// Cut the plan into lattice-aligned slices.
    pub fn schedule(&self, rules: &SymbolRules) -> Result<TwapSchedule, StrategyError> {
        if self.total_quantity <= Decimal::ZERO {
            return Err(StrategyError::InvalidPlan(
                "total quantity must be positive".into(),
            ));
        }
        if self.duration.is_zero() {
            return Err(StrategyError::InvalidPlan("duration must be positive".into()));
        }
        let n = self.intervals();
        if n == 0 {
            return Err(StrategyError::InvalidPlan("intervals must be positive".into()));
        }

        let lattice = &rules.quantity;
        let even = self.total_quantity / Decimal::from(n);
        let base = lattice.floor(even).ok_or_else(|| {
            StrategyError::InvalidPlan(format!(
                "slice quantity {} is below the minimum {} for {}; use fewer intervals",
                even.normalize(),
                lattice.min,
                rules.symbol
            ))
        })?;

        let mut slices = vec![base; n as usize];
        let last = self.total_quantity - base * Decimal::from(n - 1);
        if let Some(slot) = slices.last_mut() {
            *slot = last.normalize();
        }

        for (i, slice) in slices.iter().enumerate() {
            lattice.check(*slice).map_err(|violation| {
                StrategyError::InvalidPlan(format!(
                    "slice {} of {} ({}) violates the quantity rules for {}: {:?}",
                    i + 1,
                    n,
                    slice,
                    rules.symbol,
                    violation
                ))
            })?;
        }

        Ok(TwapSchedule {
            slices,
            delay: self.duration / n,
        })
    }
}

/// What happened to one slice. Failures are kept as display text: the run
/// carries on past them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceReport {
    /// 1-based.
    pub index: u32,
    pub quantity: Decimal,
    pub result: Result<OrderAck, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwapReport {
    pub slices: Vec<SliceReport>,
    pub planned_slices: u32,
    pub total_executed: Decimal,
    /// Volume-weighted average fill price across all slices.
    pub average_price: Option<Decimal>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cancelled: bool,
}

impl TwapReport {
    pub fn succeeded(&self) -> usize {
        self.slices.iter().filter(|s| s.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.slices.len() - self.succeeded()
    }
}

/// Runs [`TwapPlan`]s through an order manager.
pub struct TwapStrategy<'a, P, G> {
    manager: &'a OrderManager<P, G>,
}

impl<'a, P: SymbolRulesProvider, G: OrderGateway> TwapStrategy<'a, P, G> {
    pub fn new(manager: &'a OrderManager<P, G>) -> Self {
        Self { manager }
    }

    /// Plan against the symbol's current rules without placing anything.
    pub async fn schedule(&self, plan: &TwapPlan) -> Result<TwapSchedule, StrategyError> {
        let symbol = check_symbol_syntax(&plan.symbol)
            .map_err(|r| StrategyError::InvalidPlan(r.to_string()))?;
        let rules = self.manager.validator().cache().get_rules(&symbol).await?;
        plan.schedule(&rules)
    }

    pub async fn execute(
        &self,
        plan: &TwapPlan,
        cancel: &CancelToken,
    ) -> Result<TwapReport, StrategyError> {
        let schedule = self.schedule(plan).await?;
        let planned = schedule.slices.len() as u32;

        tracing::info!(
            symbol = %plan.symbol,
            side = %plan.side,
            total_quantity = %plan.total_quantity,
            intervals = planned,
            delay_secs = schedule.delay.as_secs_f64(),
            "Starting TWAP execution"
        );

        let started_at = Utc::now();
        let mut slices = Vec::with_capacity(schedule.slices.len());
        let mut cancelled = false;

        for (i, quantity) in schedule.slices.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let index = i as u32 + 1;
            tracing::info!(interval = index, of = planned, quantity = %quantity, "Executing TWAP slice");

            let draft = OrderDraft::new(
                plan.symbol.clone(),
                plan.side.as_str(),
                *quantity,
                OrderPrices::Market,
            );
            let result = match self.manager.execute(&draft).await {
                Ok(ack) => Ok(ack),
                Err(e) => {
                    tracing::error!(interval = index, of = planned, error = %e, "TWAP slice failed");
                    Err(e.to_string())
                }
            };
            slices.push(SliceReport {
                index,
                quantity: *quantity,
                result,
            });

            if index < planned && !sleep_unless_cancelled(schedule.delay, cancel).await {
                cancelled = true;
                break;
            }
        }

        let (total_executed, notional) = slices
            .iter()
            .filter_map(|s| s.result.as_ref().ok())
            .fold((Decimal::ZERO, Decimal::ZERO), |(qty, value), ack| {
                (
                    qty + ack.executed_qty,
                    value + ack.filled_notional().unwrap_or_default(),
                )
            });
        let average_price = if total_executed.is_zero() {
            None
        } else {
            notional.checked_div(total_executed)
        };

        let report = TwapReport {
            slices,
            planned_slices: planned,
            total_executed,
            average_price,
            started_at,
            finished_at: Utc::now(),
            cancelled,
        };

        tracing::info!(
            symbol = %plan.symbol,
            side = %plan.side,
            total_executed = %report.total_executed,
            slices_ok = report.succeeded(),
            slices_failed = report.failed(),
            slices_planned = planned,
            avg_price = ?report.average_price,
            cancelled = report.cancelled,
            "TWAP execution finished"
        );

        Ok(report)
    }
}
