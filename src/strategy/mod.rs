//! Scheduled-order strategies built on the order manager.
//!
//! Both strategies submit one order at a time through
//! [`OrderManager`](crate::domain::order::OrderManager), so every sub-order is
//! validated exactly like a hand-placed one.

pub mod grid;
pub mod twap;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::error::MetadataError;

pub use grid::{GridLevel, GridOrder, GridPlacement, GridPlan, GridStopReport, GridStrategy};
pub use twap::{SliceReport, TwapPlan, TwapReport, TwapSchedule, TwapStrategy};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Cooperative cancellation flag shared between a running strategy and
/// whoever wants to stop it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Longest single sleep before re-checking the cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Sleep for `duration`, waking early if `cancel` fires. Returns `false` when
/// cancelled.
pub(crate) async fn sleep_unless_cancelled(duration: Duration, cancel: &CancelToken) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if cancel.is_cancelled() {
            return false;
        }
        let step = remaining.min(CANCEL_POLL);
        futures_timer::Delay::new(step).await;
        remaining = remaining.saturating_sub(step);
    }
    !cancel.is_cancelled()
}
