//! Market data: connectivity check and last traded price.

pub mod client;
pub mod wire;

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::shared::Symbol;

pub use client::MarketClient;

/// Result of a connectivity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ping {
    pub server_time: DateTime<Utc>,
    pub round_trip: Duration,
}

/// Last traded price of a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    pub symbol: Symbol,
    pub price: Decimal,
    pub time: Option<DateTime<Utc>>,
}

impl From<wire::TickerPriceResponse> for Ticker {
    fn from(resp: wire::TickerPriceResponse) -> Self {
        Ticker {
            symbol: Symbol::new(&resp.symbol),
            price: resp.price,
            time: resp.time,
        }
    }
}
