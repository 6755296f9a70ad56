//! Order domain: validated order requests, exchange acknowledgments, and the
//! gateway that submits them.

pub mod client;
mod convert;
pub mod manager;
pub mod wire;

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::HttpError;
use crate::shared::{OrderKind, Side, Symbol};

pub use client::OrdersClient;
pub use manager::OrderManager;

/// Exchange order id (or order-list id for OCO).
pub type OrderId = i64;

// ─── OrderPrices ─────────────────────────────────────────────────────────────

/// The price fields of an order. The variant is the order-type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPrices {
    Market,
    Limit {
        price: Decimal,
    },
    StopLimit {
        stop_price: Decimal,
        limit_price: Decimal,
    },
    Oco {
        limit_price: Decimal,
        stop_price: Decimal,
        stop_limit_price: Decimal,
    },
}

impl OrderPrices {
    pub fn kind(&self) -> OrderKind {
        match self {
            OrderPrices::Market => OrderKind::Market,
            OrderPrices::Limit { .. } => OrderKind::Limit,
            OrderPrices::StopLimit { .. } => OrderKind::StopLimit,
            OrderPrices::Oco { .. } => OrderKind::Oco,
        }
    }
}

// ─── OrderRequest ────────────────────────────────────────────────────────────

/// A validated, canonical order ready for submission.
///
/// Only the validation engine builds these from user input; strategies and
/// the CLI go through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
    pub prices: OrderPrices,
}

impl OrderRequest {
    pub fn kind(&self) -> OrderKind {
        self.prices.kind()
    }
}

impl std::fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.side, self.quantity, self.symbol, self.kind())?;
        match self.prices {
            OrderPrices::Market => Ok(()),
            OrderPrices::Limit { price } => write!(f, " @ {}", price),
            OrderPrices::StopLimit {
                stop_price,
                limit_price,
            } => write!(f, " stop {} limit {}", stop_price, limit_price),
            OrderPrices::Oco {
                limit_price,
                stop_price,
                stop_limit_price,
            } => write!(
                f,
                " limit {} stop {} stop-limit {}",
                limit_price, stop_price, stop_limit_price
            ),
        }
    }
}

// ─── OrderStatus ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    /// OCO order list is live.
    Executing,
    /// OCO order list has finished.
    AllDone,
    Other(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "NEW" => OrderStatus::New,
            "PARTIALLY_FILLED" => OrderStatus::PartiallyFilled,
            "FILLED" => OrderStatus::Filled,
            "CANCELED" => OrderStatus::Canceled,
            "REJECTED" | "REJECT" => OrderStatus::Rejected,
            "EXPIRED" => OrderStatus::Expired,
            "EXECUTING" => OrderStatus::Executing,
            "ALL_DONE" => OrderStatus::AllDone,
            other => OrderStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Expired => "EXPIRED",
            OrderStatus::Executing => "EXECUTING",
            OrderStatus::AllDone => "ALL_DONE",
            OrderStatus::Other(s) => s,
        }
    }

    /// Still resting on the book.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::New | OrderStatus::PartiallyFilled | OrderStatus::Executing
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── OrderAck ────────────────────────────────────────────────────────────────

/// The exchange's answer to a submit, cancel or query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderAck {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub kind: OrderKind,
    pub side: Side,
    pub status: OrderStatus,
    pub quantity: Decimal,
    pub executed_qty: Decimal,
    /// Average fill price; `None` until something has filled.
    pub avg_price: Option<Decimal>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Order ids of the legs of an OCO order list; empty otherwise.
    pub leg_order_ids: Vec<OrderId>,
}

impl OrderAck {
    /// `executed_qty * avg_price`, when anything has filled.
    pub fn filled_notional(&self) -> Option<Decimal> {
        self.avg_price
            .filter(|_| !self.executed_qty.is_zero())
            .map(|price| price * self.executed_qty)
    }
}

// ─── OrderGateway ────────────────────────────────────────────────────────────

/// Order submission collaborator. Receives only validated requests.
pub trait OrderGateway: Send + Sync {
    fn submit(
        &self,
        request: &OrderRequest,
    ) -> impl Future<Output = Result<OrderAck, HttpError>> + Send;

    fn cancel(
        &self,
        symbol: &Symbol,
        order_id: OrderId,
    ) -> impl Future<Output = Result<OrderAck, HttpError>> + Send;
}

impl<G: OrderGateway> OrderGateway for Arc<G> {
    fn submit(
        &self,
        request: &OrderRequest,
    ) -> impl Future<Output = Result<OrderAck, HttpError>> + Send {
        (**self).submit(request)
    }

    fn cancel(
        &self,
        symbol: &Symbol,
        order_id: OrderId,
    ) -> impl Future<Output = Result<OrderAck, HttpError>> + Send {
        (**self).cancel(symbol, order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_prices_kind() {
        assert_eq!(OrderPrices::Market.kind(), OrderKind::Market);
        assert_eq!(
            OrderPrices::StopLimit {
                stop_price: dec("49500"),
                limit_price: dec("49600"),
            }
            .kind(),
            OrderKind::StopLimit
        );
    }

    #[test]
    fn test_order_request_display() {
        let request = OrderRequest {
            symbol: Symbol::new("BTCUSDT"),
            side: Side::Buy,
            quantity: dec("0.01"),
            prices: OrderPrices::Limit {
                price: dec("45000"),
            },
        };
        assert_eq!(request.to_string(), "BUY 0.01 BTCUSDT limit @ 45000");
    }

    #[test]
    fn test_status_parse_and_open() {
        assert_eq!(OrderStatus::parse("PARTIALLY_FILLED"), OrderStatus::PartiallyFilled);
        assert_eq!(OrderStatus::parse("REJECT"), OrderStatus::Rejected);
        assert!(OrderStatus::parse("EXECUTING").is_open());
        assert!(!OrderStatus::parse("FILLED").is_open());
        assert_eq!(OrderStatus::parse("EXPIRED_IN_MATCH").to_string(), "EXPIRED_IN_MATCH");
    }

    #[test]
    fn test_filled_notional() {
        let mut ack = OrderAck {
            order_id: 1,
            symbol: Symbol::new("BTCUSDT"),
            kind: OrderKind::Market,
            side: Side::Buy,
            status: OrderStatus::Filled,
            quantity: dec("0.02"),
            executed_qty: dec("0.02"),
            avg_price: Some(dec("45000")),
            updated_at: None,
            leg_order_ids: Vec::new(),
        };
        assert_eq!(ack.filled_notional(), Some(dec("900")));
        ack.executed_qty = Decimal::ZERO;
        assert_eq!(ack.filled_notional(), None);
    }
}
