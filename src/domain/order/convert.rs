//! Conversions: exchange order responses → `OrderAck`.

use rust_decimal::Decimal;

use super::wire::{OcoResponse, OrderResponse};
use super::{OrderAck, OrderRequest, OrderStatus};
use crate::error::HttpError;
use crate::shared::{OrderKind, Side, Symbol};

/// Map the exchange's `type` field onto the order kinds the bot places.
fn kind_from_exchange(order_type: &str) -> Option<OrderKind> {
    match order_type {
        "MARKET" => Some(OrderKind::Market),
        "LIMIT" | "LIMIT_MAKER" => Some(OrderKind::Limit),
        "STOP" | "STOP_LOSS_LIMIT" => Some(OrderKind::StopLimit),
        _ => None,
    }
}

/// The exchange reports "nothing filled yet" as an average price of zero.
fn non_zero(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| !v.is_zero())
}

impl TryFrom<OrderResponse> for OrderAck {
    type Error = HttpError;

    fn try_from(resp: OrderResponse) -> Result<Self, Self::Error> {
        let kind = kind_from_exchange(&resp.order_type).ok_or_else(|| {
            HttpError::InvalidResponse(format!("unsupported order type '{}'", resp.order_type))
        })?;
        let side = Side::parse(&resp.side)
            .ok_or_else(|| HttpError::InvalidResponse(format!("unknown side '{}'", resp.side)))?;

        Ok(OrderAck {
            order_id: resp.order_id,
            symbol: Symbol::new(&resp.symbol),
            kind,
            side,
            status: OrderStatus::parse(&resp.status),
            quantity: resp.orig_qty.unwrap_or_default(),
            executed_qty: resp.executed_qty.unwrap_or_default(),
            avg_price: non_zero(resp.avg_price),
            updated_at: resp.update_time,
            leg_order_ids: Vec::new(),
        })
    }
}

impl OrderAck {
    /// Acknowledge an OCO order list. The list response carries no top-level
    /// side or quantity, so those come from the request that was sent.
    pub fn from_oco(resp: OcoResponse, request: &OrderRequest) -> Self {
        let executed_qty: Decimal = resp
            .order_reports
            .iter()
            .filter_map(|r| r.executed_qty)
            .sum();
        let quote_qty: Decimal = resp
            .order_reports
            .iter()
            .filter_map(|r| r.cummulative_quote_qty)
            .sum();
        let avg_price = if executed_qty.is_zero() {
            None
        } else {
            quote_qty.checked_div(executed_qty).and_then(|p| non_zero(Some(p)))
        };

        OrderAck {
            order_id: resp.order_list_id,
            symbol: Symbol::new(&resp.symbol),
            kind: OrderKind::Oco,
            side: request.side,
            status: OrderStatus::parse(&resp.list_order_status),
            quantity: request.quantity,
            executed_qty,
            avg_price,
            updated_at: Some(resp.transaction_time),
            leg_order_ids: resp.orders.iter().map(|leg| leg.order_id).collect(),
        }
    }
}
