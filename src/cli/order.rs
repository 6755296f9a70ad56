//! Single-order commands.

use clap::Args;
use rust_decimal::Decimal;

use crate::client::TraderClient;
use crate::domain::order::{OrderAck, OrderPrices};
use crate::domain::validation::{OrderDraft, ValidationOutcome};
use crate::error::{BotError, OrderError};
use crate::shared::fmt;

#[derive(Args, Debug)]
pub struct MarketArgs {
    /// Trading pair, e.g. BTCUSDT
    pub symbol: String,
    /// BUY or SELL
    pub side: String,
    pub quantity: Decimal,
}

#[derive(Args, Debug)]
pub struct LimitArgs {
    /// Trading pair, e.g. BTCUSDT
    pub symbol: String,
    /// BUY or SELL
    pub side: String,
    pub quantity: Decimal,
    pub price: Decimal,
}

#[derive(Args, Debug)]
pub struct StopLimitArgs {
    /// Trading pair, e.g. BTCUSDT
    pub symbol: String,
    /// BUY or SELL
    pub side: String,
    pub quantity: Decimal,
    /// Price that triggers the order
    pub stop_price: Decimal,
    /// Limit price once triggered
    pub limit_price: Decimal,
}

#[derive(Args, Debug)]
pub struct OcoArgs {
    /// Trading pair, e.g. BTCUSDT
    pub symbol: String,
    /// BUY or SELL
    pub side: String,
    pub quantity: Decimal,
    /// Take-profit limit price
    pub limit_price: Decimal,
    /// Stop trigger price
    pub stop_price: Decimal,
    /// Limit price of the stop leg
    pub stop_limit_price: Decimal,
}

pub async fn market(client: &TraderClient, args: MarketArgs, yes: bool) -> Result<(), BotError> {
    let draft = OrderDraft::new(args.symbol, args.side, args.quantity, OrderPrices::Market);
    place(client, draft, yes).await
}

pub async fn limit(client: &TraderClient, args: LimitArgs, yes: bool) -> Result<(), BotError> {
    let draft = OrderDraft::new(
        args.symbol,
        args.side,
        args.quantity,
        OrderPrices::Limit { price: args.price },
    );
    place(client, draft, yes).await
}

pub async fn stop_limit(
    client: &TraderClient,
    args: StopLimitArgs,
    yes: bool,
) -> Result<(), BotError> {
    let draft = OrderDraft::new(
        args.symbol,
        args.side,
        args.quantity,
        OrderPrices::StopLimit {
            stop_price: args.stop_price,
            limit_price: args.limit_price,
        },
    );
    place(client, draft, yes).await
}

pub async fn oco(client: &TraderClient, args: OcoArgs, yes: bool) -> Result<(), BotError> {
    let draft = OrderDraft::new(
        args.symbol,
        args.side,
        args.quantity,
        OrderPrices::Oco {
            limit_price: args.limit_price,
            stop_price: args.stop_price,
            stop_limit_price: args.stop_limit_price,
        },
    );
    place(client, draft, yes).await
}

/// Validate, confirm, submit, print.
async fn place(client: &TraderClient, draft: OrderDraft, yes: bool) -> Result<(), BotError> {
    let manager = client.order_manager();

    let request = match manager.validator().validate(&draft).await? {
        ValidationOutcome::Accepted(request) => request,
        ValidationOutcome::Rejected(rejection) => {
            return Err(OrderError::Rejected(rejection).into());
        }
    };

    println!("Order: {}", request);
    if !super::confirm("Place this order?", yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let ack = manager.execute(&draft).await?;
    print_ack(&ack);
    Ok(())
}

pub(crate) fn print_ack(ack: &OrderAck) {
    println!("Order placed: id {} ({})", ack.order_id, ack.status);
    println!(
        "  {} {} {} {}",
        ack.side,
        fmt::display(&ack.quantity),
        ack.symbol,
        ack.kind
    );
    if !ack.executed_qty.is_zero() {
        println!("  executed    {}", fmt::display(&ack.executed_qty));
    }
    if let Some(price) = ack.avg_price {
        println!("  avg price   {}", fmt::display(&price));
    }
    if !ack.leg_order_ids.is_empty() {
        let legs: Vec<String> = ack.leg_order_ids.iter().map(|id| id.to_string()).collect();
        println!("  legs        {}", legs.join(", "));
    }
}
