//! Read-only commands: `ping` and `rules`.

use clap::Args;
use rust_decimal::Decimal;

use crate::client::TraderClient;
use crate::domain::validation::check_symbol_syntax;
use crate::error::{BotError, OrderError};
use crate::shared::fmt;

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Trading pair, e.g. BTCUSDT
    pub symbol: String,
}

pub async fn ping(client: &TraderClient) -> Result<(), BotError> {
    let ping = client.market().ping().await?;
    println!(
        "Connected to {} (server time {}, round trip {} ms)",
        client.http().futures_url(),
        ping.server_time.format("%Y-%m-%d %H:%M:%S UTC"),
        ping.round_trip.as_millis()
    );
    Ok(())
}

pub async fn rules(client: &TraderClient, args: RulesArgs) -> Result<(), BotError> {
    let symbol = check_symbol_syntax(&args.symbol).map_err(OrderError::Rejected)?;
    let rules = client.symbols().get_rules(&symbol).await?;

    println!("{} ({}/{})", rules.symbol, rules.base_asset, rules.quote_asset);
    println!("  status      {}", rules.status);
    println!(
        "  quantity    min {}  max {}  step {}",
        fmt::display(&rules.min_qty()),
        upper_bound(rules.max_qty()),
        rules.step_size().normalize()
    );
    println!(
        "  price       min {}  max {}  tick {}",
        fmt::display(&rules.min_price()),
        upper_bound(rules.max_price()),
        rules.tick_size().normalize()
    );
    println!(
        "  precision   quantity {}  price {}",
        rules.quantity_precision, rules.price_precision
    );
    Ok(())
}

fn upper_bound(value: Decimal) -> String {
    if value == Decimal::MAX {
        "none".to_string()
    } else {
        fmt::display(&value)
    }
}
