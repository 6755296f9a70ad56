//! Strategy commands: `twap` and `grid`.

use std::time::Duration;

use clap::Args;
use rust_decimal::Decimal;

use super::parse_side;
use crate::client::TraderClient;
use crate::error::{BotError, OrderError};
use crate::shared::{fmt, Side};
use crate::strategy::{CancelToken, GridPlan, GridStrategy, TwapPlan, TwapStrategy};

#[derive(Args, Debug)]
pub struct TwapArgs {
    /// Trading pair, e.g. BTCUSDT
    pub symbol: String,
    /// BUY or SELL
    #[arg(value_parser = parse_side)]
    pub side: Side,
    /// Total quantity to execute
    pub quantity: Decimal,
    /// Total duration in minutes
    #[arg(long)]
    pub minutes: u64,
    /// Number of slices (defaults to one per minute)
    #[arg(long)]
    pub intervals: Option<u32>,
}

#[derive(Args, Debug)]
pub struct GridArgs {
    /// Trading pair, e.g. BTCUSDT
    pub symbol: String,
    /// Lowest grid price
    #[arg(long)]
    pub lower: Decimal,
    /// Highest grid price
    #[arg(long)]
    pub upper: Decimal,
    /// Number of price levels
    #[arg(long, default_value_t = 10)]
    pub levels: u32,
    /// Total quantity spread across all levels
    #[arg(long)]
    pub quantity: Decimal,
}

pub async fn twap(client: &TraderClient, args: TwapArgs, yes: bool) -> Result<(), BotError> {
    let plan = TwapPlan {
        symbol: args.symbol,
        side: args.side,
        total_quantity: args.quantity,
        duration: Duration::from_secs(args.minutes.saturating_mul(60)),
        intervals: args.intervals,
    };

    let manager = client.order_manager();
    let strategy = TwapStrategy::new(&manager);
    let schedule = strategy.schedule(&plan).await?;

    println!(
        "TWAP: {} {} {} over {} minute(s)",
        plan.side,
        fmt::display(&plan.total_quantity),
        plan.symbol.to_ascii_uppercase(),
        args.minutes
    );
    println!(
        "  {} market orders, one every {}s",
        schedule.slices.len(),
        schedule.delay.as_secs()
    );
    for (i, slice) in schedule.slices.iter().enumerate() {
        println!("  #{:<3} {}", i + 1, fmt::display(slice));
    }
    if !super::confirm("Start TWAP execution?", yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let cancel = CancelToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping TWAP after the current slice");
                cancel.cancel();
            }
        })
    };
    let report = strategy.execute(&plan, &cancel).await;
    watcher.abort();
    let report = report?;

    println!();
    for slice in &report.slices {
        match &slice.result {
            Ok(ack) => println!(
                "  #{:<3} {} -> order {} ({})",
                slice.index,
                fmt::display(&slice.quantity),
                ack.order_id,
                ack.status
            ),
            Err(e) => println!(
                "  #{:<3} {} -> failed: {}",
                slice.index,
                fmt::display(&slice.quantity),
                e
            ),
        }
    }
    println!(
        "TWAP {}: {}/{} slices succeeded, {} executed",
        if report.cancelled { "interrupted" } else { "finished" },
        report.succeeded(),
        report.planned_slices,
        fmt::display(&report.total_executed)
    );
    if let Some(price) = report.average_price {
        println!("  average price {}", fmt::display(&price));
    }
    Ok(())
}

pub async fn grid(client: &TraderClient, args: GridArgs, yes: bool) -> Result<(), BotError> {
    let plan = GridPlan {
        symbol: args.symbol,
        lower_price: args.lower,
        upper_price: args.upper,
        levels: args.levels,
        total_quantity: args.quantity,
    };

    let manager = client.order_manager();
    let symbol = crate::domain::validation::check_symbol_syntax(&plan.symbol)
        .map_err(OrderError::Rejected)?;
    let rules = manager.validator().cache().get_rules(&symbol).await?;
    let reference = client.market().last_price(&symbol).await?;
    let levels = plan.levels(&rules, reference)?;
    let quantity = plan.quantity_per_level(&rules)?;

    println!(
        "Grid: {} levels between {} and {} on {}, {} per level (last price {})",
        levels.len(),
        fmt::display(&plan.lower_price),
        fmt::display(&plan.upper_price),
        symbol,
        fmt::display(&quantity),
        fmt::display(&reference)
    );
    for level in &levels {
        let side = level.side.map(|s| s.to_string()).unwrap_or_else(|| "skip".into());
        println!(
            "  #{:<3} {:<5} {}",
            level.index,
            side,
            fmt::fixed(&level.price, rules.price_precision)
        );
    }
    if !super::confirm("Place grid orders?", yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let mut grid = GridStrategy::new(&manager);
    let placement = grid.place(&plan, reference).await?;
    for order in &placement.placed {
        println!(
            "  #{:<3} {:<5} {} @ {} -> order {}",
            order.level,
            order.side,
            fmt::display(&order.quantity),
            fmt::display(&order.price),
            order.order_id
        );
    }
    for (level, e) in &placement.failed {
        println!("  #{:<3} failed: {}", level.index, e);
    }
    println!(
        "Grid placed: {} orders, {} skipped, {} failed",
        placement.placed.len(),
        placement.skipped.len(),
        placement.failed.len()
    );

    if !grid.is_running() {
        return Ok(());
    }
    println!("Press Ctrl-C to cancel all grid orders.");
    tokio::signal::ctrl_c().await?;

    let stop = grid.stop().await;
    println!(
        "Grid stopped: {} cancelled, {} failed",
        stop.cancelled,
        stop.failed.len()
    );
    for (order_id, e) in &stop.failed {
        println!("  order {}: {}", order_id, e);
    }
    Ok(())
}
