//! Command-line interface.
//!
//! Every order command validates first, shows what will be sent, asks for
//! confirmation (unless `--yes`), then places the order.

pub mod info;
pub mod order;
pub mod strategy;

use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};

use crate::client::TraderClient;
use crate::error::BotError;
use crate::shared::Side;

/// Futures order bot
#[derive(Parser, Debug)]
#[command(name = "futures-trader")]
#[command(about = "Validated order placement and simple scheduled strategies for USDⓈ-M futures")]
#[command(version)]
pub struct Cli {
    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check connectivity with the exchange
    Ping,
    /// Show trading rules for a symbol
    Rules(info::RulesArgs),
    /// Place a market order
    Market(order::MarketArgs),
    /// Place a limit order
    Limit(order::LimitArgs),
    /// Place a stop-limit order
    StopLimit(order::StopLimitArgs),
    /// Place an OCO (one-cancels-the-other) order
    Oco(order::OcoArgs),
    /// Split an order into equal market orders over time
    Twap(strategy::TwapArgs),
    /// Place a static grid of limit orders; Ctrl-C cancels them
    Grid(strategy::GridArgs),
}

/// Run one command against `client`.
pub async fn execute(cli: Cli, client: &TraderClient) -> Result<(), BotError> {
    let yes = cli.yes;
    match cli.command {
        Commands::Ping => info::ping(client).await,
        Commands::Rules(args) => info::rules(client, args).await,
        Commands::Market(args) => order::market(client, args, yes).await,
        Commands::Limit(args) => order::limit(client, args, yes).await,
        Commands::StopLimit(args) => order::stop_limit(client, args, yes).await,
        Commands::Oco(args) => order::oco(client, args, yes).await,
        Commands::Twap(args) => strategy::twap(client, args, yes).await,
        Commands::Grid(args) => strategy::grid(client, args, yes).await,
    }
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> Result<bool, BotError> {
    if assume_yes {
        return Ok(true);
    }
    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// clap value parser for strategy sides.
pub(crate) fn parse_side(raw: &str) -> Result<Side, String> {
    Side::parse(raw).ok_or_else(|| format!("side must be BUY or SELL, got '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_limit_command() {
        let cli = Cli::try_parse_from([
            "futures-trader",
            "limit",
            "btcusdt",
            "buy",
            "0.01",
            "45000",
            "--yes",
        ])
        .unwrap();
        assert!(cli.yes);
        match cli.command {
            Commands::Limit(args) => {
                assert_eq!(args.symbol, "btcusdt");
                assert_eq!(args.price.to_string(), "45000");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_twap_rejects_bad_side() {
        assert!(Cli::try_parse_from([
            "futures-trader",
            "twap",
            "BTCUSDT",
            "LONG",
            "0.1",
            "--minutes",
            "5"
        ])
        .is_err());
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }
}
