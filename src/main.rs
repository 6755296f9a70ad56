use std::process::ExitCode;

use clap::Parser;

use futures_trader::cli::{self, Cli};
use futures_trader::client::TraderClient;
use futures_trader::config::Config;
use futures_trader::error::{BotError, OrderError};
use futures_trader::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init(&config.log_level, &config.log_file) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(2);
    }

    tracing::info!(network = %config.network, "Starting futures-trader");

    let client = match TraderClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli::execute(cli, &client).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(BotError::Order(OrderError::Rejected(rejection))) => {
            eprintln!("Order rejected: {}", rejection);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
