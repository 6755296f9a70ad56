//! # futures-trader
//!
//! Validated order placement for Binance USDⓈ-M futures, with TWAP and grid
//! strategies on top.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Shared newtypes, lattice arithmetic, domain models, the
//!    symbol-rule cache and the rule-driven order validator
//! 2. **HTTP API**: `BinanceHttp` with request signing and per-endpoint retry policies
//! 3. **High-Level Client**: `TraderClient` wiring transport, cache and sub-clients
//! 4. **Strategies + CLI**: TWAP, grid, and the `futures-trader` binary
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures_trader::prelude::*;
//!
//! let client = TraderClient::builder()
//!     .network(Network::Testnet)
//!     .credentials(&api_key, &api_secret)
//!     .build()?;
//!
//! let draft = OrderDraft::new("BTCUSDT", "BUY", dec!(0.01), OrderPrices::Limit { price: dec!(45000) });
//! let ack = client.order_manager().execute(&draft).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes, lattice arithmetic and formatting helpers.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, clients.
pub mod domain;

/// Error types, one per layer.
pub mod error;

/// Exchange URL constants.
pub mod network;

/// Environment-driven settings.
pub mod config;

/// Console + JSON file tracing setup.
pub mod logging;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with signing and retry policies.
pub mod http;

// ── Layer 3: High-Level Client ───────────────────────────────────────────────

/// `TraderClient`, the primary entry point.
pub mod client;

// ── Layer 4: Strategies + CLI ────────────────────────────────────────────────

/// TWAP and grid strategies.
pub mod strategy;

/// clap command definitions and handlers.
pub mod cli;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Lattice, OrderKind, Side, Symbol};

    // Domain types: symbol rules
    pub use crate::domain::symbol::{
        ExchangeInfoClient, SymbolCache, SymbolRules, SymbolRulesProvider, SymbolStatus,
    };

    // Domain types: orders
    pub use crate::domain::order::{
        OrderAck, OrderGateway, OrderId, OrderManager, OrderPrices, OrderRequest, OrderStatus,
        OrdersClient,
    };

    // Validation
    pub use crate::domain::validation::{
        Field, OrderDraft, Rejection, ValidationOutcome, Validator,
    };

    // Market data
    pub use crate::domain::market::{MarketClient, Ping, Ticker};

    // Strategies
    pub use crate::strategy::{
        CancelToken, GridPlan, GridStrategy, StrategyError, TwapPlan, TwapReport, TwapStrategy,
    };

    // Errors
    pub use crate::error::{BotError, ConfigError, HttpError, MetadataError, OrderError};

    // Network + config
    pub use crate::config::Config;
    pub use crate::network::Network;

    // HTTP client
    pub use crate::client::{TraderClient, TraderClientBuilder};
    pub use crate::http::retry::{RetryConfig, RetryPolicy};
}
