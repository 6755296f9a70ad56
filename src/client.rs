//! High-level client: `TraderClient` wiring transport, cache, validator and
//! sub-clients together.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`. This
//! module keeps the builder and the shared symbol cache.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::domain::market::MarketClient;
use crate::domain::order::{OrderManager, OrdersClient};
use crate::domain::symbol::{ExchangeInfoClient, SymbolCache};
use crate::domain::validation::Validator;
use crate::error::BotError;
use crate::http::{BinanceHmacSigner, BinanceHttp};
use crate::network::Network;

/// Order manager backed by the live exchange.
pub type LiveOrderManager = OrderManager<ExchangeInfoClient, OrdersClient>;

/// The primary entry point.
#[derive(Clone)]
pub struct TraderClient {
    pub(crate) http: BinanceHttp,
    /// Symbol rules, shared by every validator handed out by this client.
    pub(crate) symbols: Arc<SymbolCache<ExchangeInfoClient>>,
    pub(crate) orders: OrdersClient,
    pub(crate) market: MarketClient,
}

impl TraderClient {
    pub fn builder() -> TraderClientBuilder {
        TraderClientBuilder::default()
    }

    pub fn from_config(config: &Config) -> Result<Self, BotError> {
        Self::builder()
            .network(config.network)
            .credentials(&config.api_key, &config.api_secret)
            .recv_window_ms(config.recv_window_ms)
            .timeout(config.http_timeout)
            .build()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn market(&self) -> &MarketClient {
        &self.market
    }

    pub fn orders(&self) -> &OrdersClient {
        &self.orders
    }

    pub fn symbols(&self) -> &Arc<SymbolCache<ExchangeInfoClient>> {
        &self.symbols
    }

    pub fn validator(&self) -> Validator<ExchangeInfoClient> {
        Validator::new(Arc::clone(&self.symbols))
    }

    pub fn order_manager(&self) -> LiveOrderManager {
        OrderManager::new(self.validator(), self.orders.clone())
    }

    pub fn http(&self) -> &BinanceHttp {
        &self.http
    }
}

impl std::fmt::Debug for TraderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraderClient")
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct TraderClientBuilder {
    futures_url: String,
    spot_url: String,
    credentials: Option<(String, String)>,
    recv_window_ms: u64,
    timeout: Duration,
}

impl Default for TraderClientBuilder {
    fn default() -> Self {
        Self {
            futures_url: Network::Testnet.futures_url().to_string(),
            spot_url: Network::Testnet.spot_url().to_string(),
            credentials: None,
            recv_window_ms: 5_000,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TraderClientBuilder {
    /// Use the standard hosts of `network`.
    pub fn network(mut self, network: Network) -> Self {
        self.futures_url = network.futures_url().to_string();
        self.spot_url = network.spot_url().to_string();
        self
    }

    pub fn futures_url(mut self, url: &str) -> Self {
        self.futures_url = url.to_string();
        self
    }

    pub fn spot_url(mut self, url: &str) -> Self {
        self.spot_url = url.to_string();
        self
    }

    pub fn credentials(mut self, api_key: &str, api_secret: &str) -> Self {
        self.credentials = Some((api_key.to_string(), api_secret.to_string()));
        self
    }

    pub fn recv_window_ms(mut self, ms: u64) -> Self {
        self.recv_window_ms = ms;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<TraderClient, BotError> {
        let mut http = BinanceHttp::new(&self.futures_url, &self.spot_url, self.timeout)?;
        if let Some((key, secret)) = self.credentials {
            http = http.with_signer(
                Arc::new(BinanceHmacSigner::new(key, secret)),
                self.recv_window_ms,
            );
        }

        Ok(TraderClient {
            symbols: Arc::new(SymbolCache::new(ExchangeInfoClient::new(http.clone()))),
            orders: OrdersClient::new(http.clone()),
            market: MarketClient::new(http.clone()),
            http,
        })
    }
}
