//! In-memory exchange used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;

use futures_trader::domain::order::{OrderAck, OrderGateway, OrderId, OrderRequest, OrderStatus};
use futures_trader::domain::symbol::{SymbolCache, SymbolRules, SymbolRulesProvider, SymbolStatus};
use futures_trader::domain::validation::Validator;
use futures_trader::domain::order::OrderManager;
use futures_trader::error::{HttpError, MetadataError};
use futures_trader::shared::{Lattice, OrderKind, Symbol};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn rules(
    symbol: &str,
    status: SymbolStatus,
    qty: (&str, &str, &str),
    price: (&str, &str, &str),
) -> SymbolRules {
    let quantity = Lattice::new(dec(qty.0), dec(qty.1), dec(qty.2)).unwrap();
    let price = Lattice::new(dec(price.0), dec(price.1), dec(price.2)).unwrap();
    SymbolRules {
        symbol: Symbol::new(symbol),
        status,
        base_asset: symbol.trim_end_matches("USDT").to_string(),
        quote_asset: "USDT".into(),
        quantity_precision: quantity.precision(),
        price_precision: price.precision(),
        quantity,
        price,
    }
}

/// BTCUSDT as listed on the futures testnet.
pub fn btcusdt() -> SymbolRules {
    rules(
        "BTCUSDT",
        SymbolStatus::Trading,
        ("0.001", "1000", "0.001"),
        ("556.80", "4529764", "0.10"),
    )
}

/// Minimum that is not a multiple of the step: the lattice starts at the
/// minimum, not at zero.
pub fn oddusdt() -> SymbolRules {
    rules(
        "ODDUSDT",
        SymbolStatus::Trading,
        ("0.15", "100", "0.1"),
        ("1.05", "1000", "0.1"),
    )
}

pub fn haltedusdt() -> SymbolRules {
    rules(
        "HALTEDUSDT",
        SymbolStatus::Break,
        ("0.001", "1000", "0.001"),
        ("0.1", "100000", "0.1"),
    )
}

// ─── Rules provider ──────────────────────────────────────────────────────────

/// Serves fixed rules and counts how often it is asked.
#[derive(Default)]
pub struct FakeRules {
    rules: HashMap<Symbol, SymbolRules>,
    fetches: Mutex<HashMap<Symbol, usize>>,
    /// Number of upcoming fetches that fail with a connection error.
    outages: AtomicUsize,
    latency: Option<Duration>,
}

impl FakeRules {
    pub fn new(listed: impl IntoIterator<Item = SymbolRules>) -> Self {
        Self {
            rules: listed.into_iter().map(|r| (r.symbol.clone(), r)).collect(),
            ..Default::default()
        }
    }

    pub fn standard() -> Self {
        Self::new([btcusdt(), oddusdt(), haltedusdt()])
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_next(&self, count: usize) {
        self.outages.store(count, Ordering::SeqCst);
    }

    pub fn fetches(&self, symbol: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&Symbol::new(symbol))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

impl SymbolRulesProvider for FakeRules {
    async fn fetch_symbol_rules(&self, symbol: &Symbol) -> Result<SymbolRules, MetadataError> {
        *self.fetches.lock().unwrap().entry(symbol.clone()).or_default() += 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let outage = self
            .outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if outage {
            return Err(MetadataError::Connection("connection refused".into()));
        }
        self.rules
            .get(symbol)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound {
                symbol: symbol.to_string(),
            })
    }
}

pub fn validator(provider: Arc<FakeRules>) -> Validator<Arc<FakeRules>> {
    Validator::new(Arc::new(SymbolCache::new(provider)))
}

// ─── Order gateway ───────────────────────────────────────────────────────────

/// Accepts every order. Market orders fill at `fill_price`; everything else
/// rests as `NEW`.
pub struct FakeGateway {
    next_id: AtomicI64,
    fill_price: Decimal,
    submitted: Mutex<Vec<OrderRequest>>,
    cancelled: Mutex<Vec<(Symbol, OrderId)>>,
    /// 1-based submissions that fail with a server error.
    failing: Vec<usize>,
}

impl FakeGateway {
    pub fn new(fill_price: &str) -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            fill_price: dec(fill_price),
            submitted: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            failing: Vec::new(),
        }
    }

    pub fn failing_on(mut self, submissions: &[usize]) -> Self {
        self.failing = submissions.to_vec();
        self
    }

    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<OrderId> {
        self.cancelled_orders().into_iter().map(|(_, id)| id).collect()
    }

    pub fn cancelled_orders(&self) -> Vec<(Symbol, OrderId)> {
        self.cancelled.lock().unwrap().clone()
    }
}

impl OrderGateway for FakeGateway {
    async fn submit(&self, request: &OrderRequest) -> Result<OrderAck, HttpError> {
        let count = {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(request.clone());
            submitted.len()
        };
        if self.failing.contains(&count) {
            return Err(HttpError::ServerError {
                status: 503,
                body: "Service Unavailable".into(),
            });
        }

        let filled = request.kind() == OrderKind::Market;
        Ok(OrderAck {
            order_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            symbol: request.symbol.clone(),
            kind: request.kind(),
            side: request.side,
            status: if filled {
                OrderStatus::Filled
            } else {
                OrderStatus::New
            },
            quantity: request.quantity,
            executed_qty: if filled { request.quantity } else { Decimal::ZERO },
            avg_price: filled.then_some(self.fill_price),
            updated_at: None,
            leg_order_ids: Vec::new(),
        })
    }

    async fn cancel(&self, symbol: &Symbol, order_id: OrderId) -> Result<OrderAck, HttpError> {
        self.cancelled.lock().unwrap().push((symbol.clone(), order_id));
        Ok(OrderAck {
            order_id,
            symbol: symbol.clone(),
            kind: OrderKind::Limit,
            side: futures_trader::shared::Side::Buy,
            status: OrderStatus::Canceled,
            quantity: Decimal::ZERO,
            executed_qty: Decimal::ZERO,
            avg_price: None,
            updated_at: None,
            leg_order_ids: Vec::new(),
        })
    }
}

pub type FakeManager = OrderManager<Arc<FakeRules>, Arc<FakeGateway>>;

pub fn manager(provider: Arc<FakeRules>, gateway: Arc<FakeGateway>) -> FakeManager {
    OrderManager::new(validator(provider), gateway)
}
