//! Per-symbol rules cache.
//!
//! Each symbol gets its own `OnceCell`. Concurrent first lookups of the same
//! symbol wait on one fetch; lookups of different symbols never block each
//! other beyond the brief map lock. A failed fetch leaves the cell empty, so
//! errors are never cached and the next lookup retries.

use std::collections::HashMap;
use std::sync::Arc;

use async_lock::{OnceCell, RwLock};

use super::{SymbolRules, SymbolRulesProvider};
use crate::error::MetadataError;
use crate::shared::Symbol;

type Slot = Arc<OnceCell<Arc<SymbolRules>>>;

/// Read-through cache in front of a [`SymbolRulesProvider`]. Entries live for
/// the lifetime of the cache.
pub struct SymbolCache<P> {
    provider: P,
    slots: RwLock<HashMap<Symbol, Slot>>,
}

impl<P: SymbolRulesProvider> SymbolCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Rules for `symbol`, fetching them on first use.
    pub async fn get_rules(&self, symbol: &Symbol) -> Result<Arc<SymbolRules>, MetadataError> {
        let slot = self.slot(symbol).await;
        let result = slot
            .get_or_try_init(|| async {
                tracing::debug!(symbol = %symbol, "Fetching symbol rules");
                let rules = self.provider.fetch_symbol_rules(symbol).await?;
                tracing::info!(
                    symbol = %symbol,
                    status = %rules.status,
                    step_size = %rules.step_size(),
                    tick_size = %rules.tick_size(),
                    "Cached symbol rules"
                );
                Ok::<_, MetadataError>(Arc::new(rules))
            })
            .await;
        match result {
            Ok(rules) => Ok(Arc::clone(rules)),
            Err(e) => {
                self.discard_empty(symbol, &slot).await;
                Err(e)
            }
        }
    }

    /// True when rules for `symbol` have been fetched successfully.
    pub async fn is_cached(&self, symbol: &Symbol) -> bool {
        self.slots
            .read()
            .await
            .get(symbol)
            .is_some_and(|slot| slot.is_initialized())
    }

    /// Number of symbols with cached rules.
    pub async fn len(&self) -> usize {
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.is_initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every cached entry. The next lookup refetches.
    pub async fn clear(&self) {
        self.slots.write().await.clear();
    }

    /// Forget a slot whose fetch failed, unless another caller has filled or
    /// replaced it meanwhile.
    async fn discard_empty(&self, symbol: &Symbol, slot: &Slot) {
        let mut slots = self.slots.write().await;
        let stale = slots
            .get(symbol)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.is_initialized());
        if stale {
            slots.remove(symbol);
        }
    }

    async fn slot(&self, symbol: &Symbol) -> Slot {
        if let Some(slot) = self.slots.read().await.get(symbol) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(symbol.clone()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::SymbolStatus;
    use crate::shared::Lattice;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail_first: bool,
    }

    impl SymbolRulesProvider for Counting {
        async fn fetch_symbol_rules(&self, symbol: &Symbol) -> Result<SymbolRules, MetadataError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(MetadataError::Connection("connection reset".into()));
            }
            let lattice = Lattice::new(Decimal::ONE, Decimal::ONE_HUNDRED, Decimal::ONE).unwrap();
            Ok(SymbolRules {
                symbol: symbol.clone(),
                status: SymbolStatus::Trading,
                base_asset: "BTC".into(),
                quote_asset: "USDT".into(),
                quantity: lattice,
                price: lattice,
                quantity_precision: 0,
                price_precision: 0,
            })
        }
    }

    fn counting(fail_first: bool) -> SymbolCache<Counting> {
        SymbolCache::new(Counting {
            calls: AtomicUsize::new(0),
            fail_first,
        })
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let cache = counting(false);
        let btc = Symbol::new("BTCUSDT");
        let first = cache.get_rules(&btc).await.unwrap();
        let second = cache.get_rules(&btc).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.provider().calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_cached(&btc).await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = counting(true);
        let btc = Symbol::new("BTCUSDT");
        assert!(cache.get_rules(&btc).await.is_err());
        assert!(!cache.is_cached(&btc).await);
        assert!(cache.slots.read().await.is_empty());
        assert!(cache.get_rules(&btc).await.is_ok());
        assert_eq!(cache.slots.read().await.len(), 1);
        assert_eq!(cache.provider().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let cache = counting(false);
        let btc = Symbol::new("BTCUSDT");
        cache.get_rules(&btc).await.unwrap();
        cache.clear().await;
        assert!(cache.is_empty().await);
        cache.get_rules(&btc).await.unwrap();
        assert_eq!(cache.provider().calls.load(Ordering::SeqCst), 2);
    }
}
