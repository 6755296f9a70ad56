//! Order validation engine.
//!
//! Decides whether an order may be submitted, before any order-placement call
//! is made. Checks run in a fixed order and stop at the first failure:
//!
//! 1. symbol syntax, rules lookup, `TRADING` status
//! 2. side
//! 3. quantity against the quantity lattice
//! 4. each price field against the price lattice
//! 5. cross-field rules from [`rules::RELATIONAL_RULES`]
//!
//! Bad input is never an error: it comes back as
//! [`ValidationOutcome::Rejected`]. Only metadata lookup failures are `Err`,
//! because then the engine could not decide at all.

pub mod rejection;
pub mod rules;

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::order::{OrderPrices, OrderRequest};
use crate::domain::symbol::{SymbolCache, SymbolRules, SymbolRulesProvider};
use crate::error::MetadataError;
use crate::shared::{Lattice, LatticeViolation, Side, Symbol};

pub use rejection::{Field, Rejection, MAX_SYMBOL_LEN};
pub use rules::{Comparison, RelationalRule, RELATIONAL_RULES};

// ─── Inputs and outcomes ─────────────────────────────────────────────────────

/// Raw, unvalidated order input. Symbol and side are free text as typed by
/// the user; the variant of `prices` selects the order type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub symbol: String,
    pub side: String,
    pub quantity: Decimal,
    pub prices: OrderPrices,
}

impl OrderDraft {
    pub fn new(
        symbol: impl Into<String>,
        side: impl Into<String>,
        quantity: Decimal,
        prices: OrderPrices,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side: side.into(),
            quantity,
            prices,
        }
    }
}

/// Result of validating one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted(OrderRequest),
    Rejected(Rejection),
}

impl ValidationOutcome {
    pub fn ok(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }

    /// Empty when accepted; otherwise the rejection message.
    pub fn message(&self) -> String {
        match self {
            ValidationOutcome::Accepted(_) => String::new(),
            ValidationOutcome::Rejected(rejection) => rejection.to_string(),
        }
    }

    pub fn into_result(self) -> Result<OrderRequest, Rejection> {
        match self {
            ValidationOutcome::Accepted(request) => Ok(request),
            ValidationOutcome::Rejected(rejection) => Err(rejection),
        }
    }
}

impl From<Result<OrderRequest, Rejection>> for ValidationOutcome {
    fn from(result: Result<OrderRequest, Rejection>) -> Self {
        match result {
            Ok(request) => ValidationOutcome::Accepted(request),
            Err(rejection) => ValidationOutcome::Rejected(rejection),
        }
    }
}

// ─── Validator ───────────────────────────────────────────────────────────────

/// The validation engine. Holds a handle to a shared [`SymbolCache`]; the
/// only side effect of validating is a cache fill on first use of a symbol.
pub struct Validator<P> {
    cache: Arc<SymbolCache<P>>,
}

impl<P> Clone for Validator<P> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<P: SymbolRulesProvider> Validator<P> {
    pub fn new(cache: Arc<SymbolCache<P>>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<SymbolCache<P>> {
        &self.cache
    }

    pub async fn validate_market_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
    ) -> Result<ValidationOutcome, MetadataError> {
        self.validate(&OrderDraft::new(symbol, side, quantity, OrderPrices::Market))
            .await
    }

    pub async fn validate_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<ValidationOutcome, MetadataError> {
        self.validate(&OrderDraft::new(
            symbol,
            side,
            quantity,
            OrderPrices::Limit { price },
        ))
        .await
    }

    pub async fn validate_stop_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
    ) -> Result<ValidationOutcome, MetadataError> {
        self.validate(&OrderDraft::new(
            symbol,
            side,
            quantity,
            OrderPrices::StopLimit {
                stop_price,
                limit_price,
            },
        ))
        .await
    }

    pub async fn validate_oco_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: Decimal,
        limit_price: Decimal,
        stop_price: Decimal,
        stop_limit_price: Decimal,
    ) -> Result<ValidationOutcome, MetadataError> {
        self.validate(&OrderDraft::new(
            symbol,
            side,
            quantity,
            OrderPrices::Oco {
                limit_price,
                stop_price,
                stop_limit_price,
            },
        ))
        .await
    }

    /// Validate any order type.
    pub async fn validate(&self, draft: &OrderDraft) -> Result<ValidationOutcome, MetadataError> {
        let symbol = match check_symbol_syntax(&draft.symbol) {
            Ok(symbol) => symbol,
            Err(rejection) => return Ok(self.rejected(draft, rejection)),
        };

        let rules = self.cache.get_rules(&symbol).await?;

        Ok(match check_against_rules(&rules, draft) {
            Ok(request) => {
                tracing::debug!(order = %request, "Order passed validation");
                ValidationOutcome::Accepted(request)
            }
            Err(rejection) => self.rejected(draft, rejection),
        })
    }

    fn rejected(&self, draft: &OrderDraft, rejection: Rejection) -> ValidationOutcome {
        tracing::warn!(
            symbol = %draft.symbol,
            side = %draft.side,
            kind = %draft.prices.kind(),
            field = %rejection.field(),
            reason = %rejection,
            "Order failed validation"
        );
        ValidationOutcome::Rejected(rejection)
    }
}

// ─── Pure checks ─────────────────────────────────────────────────────────────

/// Non-empty, ASCII letters and digits only, at most [`MAX_SYMBOL_LEN`].
pub fn check_symbol_syntax(raw: &str) -> Result<Symbol, Rejection> {
    if raw.is_empty() {
        return Err(Rejection::EmptySymbol);
    }
    if raw.len() > MAX_SYMBOL_LEN || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Rejection::InvalidSymbol {
            symbol: raw.to_string(),
        });
    }
    Ok(Symbol::new(raw))
}

/// Every check after the rules lookup. Pure: same rules and draft, same
/// answer.
pub fn check_against_rules(
    rules: &SymbolRules,
    draft: &OrderDraft,
) -> Result<OrderRequest, Rejection> {
    if !rules.status.is_trading() {
        return Err(Rejection::NotTrading {
            symbol: rules.symbol.clone(),
            status: rules.status.clone(),
        });
    }

    let side = Side::parse(&draft.side).ok_or_else(|| Rejection::InvalidSide {
        side: draft.side.clone(),
    })?;

    check_lattice(
        &rules.quantity,
        &rules.symbol,
        Field::Quantity,
        draft.quantity,
    )?;

    let prices = price_fields(&draft.prices);
    for (field, value) in &prices {
        check_lattice(&rules.price, &rules.symbol, *field, *value)?;
    }

    for rule in rules::rules_for(draft.prices.kind(), side) {
        let (Some(left), Some(right)) = (
            lookup(&prices, rule.left),
            lookup(&prices, rule.right),
        ) else {
            continue;
        };
        if !rule.cmp.holds(left, right) {
            return Err(Rejection::Relational {
                rule,
                left_value: left,
                right_value: right,
            });
        }
    }

    // Accepted values may sit up to epsilon off the lattice; send the exact
    // lattice point so the exchange sees no excess decimals.
    Ok(OrderRequest {
        symbol: rules.symbol.clone(),
        side,
        quantity: snap(&rules.quantity, draft.quantity),
        prices: snap_prices(&rules.price, draft.prices),
    })
}

fn snap(lattice: &Lattice, value: Decimal) -> Decimal {
    lattice.snap(value).unwrap_or(value)
}

fn snap_prices(lattice: &Lattice, prices: OrderPrices) -> OrderPrices {
    match prices {
        OrderPrices::Market => OrderPrices::Market,
        OrderPrices::Limit { price } => OrderPrices::Limit {
            price: snap(lattice, price),
        },
        OrderPrices::StopLimit {
            stop_price,
            limit_price,
        } => OrderPrices::StopLimit {
            stop_price: snap(lattice, stop_price),
            limit_price: snap(lattice, limit_price),
        },
        OrderPrices::Oco {
            limit_price,
            stop_price,
            stop_limit_price,
        } => OrderPrices::Oco {
            limit_price: snap(lattice, limit_price),
            stop_price: snap(lattice, stop_price),
            stop_limit_price: snap(lattice, stop_limit_price),
        },
    }
}

/// The price fields an order type carries, in declaration order.
pub fn price_fields(prices: &OrderPrices) -> Vec<(Field, Decimal)> {
    match *prices {
        OrderPrices::Market => Vec::new(),
        OrderPrices::Limit { price } => vec![(Field::Price, price)],
        OrderPrices::StopLimit {
            stop_price,
            limit_price,
        } => vec![
            (Field::StopPrice, stop_price),
            (Field::LimitPrice, limit_price),
        ],
        OrderPrices::Oco {
            limit_price,
            stop_price,
            stop_limit_price,
        } => vec![
            (Field::LimitPrice, limit_price),
            (Field::StopPrice, stop_price),
            (Field::StopLimitPrice, stop_limit_price),
        ],
    }
}

fn lookup(fields: &[(Field, Decimal)], field: Field) -> Option<Decimal> {
    fields
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, value)| *value)
}

fn check_lattice(
    lattice: &Lattice,
    symbol: &Symbol,
    field: Field,
    value: Decimal,
) -> Result<(), Rejection> {
    lattice.check(value).map_err(|violation| match violation {
        LatticeViolation::NonPositive => Rejection::NotPositive { field, value },
        LatticeViolation::BelowMin => Rejection::BelowMinimum {
            field,
            symbol: symbol.clone(),
            value,
            min: lattice.min,
        },
        LatticeViolation::AboveMax => Rejection::AboveMaximum {
            field,
            symbol: symbol.clone(),
            value,
            max: lattice.max,
        },
        LatticeViolation::OffStep => Rejection::OffStep {
            field,
            symbol: symbol.clone(),
            value,
            min: lattice.min,
            step: lattice.step,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::symbol::SymbolStatus;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn btc_rules() -> SymbolRules {
        SymbolRules {
            symbol: Symbol::new("BTCUSDT"),
            status: SymbolStatus::Trading,
            base_asset: "BTC".into(),
            quote_asset: "USDT".into(),
            quantity: Lattice::new(dec("0.001"), dec("1000"), dec("0.001")).unwrap(),
            price: Lattice::new(dec("556.80"), dec("4529764"), dec("0.10")).unwrap(),
            quantity_precision: 3,
            price_precision: 1,
        }
    }

    fn draft(side: &str, quantity: &str, prices: OrderPrices) -> OrderDraft {
        OrderDraft::new("BTCUSDT", side, dec(quantity), prices)
    }

    #[test]
    fn test_symbol_syntax() {
        assert_eq!(check_symbol_syntax(""), Err(Rejection::EmptySymbol));
        assert!(matches!(
            check_symbol_syntax("BTC-USDT"),
            Err(Rejection::InvalidSymbol { .. })
        ));
        assert!(matches!(
            check_symbol_syntax("BTC USDT"),
            Err(Rejection::InvalidSymbol { .. })
        ));
        assert!(matches!(
            check_symbol_syntax("ABCDEFGHIJKLMNOPQRSTU"),
            Err(Rejection::InvalidSymbol { .. })
        ));
        assert_eq!(check_symbol_syntax("btcusdt").unwrap().as_str(), "BTCUSDT");
    }

    #[test]
    fn test_market_order_accepted_with_canonical_side() {
        let request = check_against_rules(&btc_rules(), &draft("buy", "0.01", OrderPrices::Market))
            .unwrap();
        assert_eq!(request.side, Side::Buy);
        assert_eq!(request.symbol.as_str(), "BTCUSDT");
    }

    #[test]
    fn test_invalid_side() {
        let err = check_against_rules(&btc_rules(), &draft("LONG", "0.01", OrderPrices::Market))
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::InvalidSide {
                side: "LONG".into()
            }
        );
        assert_eq!(err.to_string(), "Side must be either 'BUY' or 'SELL', got 'LONG'");
    }

    #[test]
    fn test_not_trading_wins_over_everything() {
        let mut rules = btc_rules();
        rules.status = SymbolStatus::Break;
        let err = check_against_rules(&rules, &draft("LONG", "-1", OrderPrices::Market))
            .unwrap_err();
        assert!(matches!(err, Rejection::NotTrading { .. }));
        assert_eq!(
            err.to_string(),
            "Symbol 'BTCUSDT' is not tradeable (status: BREAK)"
        );
    }

    #[test]
    fn test_side_checked_before_quantity() {
        let err = check_against_rules(&btc_rules(), &draft("HOLD", "0", OrderPrices::Market))
            .unwrap_err();
        assert_eq!(err.field(), Field::Side);
    }

    #[test]
    fn test_quantity_messages() {
        let rules = btc_rules();
        let below = check_against_rules(&rules, &draft("BUY", "0.0005", OrderPrices::Market))
            .unwrap_err();
        assert_eq!(
            below.to_string(),
            "Quantity 0.0005 is below minimum 0.001 for BTCUSDT"
        );

        let off = check_against_rules(&rules, &draft("BUY", "0.0105", OrderPrices::Market))
            .unwrap_err();
        assert_eq!(
            off.to_string(),
            "Quantity 0.0105 does not match step size 0.001 for BTCUSDT: must be 0.001 plus a whole multiple of 0.001"
        );

        let zero = check_against_rules(&rules, &draft("BUY", "0", OrderPrices::Market))
            .unwrap_err();
        assert_eq!(zero.to_string(), "Quantity must be greater than zero, got 0");
    }

    #[test]
    fn test_price_fields_checked_in_declaration_order() {
        // Both prices are off the tick; the stop price is reported first.
        let err = check_against_rules(
            &btc_rules(),
            &draft(
                "BUY",
                "0.01",
                OrderPrices::StopLimit {
                    stop_price: dec("49500.05"),
                    limit_price: dec("49600.05"),
                },
            ),
        )
        .unwrap_err();
        assert_eq!(err.field(), Field::StopPrice);
        assert!(err.to_string().contains("tick size 0.10"));
    }

    #[test]
    fn test_price_checks_precede_relational_checks() {
        let err = check_against_rules(
            &btc_rules(),
            &draft(
                "BUY",
                "0.01",
                OrderPrices::StopLimit {
                    stop_price: dec("49500"),
                    limit_price: dec("100"),
                },
            ),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Rejection::BelowMinimum {
                field: Field::LimitPrice,
                ..
            }
        ));
    }

    #[test]
    fn test_stop_limit_relational_message() {
        let err = check_against_rules(
            &btc_rules(),
            &draft(
                "SELL",
                "0.01",
                OrderPrices::StopLimit {
                    stop_price: dec("43000"),
                    limit_price: dec("43100"),
                },
            ),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "For SELL stop-limit, limit price should be <= stop price: got 43100 vs 43000"
        );
    }

    #[test]
    fn test_oco_buy_rule_as_specified() {
        let rules = btc_rules();
        let oco = |limit: &str, stop: &str, stop_limit: &str| {
            check_against_rules(
                &rules,
                &draft(
                    "BUY",
                    "0.01",
                    OrderPrices::Oco {
                        limit_price: dec(limit),
                        stop_price: dec(stop),
                        stop_limit_price: dec(stop_limit),
                    },
                ),
            )
        };
        assert!(oco("42000", "43000", "43100").is_ok());
        assert!(oco("42000", "43000", "43000").is_ok());
        let err = oco("44000", "43000", "43100").unwrap_err();
        assert_eq!(err.field(), Field::LimitPrice);
        let err = oco("42000", "43000", "42900").unwrap_err();
        assert_eq!(err.field(), Field::StopLimitPrice);
    }

    #[test]
    fn test_outcome_accessors() {
        let accepted: ValidationOutcome =
            check_against_rules(&btc_rules(), &draft("SELL", "1", OrderPrices::Market)).into();
        assert!(accepted.ok());
        assert_eq!(accepted.message(), "");

        let rejected: ValidationOutcome =
            check_against_rules(&btc_rules(), &draft("UP", "1", OrderPrices::Market)).into();
        assert!(!rejected.ok());
        assert!(rejected.message().contains("'UP'"));
        assert!(rejected.into_result().is_err());
    }

    #[test]
    fn test_accepted_values_are_snapped_to_lattice() {
        let request = check_against_rules(
            &btc_rules(),
            &draft(
                "BUY",
                "0.0100000000001",
                OrderPrices::StopLimit {
                    stop_price: dec("49499.9999999999999"),
                    limit_price: dec("49600.0000000000001"),
                },
            ),
        )
        .unwrap();
        assert_eq!(request.quantity.to_string(), "0.01");
        match request.prices {
            OrderPrices::StopLimit {
                stop_price,
                limit_price,
            } => {
                assert_eq!(stop_price.to_string(), "49500");
                assert_eq!(limit_price.to_string(), "49600");
            }
            other => panic!("unexpected prices {:?}", other),
        }
    }
}

