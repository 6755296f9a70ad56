//! Structured rejection reasons.
//!
//! Every message names the offending field and the rule it broke, so it can
//! be shown to the user verbatim.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::rules::RelationalRule;
use crate::domain::symbol::SymbolStatus;
use crate::shared::Symbol;

/// Longest symbol the exchange lists.
pub const MAX_SYMBOL_LEN: usize = 20;

// ─── Field ───────────────────────────────────────────────────────────────────

/// An input field of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Symbol,
    Side,
    Quantity,
    Price,
    StopPrice,
    LimitPrice,
    StopLimitPrice,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Symbol => "Symbol",
            Field::Side => "Side",
            Field::Quantity => "Quantity",
            Field::Price => "Price",
            Field::StopPrice => "Stop price",
            Field::LimitPrice => "Limit price",
            Field::StopLimitPrice => "Stop-limit price",
        }
    }

    /// Name of the lattice spacing this field must respect.
    pub fn step_name(&self) -> &'static str {
        match self {
            Field::Quantity => "step size",
            _ => "tick size",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Rejection ───────────────────────────────────────────────────────────────

/// Why an order was rejected before reaching the exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Symbol cannot be empty")]
    EmptySymbol,

    #[error("Symbol '{symbol}' is invalid: expected 1-{max} letters or digits with no separators", max = MAX_SYMBOL_LEN)]
    InvalidSymbol { symbol: String },

    #[error("Symbol '{symbol}' is not tradeable (status: {status})")]
    NotTrading { symbol: Symbol, status: SymbolStatus },

    #[error("Side must be either 'BUY' or 'SELL', got '{side}'")]
    InvalidSide { side: String },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: Field, value: Decimal },

    #[error("{field} {value} is below minimum {min} for {symbol}")]
    BelowMinimum {
        field: Field,
        symbol: Symbol,
        value: Decimal,
        min: Decimal,
    },

    #[error("{field} {value} exceeds maximum {max} for {symbol}")]
    AboveMaximum {
        field: Field,
        symbol: Symbol,
        value: Decimal,
        max: Decimal,
    },

    #[error(
        "{field} {value} does not match {} {step} for {symbol}: must be {min} plus a whole multiple of {step}",
        .field.step_name()
    )]
    OffStep {
        field: Field,
        symbol: Symbol,
        value: Decimal,
        min: Decimal,
        step: Decimal,
    },

    #[error("{rule}: got {left_value} vs {right_value}")]
    Relational {
        rule: &'static RelationalRule,
        left_value: Decimal,
        right_value: Decimal,
    },
}

impl Rejection {
    /// The field the rejection is about. Relational rejections report the
    /// left-hand field of the broken rule.
    pub fn field(&self) -> Field {
        match self {
            Rejection::EmptySymbol
            | Rejection::InvalidSymbol { .. }
            | Rejection::NotTrading { .. } => Field::Symbol,
            Rejection::InvalidSide { .. } => Field::Side,
            Rejection::NotPositive { field, .. }
            | Rejection::BelowMinimum { field, .. }
            | Rejection::AboveMaximum { field, .. }
            | Rejection::OffStep { field, .. } => *field,
            Rejection::Relational { rule, .. } => rule.left,
        }
    }
}
