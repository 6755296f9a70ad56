//! Cross-field price rules, one table for every order type and side.

use std::fmt;

use rust_decimal::Decimal;

use super::rejection::Field;
use crate::shared::{OrderKind, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    pub fn holds(&self, left: Decimal, right: Decimal) -> bool {
        match self {
            Comparison::Greater => left > right,
            Comparison::GreaterOrEqual => left >= right,
            Comparison::Less => left < right,
            Comparison::LessOrEqual => left <= right,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
        }
    }
}

/// `left <cmp> right` must hold for orders of `kind` on `side`.
#[derive(Debug, PartialEq, Eq)]
pub struct RelationalRule {
    pub kind: OrderKind,
    pub side: Side,
    pub left: Field,
    pub cmp: Comparison,
    pub right: Field,
}

impl fmt::Display for RelationalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "For {} {}, {} should be {} {}",
            self.side,
            self.kind,
            self.left.as_str().to_lowercase(),
            self.cmp.symbol(),
            self.right.as_str().to_lowercase()
        )
    }
}

/// Checked in table order; the first rule that fails is reported.
///
/// The OCO BUY rows mirror the SELL rows rather than the usual
/// buy-stop-above-market layout. Pending review; see DESIGN.md.
pub static RELATIONAL_RULES: &[RelationalRule] = &[
    RelationalRule {
        kind: OrderKind::StopLimit,
        side: Side::Buy,
        left: Field::LimitPrice,
        cmp: Comparison::GreaterOrEqual,
        right: Field::StopPrice,
    },
    RelationalRule {
        kind: OrderKind::StopLimit,
        side: Side::Sell,
        left: Field::LimitPrice,
        cmp: Comparison::LessOrEqual,
        right: Field::StopPrice,
    },
    RelationalRule {
        kind: OrderKind::Oco,
        side: Side::Sell,
        left: Field::LimitPrice,
        cmp: Comparison::Greater,
        right: Field::StopPrice,
    },
    RelationalRule {
        kind: OrderKind::Oco,
        side: Side::Sell,
        left: Field::StopLimitPrice,
        cmp: Comparison::LessOrEqual,
        right: Field::StopPrice,
    },
    RelationalRule {
        kind: OrderKind::Oco,
        side: Side::Buy,
        left: Field::LimitPrice,
        cmp: Comparison::Less,
        right: Field::StopPrice,
    },
    RelationalRule {
        kind: OrderKind::Oco,
        side: Side::Buy,
        left: Field::StopLimitPrice,
        cmp: Comparison::GreaterOrEqual,
        right: Field::StopPrice,
    },
];

/// Rules that apply to one order type and side, in table order.
pub fn rules_for(kind: OrderKind, side: Side) -> impl Iterator<Item = &'static RelationalRule> {
    RELATIONAL_RULES
        .iter()
        .filter(move |rule| rule.kind == kind && rule.side == side)
}
