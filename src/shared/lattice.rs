//! Decimal lattice math for exchange step/tick rules.
//!
//! A lattice is the set `min + k * step` for integer `k >= 0`, bounded above by
//! `max`. Quantities and prices are legal only when they sit on their lattice.
//! All math uses `rust_decimal::Decimal`; no binary floating point.
//! No async, no network calls.

use std::fmt;

use rust_decimal::Decimal;

/// Fixed alignment tolerance (`1e-12`), further capped at half a step.
pub const ALIGNMENT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 12);

/// A `min + k * step` lattice bounded by `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lattice {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// The lattice parameters themselves are inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatticeError {
    NonPositiveStep(Decimal),
    NegativeMin(Decimal),
    MinAboveMax { min: Decimal, max: Decimal },
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeError::NonPositiveStep(step) => {
                write!(f, "step must be positive, got {}", step)
            }
            LatticeError::NegativeMin(min) => write!(f, "minimum must not be negative, got {}", min),
            LatticeError::MinAboveMax { min, max } => {
                write!(f, "minimum {} is above maximum {}", min, max)
            }
        }
    }
}

impl std::error::Error for LatticeError {}

/// Why a value is not a legal lattice point. Checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeViolation {
    NonPositive,
    BelowMin,
    AboveMax,
    OffStep,
}

impl Lattice {
    pub fn new(min: Decimal, max: Decimal, step: Decimal) -> Result<Self, LatticeError> {
        if step <= Decimal::ZERO {
            return Err(LatticeError::NonPositiveStep(step));
        }
        if min < Decimal::ZERO {
            return Err(LatticeError::NegativeMin(min));
        }
        if min > max {
            return Err(LatticeError::MinAboveMax { min, max });
        }
        Ok(Self { min, max, step })
    }

    /// Tolerance used by the multiple-of-step test.
    pub fn epsilon(&self) -> Decimal {
        ALIGNMENT_EPSILON.min(self.step / Decimal::TWO)
    }

    /// Decimal places implied by the step (`0.001` → 3, `0.10` → 1, `5` → 0).
    pub fn precision(&self) -> u32 {
        self.step.normalize().scale()
    }

    /// Full check: positive, within bounds, and on the step lattice.
    pub fn check(&self, value: Decimal) -> Result<(), LatticeViolation> {
        if value <= Decimal::ZERO {
            return Err(LatticeViolation::NonPositive);
        }
        if value < self.min {
            return Err(LatticeViolation::BelowMin);
        }
        if value > self.max {
            return Err(LatticeViolation::AboveMax);
        }
        if !self.is_aligned(value) {
            return Err(LatticeViolation::OffStep);
        }
        Ok(())
    }

    /// True when `value - min` is an integer multiple of `step` within epsilon.
    pub fn is_aligned(&self, value: Decimal) -> bool {
        let offset = value - self.min;
        let Some(steps) = offset.checked_div(self.step) else {
            return false;
        };
        let Some(snapped) = steps.round().checked_mul(self.step) else {
            return false;
        };
        (offset - snapped).abs() <= self.epsilon()
    }

    /// Largest lattice point `<= value`, or `None` when `value < min`.
    ///
    /// The result is not clamped to `max`.
    pub fn floor(&self, value: Decimal) -> Option<Decimal> {
        if value < self.min {
            return None;
        }
        let steps = (value - self.min).checked_div(self.step)?;
        // Tolerate values a hair below a lattice point.
        let nearest = steps.round();
        let whole = if (steps - nearest).abs() * self.step <= self.epsilon() {
            nearest
        } else {
            steps.floor()
        };
        let point = self.min.checked_add(whole.checked_mul(self.step)?)?;
        Some(point.normalize())
    }

    /// Nearest point of `min + k * step` to `value`, with `k` allowed to go
    /// negative. Bounds are not applied: a value outside `[min, max]` snaps
    /// to a point that is still outside.
    pub fn snap(&self, value: Decimal) -> Option<Decimal> {
        let steps = (value - self.min).checked_div(self.step)?.round();
        let point = self.min.checked_add(steps.checked_mul(self.step)?)?;
        Some(point.normalize())
    }
}
