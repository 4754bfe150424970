//! Minor-unit and basis-point arithmetic.
//!
//! Every monetary value is an integer count of currency subunits. Rates are
//! integer basis points (10000 bp = 100%). All scaling floors, and all
//! intermediate products are computed in `u128` so nothing silently wraps.

use crate::error::{DomainError, DomainResult};

/// Basis points in 100%.
pub const BP_SCALE: u64 = 10_000;

/// `floor(amount * bp / 10000)`.
pub fn apply_bp(amount: u64, bp: u32) -> DomainResult<u64> {
    let scaled = u128::from(amount) * u128::from(bp) / u128::from(BP_SCALE);
    u64::try_from(scaled).map_err(|_| DomainError::invariant("basis point product overflow"))
}

/// `a * b` in minor units, failing on overflow.
pub fn checked_mul(a: u64, b: u64, what: &str) -> DomainResult<u64> {
    a.checked_mul(b)
        .ok_or_else(|| DomainError::invariant(format!("{what} overflow")))
}

/// `a + b` in minor units, failing on overflow.
pub fn checked_add(a: u64, b: u64, what: &str) -> DomainResult<u64> {
    a.checked_add(b)
        .ok_or_else(|| DomainError::invariant(format!("{what} overflow")))
}

/// Share of a line's cost attributed to one partial payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proration {
    pub amount: u64,
    /// The payment exceeded the line total and the ratio saturated at 1.
    pub saturated: bool,
}

/// `round(cost * clamp(paid / total, 0, 1))`, rounding half up.
///
/// A zero `total` attributes nothing: there is no share to compute and any
/// other answer would let repeated rows attribute the cost more than once.
pub fn prorate(cost: u64, paid: u64, total: u64) -> Proration {
    if total == 0 {
        return Proration {
            amount: 0,
            saturated: paid > 0,
        };
    }
    if paid >= total {
        return Proration {
            amount: cost,
            saturated: paid > total,
        };
    }

    let product = u128::from(cost) * u128::from(paid);
    let total = u128::from(total);
    let (quotient, remainder) = (product / total, product % total);
    let rounded = if 2 * remainder >= total { quotient + 1 } else { quotient };
    // paid < total, so the rounded share is at most `cost`.
    let amount = u64::try_from(rounded).unwrap_or(cost);
    Proration {
        amount,
        saturated: false,
    }
}
