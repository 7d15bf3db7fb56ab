//! Money rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary values are `rust_decimal::Decimal`, rounded to two
//! decimal places at every boundary.

use rust_decimal::{Decimal, RoundingStrategy};

/// Tolerance used when deciding whether an amount is fully settled.
///
/// Callers may send pre-rounded totals, so dues within a paisa of zero
/// count as paid.
pub const ROUNDING_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds a monetary amount to two decimal places (midpoint away from zero).
#[must_use]
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if an outstanding due is settled within rounding tolerance.
#[must_use]
pub fn is_settled(amount_due: Decimal) -> bool {
    amount_due <= ROUNDING_TOLERANCE
}
