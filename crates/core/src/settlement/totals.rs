//! Sale totals resolution and payment standing.
//!
//! Two totals paths exist by design:
//! - **Trusted**: the caller (a pre-validated form) supplies explicit
//!   subtotal/tax/total, possibly reflecting per-item GST rates the server
//!   does not recompute. When present these win verbatim (rounded to 2dp).
//! - **Derived**: subtotal = Σ quantity × price, tax = subtotal × the flat
//!   default rate, total = subtotal + tax − discount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_shared::types::{is_settled, round2};

/// Flat fallback tax rate applied when the caller does not supply totals.
#[must_use]
pub fn default_tax_rate() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

/// One sale line as seen by the totals policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    /// Units sold.
    pub quantity: i32,
    /// Unit price for this transaction.
    pub unit_price: Decimal,
}

impl SaleLine {
    /// Line total: quantity × unit price, rounded to 2dp.
    #[must_use]
    pub fn total(&self) -> Decimal {
        round2(Decimal::from(self.quantity) * self.unit_price)
    }
}

/// Caller-supplied totals, authoritative when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedTotals {
    /// Explicit subtotal.
    pub subtotal: Decimal,
    /// Explicit tax amount.
    pub tax: Decimal,
    /// Explicit grand total.
    pub total: Decimal,
}

/// Resolved money figures for a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleTotals {
    /// Sum of line totals (or trusted subtotal).
    pub subtotal: Decimal,
    /// Tax amount.
    pub tax: Decimal,
    /// Discount applied to the grand total.
    pub discount: Decimal,
    /// Grand total: subtotal + tax − discount.
    pub total: Decimal,
}

impl SaleTotals {
    /// Resolves sale totals: trusted caller totals win; otherwise derive
    /// from the line items with the flat default tax rate.
    #[must_use]
    pub fn resolve(trusted: Option<TrustedTotals>, lines: &[SaleLine], discount: Decimal) -> Self {
        let discount = round2(discount);

        if let Some(t) = trusted {
            return Self {
                subtotal: round2(t.subtotal),
                tax: round2(t.tax),
                discount,
                total: round2(t.total),
            };
        }

        let subtotal: Decimal = lines.iter().map(SaleLine::total).sum();
        let subtotal = round2(subtotal);
        let tax = round2(subtotal * default_tax_rate());
        Self {
            subtotal,
            tax,
            discount,
            total: round2(subtotal + tax - discount),
        }
    }
}

/// Payment standing of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStanding {
    /// Nothing paid yet.
    Pending,
    /// Partially paid.
    Partial,
    /// Fully settled (due within rounding tolerance of zero).
    Completed,
}

impl PaymentStanding {
    /// The wire string for this standing.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Completed => "completed",
        }
    }
}

/// Derives `(amount_due, standing)` from a bill's total and amount paid.
///
/// Invariant: `round2(amount_paid + amount_due) == round2(total)`.
#[must_use]
pub fn standing_for(total: Decimal, amount_paid: Decimal) -> (Decimal, PaymentStanding) {
    let total = round2(total);
    let paid = round2(amount_paid);
    let due = round2(total - paid);

    let standing = if is_settled(due) {
        PaymentStanding::Completed
    } else if paid > Decimal::ZERO {
        PaymentStanding::Partial
    } else {
        PaymentStanding::Pending
    };

    (due, standing)
}
