//! Settlement policies for money-moving operations.
//!
//! This module implements the rules shared by sales, purchases, receipts,
//! and payments:
//! - Totals resolution (trusted caller totals vs. derived from line items)
//! - Payment standing derivation (pending / partial / completed)
//! - The closed set of settlement methods
//! - Deterministic oldest-first allocation of funds against open bills

pub mod allocation;
pub mod method;
pub mod totals;

pub use allocation::{allocate_oldest_first, cap_against_bill, BillApplication, OpenBill};
pub use method::{MethodParseError, SettlementMethod};
pub use totals::{
    default_tax_rate, standing_for, PaymentStanding, SaleLine, SaleTotals, TrustedTotals,
};
