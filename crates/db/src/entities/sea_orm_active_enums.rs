//! Active enums shared by the ledger entities.
//!
//! Backed by short string columns so the same schema runs on Postgres and
//! SQLite.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use khata_core::settlement::PaymentStanding;

/// Payment standing of a bill (a sale or a supplier bill ledger row).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Nothing paid yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Partially paid.
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Fully settled.
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl From<PaymentStanding> for BillStatus {
    fn from(standing: PaymentStanding) -> Self {
        match standing {
            PaymentStanding::Pending => Self::Pending,
            PaymentStanding::Partial => Self::Partial,
            PaymentStanding::Completed => Self::Completed,
        }
    }
}

impl BillStatus {
    /// The wire string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Completed => "completed",
        }
    }
}

/// Kind of audit ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryType {
    /// Amount extended on credit by a sale.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Funds received from / paid to a party.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// A settleable bill (supplier purchase invoice).
    #[sea_orm(string_value = "bill")]
    Bill,
}

impl LedgerEntryType {
    /// The wire string for this entry type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Payment => "payment",
            Self::Bill => "bill",
        }
    }
}
