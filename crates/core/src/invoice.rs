//! Invoice number sequencing.
//!
//! Invoice numbers are formatted `prefix + zero-padded(sequence, 3) + "/" +
//! fiscal_year`, e.g. `INV001/2026-27`. The sequence state lives in the
//! settings store and is advanced in the same database transaction as the
//! sale it numbers, so a rollback also returns the number.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Invoice sequence configuration, persisted as JSON in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceConfig {
    /// Invoice number prefix.
    pub prefix: String,
    /// Next sequence number to issue.
    pub sequence: i64,
    /// Fiscal year label, e.g. `2026-27`.
    pub fiscal_year: String,
}

impl InvoiceConfig {
    /// Formats the invoice number this config would issue next.
    #[must_use]
    pub fn format_invoice_number(&self) -> String {
        format!("{}{:03}/{}", self.prefix, self.sequence, self.fiscal_year)
    }

    /// The config after issuing one number.
    #[must_use]
    pub fn advanced(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            sequence: self.sequence + 1,
            fiscal_year: self.fiscal_year.clone(),
        }
    }
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            prefix: "INV".to_string(),
            sequence: 1,
            fiscal_year: fiscal_year_for(Utc::now().date_naive()),
        }
    }
}

/// Fiscal year label for a date. Fiscal years run April through March.
#[must_use]
pub fn fiscal_year_for(date: NaiveDate) -> String {
    let start_year = if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{}-{:02}", start_year, (start_year + 1) % 100)
}
