//! The closed set of settlement methods.
//!
//! Vouchers arrive with a `method` wire string and an optional bill
//! reference. These are parsed once, at the boundary, into a tagged enum so
//! the engine can branch exhaustively instead of comparing strings.

use thiserror::Error;
use uuid::Uuid;

/// How a payment or receipt is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementMethod {
    /// Standalone ledger entry with no bill linkage (informational only).
    NewRef,
    /// Applied to one specific bill, capped at that bill's remaining due.
    AgainstBill(Uuid),
    /// Held as an unused advance for later adjustment against a future bill.
    Advance,
    /// Swept across the party's open bills oldest-first.
    OnAccount,
}

/// Error parsing a settlement method from its wire form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MethodParseError {
    /// The method string is not one of the known methods.
    #[error("Unknown settlement method: {0}")]
    Unknown(String),

    /// "Agst Ref" requires a referenced bill ID.
    #[error("Method 'Agst Ref' requires a reference_id")]
    MissingReference,
}

impl SettlementMethod {
    /// Parses the wire form: a method string plus an optional bill reference.
    pub fn parse(method: &str, reference_id: Option<Uuid>) -> Result<Self, MethodParseError> {
        match method {
            "New Ref" => Ok(Self::NewRef),
            "Agst Ref" => reference_id
                .map(Self::AgainstBill)
                .ok_or(MethodParseError::MissingReference),
            "Advance" => Ok(Self::Advance),
            "On Account" => Ok(Self::OnAccount),
            other => Err(MethodParseError::Unknown(other.to_string())),
        }
    }

    /// The wire/ledger string for this method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewRef => "New Ref",
            Self::AgainstBill(_) => "Agst Ref",
            Self::Advance => "Advance",
            Self::OnAccount => "On Account",
        }
    }

    /// True if this method records an unused advance.
    #[must_use]
    pub const fn is_advance(&self) -> bool {
        matches!(self, Self::Advance)
    }
}
