//! Repository modules for database operations.
//!
//! Each repository owns one aggregate and keeps its balance cache, audit
//! ledger rows, and side effects consistent within a single database
//! transaction.

pub mod party;
pub mod purchase;
pub mod sale;
pub mod settings;
pub mod voucher;

pub use party::{
    CreateCustomerInput, CreateSupplierInput, CustomerRepository, PartyError, SupplierRepository,
};
pub use purchase::{
    AdvanceAdjustment, CreatePurchaseInput, CreatedPurchase, PurchaseError, PurchaseItemInput,
    PurchaseRepository,
};
pub use sale::{CreateSaleInput, CreatedSale, SaleError, SaleItemInput, SaleRepository};
pub use settings::{issue_invoice_number, SettingsError, SettingsRepository, INVOICE_CONFIG_KEY};
pub use voucher::{VoucherError, VoucherInput, VoucherOutcome, VoucherRepository};
