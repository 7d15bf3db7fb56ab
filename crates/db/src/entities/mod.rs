//! `SeaORM` entity definitions for the ledger store.

pub mod credit_transactions;
pub mod customers;
pub mod products;
pub mod purchases;
pub mod sale_items;
pub mod sales;
pub mod sea_orm_active_enums;
pub mod settings;
pub mod supplier_transactions;
pub mod suppliers;
