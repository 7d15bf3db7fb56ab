//! `SeaORM` Entity for the supplier_transactions table.
//!
//! Append-only audit ledger for supplier-side money movement. `bill`-type
//! rows are the settleable supplier bills (one per purchase invoice) and
//! are the only rows whose `amount_paid`/`amount_due`/`status` mutate as
//! payments are allocated; advance rows mutate `remaining_advance` as
//! they are consumed against future bills.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BillStatus, LedgerEntryType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "supplier_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supplier_id: Uuid,
    /// The purchase bill this entry relates to, when any.
    pub purchase_invoice: Option<String>,
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub status: BillStatus,
    /// Settlement method wire string for payment rows.
    pub method: Option<String>,
    pub is_advance: bool,
    pub remaining_advance: Decimal,
    pub entry_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Suppliers,
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suppliers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
