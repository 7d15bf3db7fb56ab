//! `SeaORM` Entity for the credit_transactions table.
//!
//! Append-only audit ledger for customer-side money movement, kept in
//! parallel with the mutable `customers.outstanding_balance` cache. Every
//! balance-changing operation appends exactly one row here. Rows are never
//! mutated after creation except `remaining_advance` on advance rows as
//! they are consumed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BillStatus, LedgerEntryType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    /// The sale this entry relates to, when any.
    pub sale_id: Option<Uuid>,
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
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::sales::Entity",
        from = "Column::SaleId",
        to = "super::sales::Column::Id"
    )]
    Sales,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
