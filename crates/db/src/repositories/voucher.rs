//! Voucher repository: receipts from customers, payments to suppliers.
//!
//! Every voucher decrements the party's outstanding balance by the full
//! amount and appends exactly one payment audit row; the settlement method
//! decides which bills, if any, it settles:
//!
//! - `New Ref`: no bill linkage.
//! - `Agst Ref`: one referenced bill, capped at that bill's remaining due.
//! - `Advance`: held with `remaining_advance` for later adjustment.
//! - `On Account`: swept across the party's open bills oldest-first.
//!
//! Customer bills are sale rows; supplier bills are `bill`-type rows in the
//! supplier ledger. Both sides share the allocation logic from `khata-core`.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use khata_core::settlement::{
    allocate_oldest_first, cap_against_bill, standing_for, BillApplication, OpenBill,
    SettlementMethod,
};
use khata_shared::types::round2;

use crate::entities::{
    credit_transactions, customers, sales, supplier_transactions, suppliers,
    sea_orm_active_enums::{BillStatus, LedgerEntryType},
};
use crate::repositories::purchase::open_supplier_bills;

/// Error types for voucher operations.
#[derive(Debug, thiserror::Error)]
pub enum VoucherError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Supplier not found.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(Uuid),

    /// Referenced bill not found for this party.
    #[error("Bill not found: {0}")]
    BillNotFound(Uuid),

    /// Voucher amounts must be positive.
    #[error("Voucher amount must be positive")]
    NonPositiveAmount,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording a receipt or payment.
#[derive(Debug, Clone)]
pub struct VoucherInput {
    /// The customer (receipts) or supplier (payments).
    pub party_id: Uuid,
    /// Funds received or paid.
    pub amount: Decimal,
    /// How the funds are applied.
    pub method: SettlementMethod,
    /// Voucher date recorded on the ledger row.
    pub entry_date: NaiveDate,
}

/// Outcome of a voucher: the audit row, the balance after, and the bills
/// it settled (empty for `New Ref` and `Advance`).
#[derive(Debug, Clone)]
pub struct VoucherOutcome {
    /// ID of the appended payment audit row.
    pub entry_id: Uuid,
    /// Party's outstanding balance after the voucher.
    pub new_balance: Decimal,
    /// Per-bill applications, in allocation order.
    pub applications: Vec<BillApplication>,
}

/// Voucher repository.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a receipt from a customer.
    ///
    /// Decrements the customer's outstanding balance by the full amount,
    /// settles sales according to the method, and appends one payment row
    /// to the customer ledger, all in one database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is non-positive, the customer or a
    /// referenced sale does not exist, or a database operation fails.
    pub async fn record_receipt(&self, input: VoucherInput) -> Result<VoucherOutcome, VoucherError> {
        let amount = round2(input.amount);
        if amount <= Decimal::ZERO {
            return Err(VoucherError::NonPositiveAmount);
        }

        let txn = self.db.begin().await?;

        customers::Entity::find_by_id(input.party_id)
            .one(&txn)
            .await?
            .ok_or(VoucherError::CustomerNotFound(input.party_id))?;

        let applications = match input.method {
            SettlementMethod::NewRef | SettlementMethod::Advance => Vec::new(),
            SettlementMethod::AgainstBill(sale_id) => {
                let sale = sales::Entity::find_by_id(sale_id)
                    .filter(sales::Column::CustomerId.eq(input.party_id))
                    .one(&txn)
                    .await?
                    .ok_or(VoucherError::BillNotFound(sale_id))?;

                let applied = cap_against_bill(amount, sale.amount_due);
                vec![apply_to_sale(&txn, sale, applied).await?]
            }
            SettlementMethod::OnAccount => {
                let open: Vec<OpenBill> = open_sales(&txn, input.party_id)
                    .await?
                    .into_iter()
                    .map(|s| OpenBill {
                        id: s.id,
                        amount_due: s.amount_due,
                    })
                    .collect();

                let mut applied = Vec::with_capacity(open.len());
                for application in allocate_oldest_first(amount, &open) {
                    let sale = sales::Entity::find_by_id(application.bill_id)
                        .one(&txn)
                        .await?
                        .ok_or(VoucherError::BillNotFound(application.bill_id))?;
                    applied.push(apply_to_sale(&txn, sale, application.applied).await?);
                }
                applied
            }
        };

        let now_tz: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        customers::Entity::update_many()
            .col_expr(
                customers::Column::OutstandingBalance,
                Expr::col(customers::Column::OutstandingBalance).sub(amount),
            )
            .col_expr(customers::Column::UpdatedAt, Expr::value(now_tz))
            .filter(customers::Column::Id.eq(input.party_id))
            .exec(&txn)
            .await?;

        let entry = credit_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(input.party_id),
            sale_id: Set(match input.method {
                SettlementMethod::AgainstBill(sale_id) => Some(sale_id),
                _ => None,
            }),
            entry_type: Set(LedgerEntryType::Payment),
            amount: Set(amount),
            amount_paid: Set(amount),
            amount_due: Set(Decimal::ZERO),
            status: Set(BillStatus::Completed),
            method: Set(Some(input.method.as_str().to_string())),
            is_advance: Set(input.method.is_advance()),
            remaining_advance: Set(if input.method.is_advance() {
                amount
            } else {
                Decimal::ZERO
            }),
            entry_date: Set(input.entry_date),
            created_at: Set(now_tz),
        };
        let entry = entry.insert(&txn).await?;

        let customer = customers::Entity::find_by_id(input.party_id)
            .one(&txn)
            .await?
            .ok_or(VoucherError::CustomerNotFound(input.party_id))?;

        txn.commit().await?;

        Ok(VoucherOutcome {
            entry_id: entry.id,
            new_balance: customer.outstanding_balance,
            applications,
        })
    }

    /// Records a payment to a supplier.
    ///
    /// Mirror of [`Self::record_receipt`] on the supplier side: the balance
    /// drops by the full amount, `bill`-type ledger rows are settled per the
    /// method, and one payment row is appended to the supplier ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is non-positive, the supplier or a
    /// referenced bill does not exist, or a database operation fails.
    pub async fn record_payment(&self, input: VoucherInput) -> Result<VoucherOutcome, VoucherError> {
        let amount = round2(input.amount);
        if amount <= Decimal::ZERO {
            return Err(VoucherError::NonPositiveAmount);
        }

        let txn = self.db.begin().await?;

        suppliers::Entity::find_by_id(input.party_id)
            .one(&txn)
            .await?
            .ok_or(VoucherError::SupplierNotFound(input.party_id))?;

        let applications = match input.method {
            SettlementMethod::NewRef | SettlementMethod::Advance => Vec::new(),
            SettlementMethod::AgainstBill(bill_id) => {
                let bill = supplier_transactions::Entity::find_by_id(bill_id)
                    .filter(supplier_transactions::Column::SupplierId.eq(input.party_id))
                    .filter(supplier_transactions::Column::EntryType.eq(LedgerEntryType::Bill))
                    .one(&txn)
                    .await?
                    .ok_or(VoucherError::BillNotFound(bill_id))?;

                let applied = cap_against_bill(amount, bill.amount_due);
                vec![apply_to_supplier_bill(&txn, bill, applied).await?]
            }
            SettlementMethod::OnAccount => {
                let open: Vec<OpenBill> = open_supplier_bills(&txn, input.party_id)
                    .await?
                    .into_iter()
                    .map(|b| OpenBill {
                        id: b.id,
                        amount_due: b.amount_due,
                    })
                    .collect();

                let mut applied = Vec::with_capacity(open.len());
                for application in allocate_oldest_first(amount, &open) {
                    let bill = supplier_transactions::Entity::find_by_id(application.bill_id)
                        .one(&txn)
                        .await?
                        .ok_or(VoucherError::BillNotFound(application.bill_id))?;
                    applied.push(apply_to_supplier_bill(&txn, bill, application.applied).await?);
                }
                applied
            }
        };

        let now_tz: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        suppliers::Entity::update_many()
            .col_expr(
                suppliers::Column::OutstandingBalance,
                Expr::col(suppliers::Column::OutstandingBalance).sub(amount),
            )
            .col_expr(suppliers::Column::UpdatedAt, Expr::value(now_tz))
            .filter(suppliers::Column::Id.eq(input.party_id))
            .exec(&txn)
            .await?;

        let entry = supplier_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(input.party_id),
            purchase_invoice: Set(None),
            entry_type: Set(LedgerEntryType::Payment),
            amount: Set(amount),
            amount_paid: Set(amount),
            amount_due: Set(Decimal::ZERO),
            status: Set(BillStatus::Completed),
            method: Set(Some(input.method.as_str().to_string())),
            is_advance: Set(input.method.is_advance()),
            remaining_advance: Set(if input.method.is_advance() {
                amount
            } else {
                Decimal::ZERO
            }),
            entry_date: Set(input.entry_date),
            created_at: Set(now_tz),
        };
        let entry = entry.insert(&txn).await?;

        let supplier = suppliers::Entity::find_by_id(input.party_id)
            .one(&txn)
            .await?
            .ok_or(VoucherError::SupplierNotFound(input.party_id))?;

        txn.commit().await?;

        Ok(VoucherOutcome {
            entry_id: entry.id,
            new_balance: supplier.outstanding_balance,
            applications,
        })
    }

    /// A customer's unused advances: advance rows with funds left, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unused_customer_advances(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<credit_transactions::Model>, VoucherError> {
        Ok(credit_transactions::Entity::find()
            .filter(credit_transactions::Column::CustomerId.eq(customer_id))
            .filter(credit_transactions::Column::IsAdvance.eq(true))
            .filter(credit_transactions::Column::RemainingAdvance.gt(Decimal::ZERO))
            .order_by_asc(credit_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// A supplier's unused advances: advance rows with funds left, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unused_supplier_advances(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<supplier_transactions::Model>, VoucherError> {
        Ok(supplier_transactions::Entity::find()
            .filter(supplier_transactions::Column::SupplierId.eq(supplier_id))
            .filter(supplier_transactions::Column::IsAdvance.eq(true))
            .filter(supplier_transactions::Column::RemainingAdvance.gt(Decimal::ZERO))
            .order_by_asc(supplier_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}

/// Open (not fully settled) sales of a customer, oldest first.
async fn open_sales<C: sea_orm::ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
) -> Result<Vec<sales::Model>, DbErr> {
    sales::Entity::find()
        .filter(sales::Column::CustomerId.eq(customer_id))
        .filter(sales::Column::Status.ne(BillStatus::Completed))
        .filter(sales::Column::AmountDue.gt(Decimal::ZERO))
        .order_by_asc(sales::Column::CreatedAt)
        .all(conn)
        .await
}

/// Applies funds to a sale: paid goes up, due and status follow.
async fn apply_to_sale(
    txn: &DatabaseTransaction,
    sale: sales::Model,
    applied: Decimal,
) -> Result<BillApplication, VoucherError> {
    let new_paid = round2(sale.amount_paid + applied);
    let (amount_due, standing) = standing_for(sale.total, new_paid);
    let sale_id = sale.id;

    let mut active: sales::ActiveModel = sale.into();
    active.amount_paid = Set(new_paid);
    active.amount_due = Set(amount_due);
    active.status = Set(standing.into());
    active.updated_at = Set(Utc::now().into());
    active.update(txn).await?;

    Ok(BillApplication {
        bill_id: sale_id,
        applied,
        remaining_due: amount_due,
    })
}

/// Applies funds to a supplier bill row: paid goes up, due and status follow.
async fn apply_to_supplier_bill(
    txn: &DatabaseTransaction,
    bill: supplier_transactions::Model,
    applied: Decimal,
) -> Result<BillApplication, VoucherError> {
    let new_paid = round2(bill.amount_paid + applied);
    let (amount_due, standing) = standing_for(bill.amount, new_paid);
    let bill_id = bill.id;

    let mut active: supplier_transactions::ActiveModel = bill.into();
    active.amount_paid = Set(new_paid);
    active.amount_due = Set(amount_due);
    active.status = Set(standing.into());
    active.update(txn).await?;

    Ok(BillApplication {
        bill_id,
        applied,
        remaining_due: amount_due,
    })
}
