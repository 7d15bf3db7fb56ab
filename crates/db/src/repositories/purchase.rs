//! Purchase repository: goods receipt with supplier bill side effects.
//!
//! A purchase receives one supplier bill: line items keyed by product name
//! (unknown products are created on the fly), stock increments, a single
//! `bill`-type ledger row carrying the bill's settleable due, optional
//! consumption of previously recorded advances, and the supplier balance
//! bump. All of it commits in one database transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use khata_shared::types::round2;

use khata_core::settlement::standing_for;

use crate::entities::{
    products, purchases, supplier_transactions, suppliers,
    sea_orm_active_enums::{BillStatus, LedgerEntryType},
};

/// Error types for purchase operations.
#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    /// Supplier not found.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(Uuid),

    /// Advance ledger row not found or not an advance of this supplier.
    #[error("Advance not found: {0}")]
    AdvanceNotFound(Uuid),

    /// A purchase needs at least one line item.
    #[error("A purchase requires at least one item")]
    EmptyItems,

    /// Line quantities must be positive.
    #[error("Item quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    /// Unit rates must not be negative.
    #[error("Item rate must not be negative")]
    NegativeRate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for one purchase line item.
#[derive(Debug, Clone)]
pub struct PurchaseItemInput {
    /// Product name; unknown names create the product.
    pub product_name: String,
    /// Units received.
    pub quantity: i32,
    /// Unit cost.
    pub rate: Decimal,
    /// Explicit line amount; falls back to quantity × rate.
    pub amount: Option<Decimal>,
    /// HSN code, applied when the product is created.
    pub hsn_code: Option<String>,
    /// GST rate, applied when the product is created.
    pub gst_rate: Option<Decimal>,
}

/// A previously recorded advance to consume against this bill.
#[derive(Debug, Clone)]
pub struct AdvanceAdjustment {
    /// The advance ledger row.
    pub advance_id: Uuid,
    /// Amount requested; the advance's full remainder when omitted. Capped
    /// at that remainder and at the bill's due either way.
    pub amount: Option<Decimal>,
}

/// Input for recording a purchase.
#[derive(Debug, Clone)]
pub struct CreatePurchaseInput {
    /// Supplier billing us.
    pub supplier_id: Uuid,
    /// The supplier's invoice number, shared by all line items.
    pub invoice_number: String,
    /// Date the goods were received.
    pub received_date: NaiveDate,
    /// Line items.
    pub items: Vec<PurchaseItemInput>,
    /// Advances to adjust against this bill, in the given order.
    pub advance_adjustments: Vec<AdvanceAdjustment>,
}

/// A recorded purchase with its bill row and the resulting supplier balance.
#[derive(Debug, Clone)]
pub struct CreatedPurchase {
    /// Line item rows.
    pub items: Vec<purchases::Model>,
    /// The bill-type ledger row carrying the settleable due.
    pub bill: supplier_transactions::Model,
    /// Supplier's outstanding balance after this purchase.
    pub supplier_balance: Decimal,
}

/// Purchase repository.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    db: DatabaseConnection,
}

impl PurchaseRepository {
    /// Creates a new purchase repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a purchase: creates or restocks products, appends the bill
    /// ledger row, consumes any requested advances, and bumps the supplier
    /// balance by the remaining due, all in one database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The item list is empty, a quantity is non-positive, or a rate is
    ///   negative
    /// - The supplier or a referenced advance does not exist
    /// - A database operation fails
    pub async fn create_purchase(
        &self,
        input: CreatePurchaseInput,
    ) -> Result<CreatedPurchase, PurchaseError> {
        if input.items.is_empty() {
            return Err(PurchaseError::EmptyItems);
        }
        for item in &input.items {
            if item.quantity <= 0 {
                return Err(PurchaseError::InvalidQuantity(item.quantity));
            }
            if item.rate < Decimal::ZERO {
                return Err(PurchaseError::NegativeRate);
            }
        }

        let txn = self.db.begin().await?;

        suppliers::Entity::find_by_id(input.supplier_id)
            .one(&txn)
            .await?
            .ok_or(PurchaseError::SupplierNotFound(input.supplier_id))?;

        let now = Utc::now().into();
        let mut items = Vec::with_capacity(input.items.len());
        let mut bill_total = Decimal::ZERO;

        for item in &input.items {
            let product = restock_product(&txn, input.supplier_id, item).await?;

            let line_total = item
                .amount
                .map_or_else(|| round2(Decimal::from(item.quantity) * item.rate), round2);
            bill_total += line_total;

            let row = purchases::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product.id),
                supplier_id: Set(input.supplier_id),
                invoice_number: Set(input.invoice_number.clone()),
                quantity_received: Set(item.quantity),
                unit_cost: Set(item.rate),
                total_cost: Set(line_total),
                received_date: Set(input.received_date),
                created_at: Set(now),
            };
            items.push(row.insert(&txn).await?);
        }

        let bill_total = round2(bill_total);

        // Consume advances oldest-request-first, each capped at both the
        // advance's remainder and what is still due on this bill.
        let mut paid_from_advances = Decimal::ZERO;
        for adjustment in &input.advance_adjustments {
            let remaining_due = bill_total - paid_from_advances;
            if remaining_due <= Decimal::ZERO {
                break;
            }
            let consumed =
                consume_advance(&txn, input.supplier_id, adjustment, remaining_due).await?;
            paid_from_advances += consumed;
        }

        let (amount_due, standing) = standing_for(bill_total, paid_from_advances);

        let bill = supplier_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(input.supplier_id),
            purchase_invoice: Set(Some(input.invoice_number.clone())),
            entry_type: Set(LedgerEntryType::Bill),
            amount: Set(bill_total),
            amount_paid: Set(bill_total - amount_due),
            amount_due: Set(amount_due),
            status: Set(standing.into()),
            method: Set(None),
            is_advance: Set(false),
            remaining_advance: Set(Decimal::ZERO),
            entry_date: Set(input.received_date),
            created_at: Set(now),
        };
        let bill = bill.insert(&txn).await?;

        if amount_due > Decimal::ZERO {
            suppliers::Entity::update_many()
                .col_expr(
                    suppliers::Column::OutstandingBalance,
                    Expr::col(suppliers::Column::OutstandingBalance).add(amount_due),
                )
                .col_expr(suppliers::Column::UpdatedAt, Expr::value(now))
                .filter(suppliers::Column::Id.eq(input.supplier_id))
                .exec(&txn)
                .await?;
        }

        let supplier = suppliers::Entity::find_by_id(input.supplier_id)
            .one(&txn)
            .await?
            .ok_or(PurchaseError::SupplierNotFound(input.supplier_id))?;

        txn.commit().await?;

        Ok(CreatedPurchase {
            items,
            bill,
            supplier_balance: supplier.outstanding_balance,
        })
    }

    /// Lists a supplier's unpaid bills, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unpaid_bills(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<supplier_transactions::Model>, PurchaseError> {
        Ok(open_supplier_bills(&self.db, supplier_id).await?)
    }
}

/// Finds a product by name, creating it on first sight, and applies the
/// receipt: stock goes up and the latest rate overwrites both master prices
/// (last transaction price wins, same as on the sale side).
async fn restock_product(
    txn: &DatabaseTransaction,
    supplier_id: Uuid,
    item: &PurchaseItemInput,
) -> Result<products::Model, PurchaseError> {
    let now = Utc::now().into();

    if let Some(product) = products::Entity::find()
        .filter(products::Column::Name.eq(item.product_name.as_str()))
        .one(txn)
        .await?
    {
        products::Entity::update_many()
            .col_expr(
                products::Column::Stock,
                Expr::col(products::Column::Stock).add(item.quantity),
            )
            .col_expr(products::Column::PurchasePrice, Expr::value(item.rate))
            .col_expr(products::Column::SellingPrice, Expr::value(item.rate))
            .col_expr(products::Column::UpdatedAt, Expr::value(now))
            .filter(products::Column::Id.eq(product.id))
            .exec(txn)
            .await?;

        return Ok(product);
    }

    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(item.product_name.clone()),
        purchase_price: Set(item.rate),
        selling_price: Set(item.rate),
        stock: Set(item.quantity),
        gst_rate: Set(item.gst_rate),
        hsn_code: Set(item.hsn_code.clone()),
        supplier_id: Set(Some(supplier_id)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(product.insert(txn).await?)
}

/// Consumes one advance against the bill, returning the amount applied.
async fn consume_advance(
    txn: &DatabaseTransaction,
    supplier_id: Uuid,
    adjustment: &AdvanceAdjustment,
    remaining_due: Decimal,
) -> Result<Decimal, PurchaseError> {
    let advance = supplier_transactions::Entity::find_by_id(adjustment.advance_id)
        .filter(supplier_transactions::Column::SupplierId.eq(supplier_id))
        .filter(supplier_transactions::Column::IsAdvance.eq(true))
        .one(txn)
        .await?
        .ok_or(PurchaseError::AdvanceNotFound(adjustment.advance_id))?;

    let requested = adjustment
        .amount
        .map_or(advance.remaining_advance, round2);
    let consumed = requested
        .min(advance.remaining_advance)
        .min(remaining_due)
        .max(Decimal::ZERO);

    if consumed > Decimal::ZERO {
        let new_remaining = round2(advance.remaining_advance - consumed);
        let mut active: supplier_transactions::ActiveModel = advance.into();
        active.remaining_advance = Set(new_remaining);
        active.update(txn).await?;
    }

    Ok(consumed)
}

/// Open (not fully settled) supplier bills, oldest first.
pub(crate) async fn open_supplier_bills<C: sea_orm::ConnectionTrait>(
    conn: &C,
    supplier_id: Uuid,
) -> Result<Vec<supplier_transactions::Model>, DbErr> {
    supplier_transactions::Entity::find()
        .filter(supplier_transactions::Column::SupplierId.eq(supplier_id))
        .filter(supplier_transactions::Column::EntryType.eq(LedgerEntryType::Bill))
        .filter(supplier_transactions::Column::Status.ne(BillStatus::Completed))
        .filter(supplier_transactions::Column::AmountDue.gt(Decimal::ZERO))
        .order_by_asc(supplier_transactions::Column::CreatedAt)
        .all(conn)
        .await
}
