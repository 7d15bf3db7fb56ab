//! Sale repository: invoice creation with stock and credit side effects.
//!
//! A sale is one atomic unit: the invoice number draw, the sale header, its
//! line items, the stock decrements, and (for credit sales) the customer
//! balance bump plus its audit ledger row all commit together or not at all.
//! Stock decrements are guarded by `stock >= quantity` in the UPDATE itself,
//! so two concurrent sales cannot oversell a product.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use khata_core::settlement::{standing_for, SaleLine, SaleTotals, TrustedTotals};

use crate::entities::{
    credit_transactions, customers, products, sale_items, sales,
    sea_orm_active_enums::{BillStatus, LedgerEntryType},
};
use crate::repositories::settings::{self, SettingsError};

/// Error types for sale operations.
#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    /// Sale not found.
    #[error("Sale not found: {0}")]
    NotFound(Uuid),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// A sale needs at least one line item.
    #[error("A sale requires at least one item")]
    EmptyItems,

    /// Line quantities must be positive.
    #[error("Item quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    /// Not enough stock on hand.
    #[error("Insufficient stock for '{product}': requested {requested}, available {available}")]
    InsufficientStock {
        /// Product name.
        product: String,
        /// Units requested.
        requested: i32,
        /// Units on hand.
        available: i32,
    },

    /// The invoice sequence advanced concurrently.
    #[error("Invoice sequence advanced concurrently, please retry")]
    SequenceConflict,

    /// Settings store failure while issuing the invoice number.
    #[error("Settings error: {0}")]
    Settings(SettingsError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SettingsError> for SaleError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::SequenceConflict => Self::SequenceConflict,
            SettingsError::Database(db) => Self::Database(db),
            other => Self::Settings(other),
        }
    }
}

/// Input for one sale line item.
#[derive(Debug, Clone)]
pub struct SaleItemInput {
    /// Product being sold.
    pub product_id: Uuid,
    /// Units sold.
    pub quantity: i32,
    /// Unit price override; falls back to the product's selling price.
    pub price: Option<Decimal>,
}

/// Input for creating a sale.
#[derive(Debug, Clone)]
pub struct CreateSaleInput {
    /// Customer on account; None for walk-in sales.
    pub customer_id: Option<Uuid>,
    /// Line items.
    pub items: Vec<SaleItemInput>,
    /// Discount applied to the grand total.
    pub discount: Decimal,
    /// Amount tendered up front.
    pub amount_paid: Decimal,
    /// Payment mode label (cash, card, upi, credit...).
    pub payment_mode: String,
    /// Caller-supplied totals; authoritative when present.
    pub totals: Option<TrustedTotals>,
}

/// A created sale with its line items and the resulting customer balance.
#[derive(Debug, Clone)]
pub struct CreatedSale {
    /// Sale header.
    pub sale: sales::Model,
    /// Line items.
    pub items: Vec<sale_items::Model>,
    /// Customer's outstanding balance after this sale, for credit sales.
    pub customer_balance: Option<Decimal>,
}

/// Sale repository.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    db: DatabaseConnection,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a sale: issues the invoice number, writes the header and
    /// items, decrements stock, and records any credit extended, all in one
    /// database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The item list is empty or a quantity is non-positive
    /// - The customer or a product does not exist
    /// - A product has insufficient stock
    /// - The invoice sequence advanced concurrently
    /// - A database operation fails
    pub async fn create_sale(&self, input: CreateSaleInput) -> Result<CreatedSale, SaleError> {
        if input.items.is_empty() {
            return Err(SaleError::EmptyItems);
        }
        for item in &input.items {
            if item.quantity <= 0 {
                return Err(SaleError::InvalidQuantity(item.quantity));
            }
        }

        let txn = self.db.begin().await?;

        if let Some(customer_id) = input.customer_id {
            customers::Entity::find_by_id(customer_id)
                .one(&txn)
                .await?
                .ok_or(SaleError::CustomerNotFound(customer_id))?;
        }

        // Load products and resolve unit prices before touching anything.
        let mut resolved = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let product = products::Entity::find_by_id(item.product_id)
                .one(&txn)
                .await?
                .ok_or(SaleError::ProductNotFound(item.product_id))?;

            if product.stock < item.quantity {
                return Err(SaleError::InsufficientStock {
                    product: product.name,
                    requested: item.quantity,
                    available: product.stock,
                });
            }

            let price = item.price.unwrap_or(product.selling_price);
            resolved.push((product, item.quantity, price));
        }

        let lines: Vec<SaleLine> = resolved
            .iter()
            .map(|(_, quantity, price)| SaleLine {
                quantity: *quantity,
                unit_price: *price,
            })
            .collect();
        let totals = SaleTotals::resolve(input.totals, &lines, input.discount);
        let (amount_due, standing) = standing_for(totals.total, input.amount_paid);

        let invoice_number = settings::issue_invoice_number(&txn).await?;

        let now = Utc::now().into();
        let sale_id = Uuid::new_v4();

        let sale = sales::ActiveModel {
            id: Set(sale_id),
            invoice_number: Set(invoice_number),
            customer_id: Set(input.customer_id),
            subtotal: Set(totals.subtotal),
            tax: Set(totals.tax),
            discount: Set(totals.discount),
            total: Set(totals.total),
            amount_paid: Set(totals.total - amount_due),
            amount_due: Set(amount_due),
            payment_mode: Set(input.payment_mode),
            status: Set(standing.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let sale = sale.insert(&txn).await?;

        let mut items = Vec::with_capacity(resolved.len());
        for (product, quantity, price) in &resolved {
            let line = SaleLine {
                quantity: *quantity,
                unit_price: *price,
            };
            let item = sale_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                sale_id: Set(sale_id),
                product_id: Set(product.id),
                quantity: Set(*quantity),
                price: Set(*price),
                total: Set(line.total()),
                hsn_code: Set(product.hsn_code.clone()),
                gst_rate: Set(product.gst_rate),
                discount: Set(Decimal::ZERO),
                created_at: Set(now),
            };
            items.push(item.insert(&txn).await?);

            // Guarded decrement: the filter re-checks stock so a concurrent
            // sale of the same product cannot drive it negative. The sale
            // price becomes the product's new master selling price.
            let updated = products::Entity::update_many()
                .col_expr(
                    products::Column::Stock,
                    Expr::col(products::Column::Stock).sub(*quantity),
                )
                .col_expr(products::Column::SellingPrice, Expr::value(*price))
                .col_expr(products::Column::UpdatedAt, Expr::value(now))
                .filter(products::Column::Id.eq(product.id))
                .filter(products::Column::Stock.gte(*quantity))
                .exec(&txn)
                .await?;

            if updated.rows_affected == 0 {
                return Err(SaleError::InsufficientStock {
                    product: product.name.clone(),
                    requested: *quantity,
                    available: product.stock,
                });
            }
        }

        let customer_balance = match (input.customer_id, amount_due > Decimal::ZERO) {
            (Some(customer_id), true) => {
                Some(extend_credit(&txn, customer_id, sale_id, amount_due).await?)
            }
            _ => None,
        };

        txn.commit().await?;

        Ok(CreatedSale {
            sale,
            items,
            customer_balance,
        })
    }

    /// Gets a sale by ID with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the sale is not found or the query fails.
    pub async fn get_sale(&self, id: Uuid) -> Result<(sales::Model, Vec<sale_items::Model>), SaleError> {
        let sale = sales::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(SaleError::NotFound(id))?;

        let items = sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.eq(id))
            .order_by_asc(sale_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok((sale, items))
    }

    /// Lists a customer's unpaid sales, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unpaid_sales(&self, customer_id: Uuid) -> Result<Vec<sales::Model>, SaleError> {
        Ok(sales::Entity::find()
            .filter(sales::Column::CustomerId.eq(customer_id))
            .filter(sales::Column::Status.ne(BillStatus::Completed))
            .filter(sales::Column::AmountDue.gt(Decimal::ZERO))
            .order_by_asc(sales::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}

/// Bumps the customer's balance by the credit extended and appends the
/// matching audit ledger row.
async fn extend_credit(
    txn: &DatabaseTransaction,
    customer_id: Uuid,
    sale_id: Uuid,
    amount_due: Decimal,
) -> Result<Decimal, SaleError> {
    let now = Utc::now();
    let now_tz: sea_orm::prelude::DateTimeWithTimeZone = now.into();

    customers::Entity::update_many()
        .col_expr(
            customers::Column::OutstandingBalance,
            Expr::col(customers::Column::OutstandingBalance).add(amount_due),
        )
        .col_expr(customers::Column::UpdatedAt, Expr::value(now_tz))
        .filter(customers::Column::Id.eq(customer_id))
        .exec(txn)
        .await?;

    let entry = credit_transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        sale_id: Set(Some(sale_id)),
        entry_type: Set(LedgerEntryType::Credit),
        amount: Set(amount_due),
        amount_paid: Set(Decimal::ZERO),
        amount_due: Set(amount_due),
        status: Set(BillStatus::Pending),
        method: Set(None),
        is_advance: Set(false),
        remaining_advance: Set(Decimal::ZERO),
        entry_date: Set(now.date_naive()),
        created_at: Set(now.into()),
    };
    entry.insert(txn).await?;

    let customer = customers::Entity::find_by_id(customer_id)
        .one(txn)
        .await?
        .ok_or(SaleError::CustomerNotFound(customer_id))?;

    Ok(customer.outstanding_balance)
}
