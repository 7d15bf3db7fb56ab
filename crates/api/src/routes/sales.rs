//! Sale routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use khata_core::settlement::TrustedTotals;
use khata_db::entities::{sale_items, sales};
use khata_db::repositories::{CreateSaleInput, SaleError, SaleItemInput, SaleRepository};
use khata_shared::AppError;

use crate::routes::error_response;
use crate::AppState;

/// Creates the sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", post(create_sale))
        .route("/sales/{sale_id}", get(get_sale))
}

/// Request body for one sale line item.
#[derive(Debug, Deserialize)]
pub struct SaleItemRequest {
    /// Product being sold.
    pub product_id: Uuid,
    /// Units sold.
    pub quantity: i32,
    /// Unit price override; defaults to the product's selling price.
    pub price: Option<Decimal>,
}

/// Request body for creating a sale.
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    /// Customer on account; omit for walk-in sales.
    pub customer_id: Option<Uuid>,
    /// Line items.
    pub items: Vec<SaleItemRequest>,
    /// Discount on the grand total.
    #[serde(default)]
    pub discount: Decimal,
    /// Amount tendered up front.
    #[serde(default)]
    pub amount_paid: Decimal,
    /// Payment mode label.
    #[serde(default = "default_payment_mode")]
    pub payment_mode: String,
    /// Explicit subtotal; trusted only when tax and total are also given.
    pub subtotal: Option<Decimal>,
    /// Explicit tax amount.
    pub tax: Option<Decimal>,
    /// Explicit grand total.
    pub total: Option<Decimal>,
}

fn default_payment_mode() -> String {
    "cash".to_string()
}

/// Response for a sale line item.
#[derive(Debug, Serialize)]
pub struct SaleItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Product ID.
    pub product_id: Uuid,
    /// Units sold.
    pub quantity: i32,
    /// Unit price used.
    pub price: Decimal,
    /// Line total.
    pub total: Decimal,
}

/// Response for a sale.
#[derive(Debug, Serialize)]
pub struct SaleResponse {
    /// Sale ID.
    pub id: Uuid,
    /// Issued invoice number.
    pub invoice_number: String,
    /// Customer ID, when on account.
    pub customer_id: Option<Uuid>,
    /// Subtotal.
    pub subtotal: Decimal,
    /// Tax amount.
    pub tax: Decimal,
    /// Discount.
    pub discount: Decimal,
    /// Grand total.
    pub total: Decimal,
    /// Amount paid so far.
    pub amount_paid: Decimal,
    /// Amount still due.
    pub amount_due: Decimal,
    /// Payment mode.
    pub payment_mode: String,
    /// Payment standing.
    pub status: String,
    /// Line items.
    pub items: Vec<SaleItemResponse>,
    /// Customer's outstanding balance after the sale, for credit sales.
    pub customer_balance: Option<Decimal>,
}

fn sale_response(
    sale: sales::Model,
    items: Vec<sale_items::Model>,
    customer_balance: Option<Decimal>,
) -> SaleResponse {
    SaleResponse {
        id: sale.id,
        invoice_number: sale.invoice_number,
        customer_id: sale.customer_id,
        subtotal: sale.subtotal,
        tax: sale.tax,
        discount: sale.discount,
        total: sale.total,
        amount_paid: sale.amount_paid,
        amount_due: sale.amount_due,
        payment_mode: sale.payment_mode,
        status: sale.status.as_str().to_string(),
        items: items
            .into_iter()
            .map(|item| SaleItemResponse {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                total: item.total,
            })
            .collect(),
        customer_balance,
    }
}

fn map_sale_error(err: SaleError) -> AppError {
    match err {
        SaleError::NotFound(_)
        | SaleError::CustomerNotFound(_)
        | SaleError::ProductNotFound(_) => AppError::NotFound(err.to_string()),
        SaleError::EmptyItems | SaleError::InvalidQuantity(_) => {
            AppError::Validation(err.to_string())
        }
        SaleError::InsufficientStock { .. } => AppError::BusinessRule(err.to_string()),
        SaleError::SequenceConflict => AppError::Conflict(err.to_string()),
        SaleError::Settings(_) => AppError::Internal(err.to_string()),
        SaleError::Database(_) => AppError::Database(err.to_string()),
    }
}

/// POST `/sales` - Create a sale.
async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> impl IntoResponse {
    // Trusted totals require the full triple; anything less is derived.
    let totals = match (payload.subtotal, payload.tax, payload.total) {
        (Some(subtotal), Some(tax), Some(total)) => Some(TrustedTotals {
            subtotal,
            tax,
            total,
        }),
        _ => None,
    };

    let input = CreateSaleInput {
        customer_id: payload.customer_id,
        items: payload
            .items
            .into_iter()
            .map(|item| SaleItemInput {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect(),
        discount: payload.discount,
        amount_paid: payload.amount_paid,
        payment_mode: payload.payment_mode,
        totals,
    };

    let repo = SaleRepository::new((*state.db).clone());
    match repo.create_sale(input).await {
        Ok(created) => {
            info!(
                sale_id = %created.sale.id,
                invoice_number = %created.sale.invoice_number,
                total = %created.sale.total,
                "Sale created"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "sale": sale_response(created.sale, created.items, created.customer_balance)
                })),
            )
                .into_response()
        }
        Err(err) => error_response(&map_sale_error(err)),
    }
}

/// GET `/sales/{sale_id}` - Get a sale with its items.
async fn get_sale(State(state): State<AppState>, Path(sale_id): Path<Uuid>) -> impl IntoResponse {
    let repo = SaleRepository::new((*state.db).clone());
    match repo.get_sale(sale_id).await {
        Ok((sale, items)) => (
            StatusCode::OK,
            Json(json!({ "sale": sale_response(sale, items, None) })),
        )
            .into_response(),
        Err(err) => error_response(&map_sale_error(err)),
    }
}
