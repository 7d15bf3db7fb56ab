//! Purchase routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use khata_db::entities::supplier_transactions;
use khata_db::repositories::{
    AdvanceAdjustment, CreatePurchaseInput, PurchaseError, PurchaseItemInput, PurchaseRepository,
};
use khata_shared::AppError;

use crate::routes::error_response;
use crate::AppState;

/// Creates the purchase routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/purchases", post(create_purchase))
}

/// Request body for one purchase line item.
#[derive(Debug, Deserialize)]
pub struct PurchaseItemRequest {
    /// Product name; unknown names create the product.
    pub product_name: String,
    /// Units received.
    pub quantity: i32,
    /// Unit cost.
    pub rate: Decimal,
    /// Explicit line amount; defaults to quantity × rate.
    pub amount: Option<Decimal>,
    /// HSN code, applied when the product is created.
    pub hsn_code: Option<String>,
    /// GST rate, applied when the product is created.
    pub gst_rate: Option<Decimal>,
}

/// Request body for one advance adjustment.
#[derive(Debug, Deserialize)]
pub struct AdvanceAdjustmentRequest {
    /// The advance ledger row to consume.
    pub advance_id: Uuid,
    /// Amount to adjust; omit to consume as much of the advance as the bill
    /// allows. Capped at the advance's remainder and the bill due.
    pub amount: Option<Decimal>,
}

/// Request body for recording a purchase.
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    /// Supplier billing us.
    pub supplier_id: Uuid,
    /// The supplier's invoice number; generated when omitted.
    pub invoice_number: Option<String>,
    /// Date the goods were received; defaults to today.
    pub received_date: Option<NaiveDate>,
    /// Line items.
    pub items: Vec<PurchaseItemRequest>,
    /// Advances to adjust against this bill.
    #[serde(default)]
    pub advance_adjustments: Vec<AdvanceAdjustmentRequest>,
}

/// Response for the bill created by a purchase.
#[derive(Debug, Serialize)]
pub struct BillResponse {
    /// Bill ledger row ID.
    pub id: Uuid,
    /// The supplier's invoice number.
    pub purchase_invoice: Option<String>,
    /// Bill total.
    pub amount: Decimal,
    /// Paid so far (from advances).
    pub amount_paid: Decimal,
    /// Still due.
    pub amount_due: Decimal,
    /// Payment standing.
    pub status: String,
}

impl From<supplier_transactions::Model> for BillResponse {
    fn from(bill: supplier_transactions::Model) -> Self {
        Self {
            id: bill.id,
            purchase_invoice: bill.purchase_invoice,
            amount: bill.amount,
            amount_paid: bill.amount_paid,
            amount_due: bill.amount_due,
            status: bill.status.as_str().to_string(),
        }
    }
}

fn map_purchase_error(err: PurchaseError) -> AppError {
    match err {
        PurchaseError::SupplierNotFound(_) | PurchaseError::AdvanceNotFound(_) => {
            AppError::NotFound(err.to_string())
        }
        PurchaseError::EmptyItems
        | PurchaseError::InvalidQuantity(_)
        | PurchaseError::NegativeRate => AppError::Validation(err.to_string()),
        PurchaseError::Database(_) => AppError::Database(err.to_string()),
    }
}

/// POST `/purchases` - Record a purchase.
async fn create_purchase(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseRequest>,
) -> impl IntoResponse {
    let input = CreatePurchaseInput {
        supplier_id: payload.supplier_id,
        invoice_number: payload
            .invoice_number
            .unwrap_or_else(|| format!("PUR-{}", Utc::now().timestamp())),
        received_date: payload
            .received_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        items: payload
            .items
            .into_iter()
            .map(|item| PurchaseItemInput {
                product_name: item.product_name,
                quantity: item.quantity,
                rate: item.rate,
                amount: item.amount,
                hsn_code: item.hsn_code,
                gst_rate: item.gst_rate,
            })
            .collect(),
        advance_adjustments: payload
            .advance_adjustments
            .into_iter()
            .map(|adjustment| AdvanceAdjustment {
                advance_id: adjustment.advance_id,
                amount: adjustment.amount,
            })
            .collect(),
    };

    let repo = PurchaseRepository::new((*state.db).clone());
    match repo.create_purchase(input).await {
        Ok(created) => {
            info!(
                supplier_id = %created.bill.supplier_id,
                bill_total = %created.bill.amount,
                "Purchase recorded"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "bill": BillResponse::from(created.bill),
                    "items": created.items,
                    "supplier_balance": created.supplier_balance,
                })),
            )
                .into_response()
        }
        Err(err) => error_response(&map_purchase_error(err)),
    }
}
