//! Voucher routes: receipts, payments, and the settlement lookups that
//! feed voucher entry screens.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use khata_core::settlement::{BillApplication, SettlementMethod};
use khata_db::repositories::{
    PurchaseError, PurchaseRepository, SaleError, SaleRepository, VoucherError, VoucherInput,
    VoucherRepository,
};
use khata_shared::AppError;

use crate::routes::error_response;
use crate::AppState;

/// Creates the voucher routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vouchers/receipt", post(record_receipt))
        .route("/vouchers/payment", post(record_payment))
        .route("/vouchers/unpaid-sales/{customer_id}", get(unpaid_sales))
        .route(
            "/vouchers/unpaid-purchases/{supplier_id}",
            get(unpaid_purchases),
        )
        .route(
            "/vouchers/unused-advances/{entity}/{party_id}",
            get(unused_advances),
        )
}

/// Request body for a receipt or payment voucher.
#[derive(Debug, Deserialize)]
pub struct VoucherRequest {
    /// The customer (receipts) or supplier (payments).
    pub party_id: Uuid,
    /// Funds received or paid.
    pub amount: Decimal,
    /// Settlement method: `New Ref`, `Agst Ref`, `Advance`, or `On Account`.
    pub method: String,
    /// Referenced bill, required for `Agst Ref`.
    pub reference_id: Option<Uuid>,
    /// Voucher date; defaults to today.
    pub date: Option<NaiveDate>,
}

/// Response for one bill application.
#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    /// The bill settled.
    pub bill_id: Uuid,
    /// Amount applied to it.
    pub applied: Decimal,
    /// Due remaining on it.
    pub remaining_due: Decimal,
}

impl From<BillApplication> for ApplicationResponse {
    fn from(application: BillApplication) -> Self {
        Self {
            bill_id: application.bill_id,
            applied: application.applied,
            remaining_due: application.remaining_due,
        }
    }
}

fn map_voucher_error(err: VoucherError) -> AppError {
    match err {
        VoucherError::CustomerNotFound(_)
        | VoucherError::SupplierNotFound(_)
        | VoucherError::BillNotFound(_) => AppError::NotFound(err.to_string()),
        VoucherError::NonPositiveAmount => AppError::Validation(err.to_string()),
        VoucherError::Database(_) => AppError::Database(err.to_string()),
    }
}

fn parse_method(payload: &VoucherRequest) -> Result<SettlementMethod, AppError> {
    SettlementMethod::parse(&payload.method, payload.reference_id)
        .map_err(|err| AppError::Validation(err.to_string()))
}

/// POST `/vouchers/receipt` - Record a receipt from a customer.
async fn record_receipt(
    State(state): State<AppState>,
    Json(payload): Json<VoucherRequest>,
) -> impl IntoResponse {
    let method = match parse_method(&payload) {
        Ok(method) => method,
        Err(err) => return error_response(&err),
    };

    let repo = VoucherRepository::new((*state.db).clone());
    match repo
        .record_receipt(VoucherInput {
            party_id: payload.party_id,
            amount: payload.amount,
            method,
            entry_date: payload.date.unwrap_or_else(|| Utc::now().date_naive()),
        })
        .await
    {
        Ok(outcome) => {
            info!(
                customer_id = %payload.party_id,
                amount = %payload.amount,
                method = method.as_str(),
                "Receipt recorded"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "entry_id": outcome.entry_id,
                    "new_balance": outcome.new_balance,
                    "applications": outcome
                        .applications
                        .into_iter()
                        .map(ApplicationResponse::from)
                        .collect::<Vec<_>>(),
                })),
            )
                .into_response()
        }
        Err(err) => error_response(&map_voucher_error(err)),
    }
}

/// POST `/vouchers/payment` - Record a payment to a supplier.
async fn record_payment(
    State(state): State<AppState>,
    Json(payload): Json<VoucherRequest>,
) -> impl IntoResponse {
    let method = match parse_method(&payload) {
        Ok(method) => method,
        Err(err) => return error_response(&err),
    };

    let repo = VoucherRepository::new((*state.db).clone());
    match repo
        .record_payment(VoucherInput {
            party_id: payload.party_id,
            amount: payload.amount,
            method,
            entry_date: payload.date.unwrap_or_else(|| Utc::now().date_naive()),
        })
        .await
    {
        Ok(outcome) => {
            info!(
                supplier_id = %payload.party_id,
                amount = %payload.amount,
                method = method.as_str(),
                "Payment recorded"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "entry_id": outcome.entry_id,
                    "new_balance": outcome.new_balance,
                    "applications": outcome
                        .applications
                        .into_iter()
                        .map(ApplicationResponse::from)
                        .collect::<Vec<_>>(),
                })),
            )
                .into_response()
        }
        Err(err) => error_response(&map_voucher_error(err)),
    }
}

/// GET `/vouchers/unpaid-sales/{customer_id}` - Open sales for `Agst Ref`
/// receipt entry, oldest first.
async fn unpaid_sales(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SaleRepository::new((*state.db).clone());
    match repo.unpaid_sales(customer_id).await {
        Ok(open) => (StatusCode::OK, Json(json!({ "sales": open }))).into_response(),
        Err(err @ SaleError::Database(_)) => {
            error_response(&AppError::Database(err.to_string()))
        }
        Err(err) => error_response(&AppError::Internal(err.to_string())),
    }
}

/// GET `/vouchers/unpaid-purchases/{supplier_id}` - Open supplier bills for
/// `Agst Ref` payment entry, oldest first.
async fn unpaid_purchases(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PurchaseRepository::new((*state.db).clone());
    match repo.unpaid_bills(supplier_id).await {
        Ok(open) => (StatusCode::OK, Json(json!({ "bills": open }))).into_response(),
        Err(err @ PurchaseError::Database(_)) => {
            error_response(&AppError::Database(err.to_string()))
        }
        Err(err) => error_response(&AppError::Internal(err.to_string())),
    }
}

/// GET `/vouchers/unused-advances/{entity}/{party_id}` - Advances with funds
/// left, for `entity` either `customer` or `supplier`.
async fn unused_advances(
    State(state): State<AppState>,
    Path((entity, party_id)): Path<(String, Uuid)>,
) -> impl IntoResponse {
    let repo = VoucherRepository::new((*state.db).clone());
    match entity.as_str() {
        "customer" => match repo.unused_customer_advances(party_id).await {
            Ok(advances) => {
                (StatusCode::OK, Json(json!({ "advances": advances }))).into_response()
            }
            Err(err) => error_response(&map_voucher_error(err)),
        },
        "supplier" => match repo.unused_supplier_advances(party_id).await {
            Ok(advances) => {
                (StatusCode::OK, Json(json!({ "advances": advances }))).into_response()
            }
            Err(err) => error_response(&map_voucher_error(err)),
        },
        other => error_response(&AppError::Validation(format!(
            "Unknown entity '{other}', expected 'customer' or 'supplier'"
        ))),
    }
}
