//! Customer and supplier routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use khata_db::repositories::{
    CreateCustomerInput, CreateSupplierInput, CustomerRepository, PartyError, SupplierRepository,
};
use khata_shared::AppError;

use crate::routes::error_response;
use crate::AppState;

/// Creates the party routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", post(create_customer).get(list_customers))
        .route("/customers/{customer_id}", get(get_customer))
        .route("/suppliers", post(create_supplier).get(list_suppliers))
        .route("/suppliers/{supplier_id}", get(get_supplier))
}

/// Request body for creating a customer.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    /// Display name.
    pub name: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional GST registration number.
    pub gst_number: Option<String>,
    /// Optional state name.
    pub state: Option<String>,
    /// Optional state code.
    pub state_code: Option<String>,
    /// Credit limit; zero when unset.
    #[serde(default)]
    pub credit_limit: Decimal,
}

/// Request body for creating a supplier.
#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    /// Display name.
    pub name: String,
    /// Optional GST registration number.
    pub gst_number: Option<String>,
}

fn map_party_error(err: PartyError) -> AppError {
    match err {
        PartyError::CustomerNotFound(_) | PartyError::SupplierNotFound(_) => {
            AppError::NotFound(err.to_string())
        }
        PartyError::Database(_) => AppError::Database(err.to_string()),
    }
}

/// POST `/customers` - Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return error_response(&AppError::Validation("Name must not be empty".to_string()));
    }

    let repo = CustomerRepository::new((*state.db).clone());
    match repo
        .create(CreateCustomerInput {
            name: payload.name,
            phone: payload.phone,
            gst_number: payload.gst_number,
            state: payload.state,
            state_code: payload.state_code,
            credit_limit: payload.credit_limit,
        })
        .await
    {
        Ok(customer) => (StatusCode::CREATED, Json(json!({ "customer": customer }))).into_response(),
        Err(err) => error_response(&map_party_error(err)),
    }
}

/// GET `/customers` - List customers.
async fn list_customers(State(state): State<AppState>) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(customers) => (StatusCode::OK, Json(json!({ "customers": customers }))).into_response(),
        Err(err) => error_response(&map_party_error(err)),
    }
}

/// GET `/customers/{customer_id}` - Get a customer with its balance.
async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());
    match repo.find_by_id(customer_id).await {
        Ok(customer) => (StatusCode::OK, Json(json!({ "customer": customer }))).into_response(),
        Err(err) => error_response(&map_party_error(err)),
    }
}

/// POST `/suppliers` - Create a supplier.
async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return error_response(&AppError::Validation("Name must not be empty".to_string()));
    }

    let repo = SupplierRepository::new((*state.db).clone());
    match repo
        .create(CreateSupplierInput {
            name: payload.name,
            gst_number: payload.gst_number,
        })
        .await
    {
        Ok(supplier) => (StatusCode::CREATED, Json(json!({ "supplier": supplier }))).into_response(),
        Err(err) => error_response(&map_party_error(err)),
    }
}

/// GET `/suppliers` - List suppliers.
async fn list_suppliers(State(state): State<AppState>) -> impl IntoResponse {
    let repo = SupplierRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(suppliers) => (StatusCode::OK, Json(json!({ "suppliers": suppliers }))).into_response(),
        Err(err) => error_response(&map_party_error(err)),
    }
}

/// GET `/suppliers/{supplier_id}` - Get a supplier with its balance.
async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = SupplierRepository::new((*state.db).clone());
    match repo.find_by_id(supplier_id).await {
        Ok(supplier) => (StatusCode::OK, Json(json!({ "supplier": supplier }))).into_response(),
        Err(err) => error_response(&map_party_error(err)),
    }
}
