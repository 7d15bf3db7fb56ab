//! Integration tests for the HTTP API.
//!
//! Each test builds the full router over an in-memory SQLite database and
//! drives it with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use khata_api::{create_router, AppState};
use khata_db::migration::{Migrator, MigratorTrait};


/// Parses a JSON string field into a `Decimal`.
///
/// Monetary fields serialize as strings; their scale depends on the
/// database roundtrip, so tests compare values, not text.
fn dec(value: &Value) -> rust_decimal::Decimal {
    value.as_str().unwrap().parse().unwrap()
}

async fn test_app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");

    create_router(AppState { db: Arc::new(db) })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_customer(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/customers",
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["customer"]["id"].as_str().unwrap().to_string()
}

async fn create_supplier(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/suppliers",
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["supplier"]["id"].as_str().unwrap().to_string()
}

/// Stocks a product through the purchase endpoint, returning its ID.
async fn stock_product(app: &Router, supplier_id: &str, name: &str, quantity: i32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/purchases",
        Some(json!({
            "supplier_id": supplier_id,
            "invoice_number": "MS-1001",
            "items": [{ "product_name": name, "quantity": quantity, "rate": 50 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["items"][0]["product_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_get_customer() {
    let app = test_app().await;
    let customer_id = create_customer(&app, "Asha Traders").await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/customers/{customer_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["name"], "Asha Traders");
}

#[tokio::test]
async fn test_empty_customer_name_rejected() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/customers",
        Some(json!({ "name": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_customer_is_404() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/customers/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_purchase_records_bill_and_balance() {
    let app = test_app().await;
    let supplier_id = create_supplier(&app, "Mehta & Sons").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/purchases",
        Some(json!({
            "supplier_id": supplier_id,
            "invoice_number": "MS-1002",
            "items": [{ "product_name": "Widget", "quantity": 10, "rate": 50 }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["bill"]["status"], "pending");
    assert_eq!(body["bill"]["purchase_invoice"], "MS-1002");
    assert_eq!(dec(&body["supplier_balance"]), dec!(500));
}

#[tokio::test]
async fn test_purchase_without_invoice_number_generates_one() {
    let app = test_app().await;
    let supplier_id = create_supplier(&app, "Mehta & Sons").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/purchases",
        Some(json!({
            "supplier_id": supplier_id,
            "items": [{ "product_name": "Widget", "quantity": 1, "rate": 50 }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["bill"]["purchase_invoice"]
        .as_str()
        .unwrap()
        .starts_with("PUR-"));
}

#[tokio::test]
async fn test_cash_sale_returns_invoice_and_totals() {
    let app = test_app().await;
    let supplier_id = create_supplier(&app, "Mehta & Sons").await;
    let product_id = stock_product(&app, &supplier_id, "Widget", 10).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/sales",
        Some(json!({
            "items": [{ "product_id": product_id, "quantity": 2, "price": 100 }],
            "amount_paid": 220,
            "payment_mode": "cash"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&body["sale"]["subtotal"]), dec!(200));
    assert_eq!(dec(&body["sale"]["tax"]), dec!(20));
    assert_eq!(dec(&body["sale"]["total"]), dec!(220));
    assert_eq!(body["sale"]["status"], "completed");
    assert!(body["sale"]["invoice_number"]
        .as_str()
        .unwrap()
        .starts_with("INV001/"));
}

#[tokio::test]
async fn test_oversell_is_unprocessable() {
    let app = test_app().await;
    let supplier_id = create_supplier(&app, "Mehta & Sons").await;
    let product_id = stock_product(&app, &supplier_id, "Widget", 1).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/sales",
        Some(json!({
            "items": [{ "product_id": product_id, "quantity": 5 }],
            "amount_paid": 0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BUSINESS_RULE_VIOLATION");
}

#[tokio::test]
async fn test_credit_sale_then_receipt_settles_bill() {
    let app = test_app().await;
    let supplier_id = create_supplier(&app, "Mehta & Sons").await;
    let customer_id = create_customer(&app, "Asha Traders").await;
    let product_id = stock_product(&app, &supplier_id, "Widget", 10).await;

    // Credit sale with trusted totals: 300 + 54 tax = 354, nothing paid.
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/sales",
        Some(json!({
            "customer_id": customer_id,
            "items": [{ "product_id": product_id, "quantity": 3, "price": 100 }],
            "amount_paid": 0,
            "payment_mode": "credit",
            "subtotal": 300,
            "tax": 54,
            "total": 354
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&body["sale"]["amount_due"]), dec!(354));
    assert_eq!(dec(&body["sale"]["customer_balance"]), dec!(354));
    let sale_id = body["sale"]["id"].as_str().unwrap().to_string();

    // The open bill shows up for voucher entry.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/vouchers/unpaid-sales/{customer_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sales"].as_array().unwrap().len(), 1);

    // Receipt against the bill settles it and zeroes the balance.
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/vouchers/receipt",
        Some(json!({
            "party_id": customer_id,
            "amount": 354,
            "method": "Agst Ref",
            "reference_id": sale_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&body["new_balance"]), dec!(0));
    assert_eq!(dec(&body["applications"][0]["applied"]), dec!(354));
    assert_eq!(dec(&body["applications"][0]["remaining_due"]), dec!(0));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/vouchers/unpaid-sales/{customer_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["sales"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_method_rejected() {
    let app = test_app().await;
    let customer_id = create_customer(&app, "Asha Traders").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/vouchers/receipt",
        Some(json!({
            "party_id": customer_id,
            "amount": 100,
            "method": "Sideways"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_against_ref_without_reference_rejected() {
    let app = test_app().await;
    let customer_id = create_customer(&app, "Asha Traders").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/vouchers/receipt",
        Some(json!({
            "party_id": customer_id,
            "amount": 100,
            "method": "Agst Ref"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_supplier_advance_listed_as_unused() {
    let app = test_app().await;
    let supplier_id = create_supplier(&app, "Mehta & Sons").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/vouchers/payment",
        Some(json!({
            "party_id": supplier_id,
            "amount": 200,
            "method": "Advance"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/vouchers/unused-advances/supplier/{supplier_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let advances = body["advances"].as_array().unwrap();
    assert_eq!(advances.len(), 1);
    assert_eq!(dec(&advances[0]["remaining_advance"]), dec!(200));
}

#[tokio::test]
async fn test_unknown_advance_entity_rejected() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/vouchers/unused-advances/vendor/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}
