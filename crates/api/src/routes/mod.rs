//! API route definitions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use khata_shared::AppError;

use crate::AppState;
use axum::Router;

pub mod health;
pub mod parties;
pub mod purchases;
pub mod sales;
pub mod vouchers;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(parties::routes())
        .merge(sales::routes())
        .merge(purchases::routes())
        .merge(vouchers::routes())
}

/// Renders an [`AppError`] as a JSON error response.
///
/// Server-side errors are logged and answered with a generic message so
/// database details never leak to clients.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if status.is_server_error() {
        error!(error = %err, "Request failed");
        "An error occurred".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": message
        })),
    )
        .into_response()
}
