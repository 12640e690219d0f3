//! Response construction.
//!
//! # Responsibilities
//! - Build JSON responses with an explicit status
//! - Provide the fixed not-found and generic error bodies
//! - Map status codes to reason phrases
//!
//! # Design Decisions
//! - The not-found body spells its flag `sucess`; clients already parse that
//!   key, so it stays as is. Error bodies use `success`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// Serialize `body` as JSON with the given status.
pub fn json<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

/// Canonical reason phrase for a status code.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown Status")
}

/// Response returned when no route matches `{method, path}`.
pub fn not_found() -> Response {
    json(
        StatusCode::NOT_FOUND,
        json!({ "sucess": false, "message": "Not Found" }),
    )
}

/// Generic error body for `status`, tagged with the request path.
pub fn error_response(status: StatusCode, path: &str) -> Response {
    json(
        status,
        json!({
            "success": false,
            "message": reason_phrase(status),
            "path": path,
        }),
    )
}

/// Built-in fallback when neither the route nor the router has an error handler.
pub fn internal_error(path: &str) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, path)
}
