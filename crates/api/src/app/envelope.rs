//! The success half of the response envelope.
//!
//! Every success response is
//! `{ "success": true, "status": "success", "status_text": "success",
//!    "data": ..., "meta": { "pagination": ... }? }`.
//! List endpoints always carry an array `data` plus pagination meta with
//! integer fields.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use sitegate_core::Page;

pub fn success(data: Value) -> axum::response::Response {
    success_with_status(StatusCode::OK, data)
}

pub fn success_with_status(status: StatusCode, data: Value) -> axum::response::Response {
    (
        status,
        Json(json!({
            "success": true,
            "status": "success",
            "status_text": "success",
            "data": data,
        })),
    )
        .into_response()
}

/// Envelope a page: `data` is the row array, pagination rides in `meta`.
pub fn success_page<T: Serialize>(page: Page<T>) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "status": "success",
            "status_text": "success",
            "data": page.data,
            "meta": {
                "pagination": {
                    "page": page.page,
                    "per_page": page.per_page,
                    "total": page.total,
                    "last_page": page.last_page,
                }
            },
        })),
    )
        .into_response()
}
