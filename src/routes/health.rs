use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::utils::time::now;

#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "timestamp": now(),
    });
    (StatusCode::OK, Json(body))
}

#[axum::debug_handler]
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to Codexa API",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": now(),
    }))
}
