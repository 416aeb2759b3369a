use axum::{Json, http::StatusCode};

use crate::interface_adapters::protocol::{ErrorResponse, HealthResponse};

// Path prefixes owned by the broker; the UI never answers for them.
const RESERVED_PREFIXES: [&str; 4] = ["/api/", "/login", "/callback", "/refresh_token"];

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// Unknown broker paths answer JSON instead of falling through to the UI.
pub async fn api_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::code("Not found")))
}

pub fn is_reserved_path(path: &str) -> bool {
    RESERVED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}
