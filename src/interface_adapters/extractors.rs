use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
};

use crate::domain::entities::BearerToken;
use crate::interface_adapters::protocol::ErrorResponse;

// Bearer token from the `Authorization` header.
// Rejects with 401 `missing_token` before any handler logic runs.
pub struct Bearer(pub BearerToken);

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(BearerToken::from_header)
            .map(Bearer)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::code("missing_token")),
                )
            })
    }
}
