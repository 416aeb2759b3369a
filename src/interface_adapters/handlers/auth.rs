use axum::{
    Json,
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::form_urlencoded;

use crate::domain::errors::AuthError;
use crate::interface_adapters::cookies::{
    STATE_COOKIE, cleared_state_cookie, read_cookie, state_cookie,
};
use crate::interface_adapters::protocol::{
    ErrorResponse, RefreshTokenRequest, RefreshTokenResponse, callback_params,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{BeginLoginUseCase, HandleCallbackUseCase, RefreshTokenUseCase};

// Handler that starts the authorization-code flow.
#[tracing::instrument(name = "login", skip_all)]
pub async fn login(State(state): State<Arc<AppState>>) -> Response {
    let use_case = BeginLoginUseCase {
        generator: state.state_generator.clone(),
        settings: state.authorize.clone(),
    };

    let redirect = use_case.execute();
    tracing::info!("redirecting to provider consent screen");

    found(
        redirect.location.as_str(),
        Some(state_cookie(&redirect.state)),
    )
}

// Handler for the provider redirect back to us.
#[tracing::instrument(name = "callback", skip_all)]
pub async fn callback(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let params = callback_params(query.as_deref());
    let stored_state = read_cookie(&headers, STATE_COOKIE);
    let use_case = HandleCallbackUseCase {
        tokens: state.tokens.clone(),
    };

    let result = use_case.execute(params, stored_state.as_deref()).await;

    match result {
        Ok(pair) => {
            tracing::info!("authorization code exchanged");
            let mut fragment = vec![("access_token", pair.access_token.as_str())];
            if let Some(refresh_token) = pair.refresh_token.as_deref() {
                fragment.push(("refresh_token", refresh_token));
            }
            found(
                &landing_url(&state.frontend_url, &fragment),
                Some(cleared_state_cookie()),
            )
        }
        // A mismatch leaves the cookie alone.
        Err(AuthError::StateMismatch) => {
            tracing::warn!(has_cookie = stored_state.is_some(), "callback state mismatch");
            found(
                &landing_url(&state.frontend_url, &[("error", "state_mismatch")]),
                None,
            )
        }
        Err(err) => {
            let code = callback_error_code(&err);
            match &err {
                AuthError::Transport(_) => tracing::error!(error = %err, "code exchange failed"),
                _ => tracing::warn!(error = %err, "code exchange refused"),
            }
            found(
                &landing_url(&state.frontend_url, &[("error", code.as_str())]),
                Some(cleared_state_cookie()),
            )
        }
    }
}

// Handler for exchanging a refresh token for a new access token.
#[tracing::instrument(name = "refresh_token", skip_all)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RefreshTokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    let payload = RefreshTokenRequest::from_body(&body);
    let use_case = RefreshTokenUseCase {
        tokens: state.tokens.clone(),
    };

    let result = use_case.execute(payload.refresh_token).await.map_err(|err| {
        match &err {
            AuthError::Transport(_) => tracing::error!(error = %err, "token refresh failed"),
            _ => tracing::warn!(error = %err, "token refresh refused"),
        }
        map_refresh_error(err)
    })?;

    Ok(Json(RefreshTokenResponse {
        access_token: result.access_token,
    }))
}

// Fragment error code for a failed callback. Raw provider errors never reach the browser bar,
// except the provider's own consent-denial code.
fn callback_error_code(err: &AuthError) -> String {
    match err {
        AuthError::StateMismatch => "state_mismatch".to_string(),
        AuthError::MissingCode {
            provider_error: Some(error),
        } => error.clone(),
        AuthError::MissingCode {
            provider_error: None,
        }
        | AuthError::MissingRefreshToken
        | AuthError::TokenRejected { .. } => "invalid_token".to_string(),
        AuthError::Transport(_) => "server_error".to_string(),
    }
}

fn map_refresh_error(err: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        AuthError::Transport(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::code("server_error")),
        ),
        AuthError::TokenRejected { .. }
        | AuthError::MissingRefreshToken
        | AuthError::MissingCode { .. }
        | AuthError::StateMismatch => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::code("invalid_grant")),
        ),
    }
}

// Landing page URL with values in the fragment, never the query string.
fn landing_url(frontend_url: &str, fragment: &[(&str, &str)]) -> String {
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fragment)
        .finish();
    format!("{}/#{}", frontend_url.trim_end_matches('/'), encoded)
}

fn found(location: &str, set_cookie: Option<String>) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();
    match location.parse::<HeaderValue>() {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        Err(_) => {
            tracing::error!("redirect location is not a valid header value");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    if let Some(cookie) = set_cookie.and_then(|cookie| cookie.parse::<HeaderValue>().ok()) {
        headers.insert(header::SET_COOKIE, cookie);
    }
    response
}
