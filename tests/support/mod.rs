// Shared harness: a fake provider and a broker pointed at it, both on ephemeral ports.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use url::form_urlencoded;

// One request as the fake provider received it.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    // Path plus query, exactly as sent.
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone)]
pub struct FakeProvider {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeProvider {
    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub fn calls_to(&self, path_prefix: &str) -> Vec<RecordedRequest> {
        self.calls()
            .into_iter()
            .filter(|call| call.uri.starts_with(path_prefix))
            .collect()
    }
}

// Start the fake accounts + REST provider on the current runtime.
pub async fn spawn_provider() -> FakeProvider {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(provider).with_state(calls.clone());

    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral provider port");
    let addr = listener.local_addr().expect("get provider addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("provider failed");
    });

    FakeProvider {
        base_url: format!("http://{addr}"),
        calls,
    }
}

// Start the broker against `provider_base` and return its base URL.
pub async fn spawn_broker(provider_base: &str) -> String {
    let env: HashMap<&str, String> = HashMap::from([
        ("SPOTIFY_CLIENT_ID", "client-id".to_string()),
        ("SPOTIFY_CLIENT_SECRET", "client-secret".to_string()),
        (
            "SPOTIFY_REDIRECT_URI",
            "http://127.0.0.1:3001/callback".to_string(),
        ),
        ("FRONTEND_URL", "http://127.0.0.1:3000".to_string()),
        ("SPOTIFY_ACCOUNTS_URL", provider_base.to_string()),
        ("SPOTIFY_API_URL", format!("{provider_base}/v1")),
        ("UPSTREAM_TIMEOUT_MS", "2000".to_string()),
    ]);
    let config = broker_server::Config::from_sources(None, |key| env.get(key).cloned())
        .expect("test config should be valid");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral broker port");
    let addr = listener.local_addr().expect("get broker addr");
    tokio::spawn(async move {
        broker_server::run(listener, config).await.expect("broker failed");
    });

    format!("http://{addr}")
}

// Base URL of a port nothing listens on.
pub async fn unreachable_base() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get addr");
    drop(listener);
    format!("http://{addr}")
}

// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build test client")
}

async fn provider(
    State(calls): State<Arc<Mutex<Vec<RecordedRequest>>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    calls.lock().expect("calls mutex poisoned").push(RecordedRequest {
        method: method.to_string(),
        uri: uri.to_string(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.clone(),
    });

    match (method.as_str(), uri.path()) {
        ("POST", "/api/token") => token_endpoint(&body),
        ("GET", "/v1/me/playlists") => Json(json!({
            "items": [{ "id": "37i9dQZF1DXcBWIGoYBM5M", "name": "Focus" }],
            "next": null,
            "total": 1
        }))
        .into_response(),
        ("GET", "/v1/me/tracks") => Json(json!({ "items": [], "total": 0 })).into_response(),
        ("GET", "/v1/me/player/recently-played") => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "status": 404, "message": "Insufficient client scope" } })),
        )
            .into_response(),
        ("GET", "/v1/albums/expired") => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
        )
            .into_response(),
        ("PUT", "/v1/me/player") | ("PUT", "/v1/me/player/play") => {
            StatusCode::NO_CONTENT.into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "status": 404, "message": "Service not found" } })),
        )
            .into_response(),
    }
}

fn token_endpoint(body: &str) -> Response {
    let form: HashMap<String, String> = form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();

    let granted = match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") if form.get("code").map(String::as_str) == Some("good-code") => {
            Some(json!({
                "access_token": "access-1",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-1",
                "scope": "streaming"
            }))
        }
        Some("refresh_token") if form.get("refresh_token").map(String::as_str) == Some("refresh-1") => {
            Some(json!({
                "access_token": "access-2",
                "token_type": "Bearer",
                "expires_in": 3600
            }))
        }
        _ => None,
    };

    match granted {
        Some(body) => Json(body).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid grant" })),
        )
            .into_response(),
    }
}
