// Framework bootstrap for the broker runtime.

use crate::frameworks::config::Config;
use crate::interface_adapters::clients::{AccountsClient, WebApiClient};
use crate::interface_adapters::handlers::system::{api_not_found, is_reserved_path};
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, RandomStateGenerator};
use crate::use_cases::AuthorizeSettings;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header},
    response::{IntoResponse, Response},
};
use std::{io::Result, net::SocketAddr, sync::Arc};
use tower::ServiceExt;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serve the broker on an already-bound listener.
pub async fn run(listener: tokio::net::TcpListener, config: Config) -> Result<()> {
    let address = listener.local_addr()?;
    let app = build_app(&config)?;

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        std::io::Error::other(e)
    })?;
    tracing::debug!(?config, "configuration loaded");

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, config).await
}

fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let tokens = AccountsClient::new(
        config.token_url.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
        config.redirect_uri.clone(),
        config.upstream_timeout,
    )
    .map_err(|e| std::io::Error::other(format!("failed to initialize accounts client: {e}")))?;
    let api = WebApiClient::new(config.api_url.clone(), config.upstream_timeout)
        .map_err(|e| std::io::Error::other(format!("failed to initialize api client: {e}")))?;
    tracing::debug!(
        token_url = %config.token_url,
        api_url = %config.api_url,
        upstream_timeout_ms = config.upstream_timeout.as_millis(),
        "provider clients configured"
    );

    Ok(Arc::new(AppState {
        authorize: AuthorizeSettings {
            authorize_url: config.authorize_url.clone(),
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
        },
        frontend_url: config.frontend_url.clone(),
        tokens: Arc::new(tokens),
        api: Arc::new(api),
        state_generator: Arc::new(RandomStateGenerator),
    }))
}

// Broker prefixes keep their JSON 404 even when a UI is mounted.
async fn serve_ui(ui: ServeDir<ServeFile>, request: Request) -> Response {
    if is_reserved_path(request.uri().path()) {
        return api_not_found().await.into_response();
    }
    match ui.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn build_app(config: &Config) -> Result<Router> {
    let state = build_state(config)?;
    let mut app = routes::app(state);

    // Unmatched non-API paths fall back to the built UI and its index page.
    if let Some(dir) = &config.static_dir {
        if !dir.join("index.html").is_file() {
            tracing::warn!(static_dir = %dir.display(), "index.html not found in static dir");
        }
        tracing::info!(static_dir = %dir.display(), "serving static UI");
        let ui = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        app = app.fallback(move |request: Request| serve_ui(ui.clone(), request));
    }

    let origin = HeaderValue::from_str(&config.client_origin).map_err(|e| {
        std::io::Error::other(format!("client origin is not a valid header value: {e}"))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Ok(app.layer(cors))
}
