use axum::{
    Json,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use crate::domain::entities::BearerToken;
use crate::domain::errors::ApiError;
use crate::domain::operations::{PlaybackStart, ProxyOperation, ProxyRequest};
use crate::domain::pagination::{self, Page, PageLimits};
use crate::interface_adapters::extractors::Bearer;
use crate::interface_adapters::protocol::{
    ErrorResponse, PageQuery, RecentlyPlayedQuery, StartPlaybackRequest,
    TransferPlaybackRequest,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::ProxyUseCase;

type ApiResult = Result<Json<Value>, (StatusCode, Json<ErrorResponse>)>;

#[tracing::instrument(name = "list_playlists", skip_all)]
pub async fn list_playlists(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    RawQuery(query): RawQuery,
) -> ApiResult {
    let page = page(query.as_deref(), pagination::PLAYLISTS);
    forward(&state, token, Ok(ProxyOperation::ListPlaylists(page))).await
}

#[tracing::instrument(name = "get_playlist", skip_all)]
pub async fn get_playlist(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    Path(id): Path<String>,
) -> ApiResult {
    forward(&state, token, ProxyOperation::get_playlist(id)).await
}

#[tracing::instrument(name = "list_playlist_tracks", skip_all)]
pub async fn list_playlist_tracks(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult {
    let page = page(query.as_deref(), pagination::PLAYLIST_TRACKS);
    forward(&state, token, Ok(ProxyOperation::ListPlaylistTracks { id, page })).await
}

#[tracing::instrument(name = "saved_tracks", skip_all)]
pub async fn saved_tracks(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    RawQuery(query): RawQuery,
) -> ApiResult {
    let page = page(query.as_deref(), pagination::SAVED_TRACKS);
    forward(&state, token, Ok(ProxyOperation::SavedTracks(page))).await
}

#[tracing::instrument(name = "saved_albums", skip_all)]
pub async fn saved_albums(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    RawQuery(query): RawQuery,
) -> ApiResult {
    let page = page(query.as_deref(), pagination::SAVED_ALBUMS);
    forward(&state, token, Ok(ProxyOperation::SavedAlbums(page))).await
}

#[tracing::instrument(name = "saved_shows", skip_all)]
pub async fn saved_shows(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    RawQuery(query): RawQuery,
) -> ApiResult {
    let page = page(query.as_deref(), pagination::SAVED_SHOWS);
    forward(&state, token, Ok(ProxyOperation::SavedShows(page))).await
}

#[tracing::instrument(name = "get_album", skip_all)]
pub async fn get_album(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    Path(id): Path<String>,
) -> ApiResult {
    forward(&state, token, Ok(ProxyOperation::GetAlbum { id })).await
}

#[tracing::instrument(name = "recently_played", skip_all)]
pub async fn recently_played(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    RawQuery(query): RawQuery,
) -> ApiResult {
    let query = RecentlyPlayedQuery::parse(query.as_deref());
    let operation =
        ProxyOperation::recently_played(query.limit.as_deref(), query.before, query.after);
    forward(&state, token, Ok(operation)).await
}

#[tracing::instrument(name = "transfer_playback", skip_all)]
pub async fn transfer_playback(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    body: Bytes,
) -> ApiResult {
    let payload = TransferPlaybackRequest::from_body(&body);
    let operation = ProxyOperation::transfer_playback(payload.device_id, payload.play);
    forward(&state, token, operation).await
}

#[tracing::instrument(name = "start_playback", skip_all)]
pub async fn start_playback(
    State(state): State<Arc<AppState>>,
    Bearer(token): Bearer,
    body: Bytes,
) -> ApiResult {
    let payload = StartPlaybackRequest::from_body(&body);
    let start = PlaybackStart {
        context_uri: payload.context_uri,
        uris: payload.uris,
        offset: payload.offset,
    };
    let operation = ProxyOperation::start_playback(payload.device_id, start);
    forward(&state, token, operation).await
}

// Repeated keys keep their first value; bad values fall back to the defaults.
fn page(raw_query: Option<&str>, limits: PageLimits) -> Page {
    let query = PageQuery::parse(raw_query);
    Page::normalize(query.limit.as_deref(), query.offset.as_deref(), limits)
}

// Run a validated operation through the proxy, or reject it before any upstream call.
async fn forward(
    state: &AppState,
    token: BearerToken,
    operation: Result<ProxyOperation, ApiError>,
) -> ApiResult {
    let operation = operation.map_err(|err| {
        tracing::warn!(error = %err, "request rejected");
        map_api_error(err)
    })?;
    let name = operation.name();

    let use_case = ProxyUseCase {
        api: state.api.clone(),
    };

    let body = use_case
        .execute(ProxyRequest { token, operation })
        .await
        .map_err(|err| {
            match &err {
                ApiError::Transport(_) => tracing::error!(operation = name, error = %err, "upstream unreachable"),
                _ => tracing::warn!(operation = name, error = %err, "upstream call failed"),
            }
            map_api_error(err)
        })?;

    tracing::debug!(operation = name, "upstream call succeeded");
    Ok(Json(body))
}

// Maps proxy errors to HTTP responses. Upstream statuses pass through unchanged.
fn map_api_error(err: ApiError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        ApiError::InvalidPlaylistId => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::code("Invalid playlist ID format")),
        ),
        ApiError::DeviceIdRequired => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::code("device_id_required")),
        ),
        ApiError::Upstream(err) => (
            StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(ErrorResponse {
                error: err.message,
                message: err.hint,
                details: Some(err.details),
            }),
        ),
        ApiError::Transport(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::code("server_error")),
        ),
    }
}
