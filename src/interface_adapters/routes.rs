use crate::interface_adapters::handlers::api::{
    get_album, get_playlist, list_playlist_tracks, list_playlists, recently_played,
    saved_albums, saved_shows, saved_tracks, start_playback, transfer_playback,
};
use crate::interface_adapters::handlers::auth::{callback, login, refresh_token};
use crate::interface_adapters::handlers::system::{api_not_found, health};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{any, get, post, put},
};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    // Wire the broker and proxy routes to their handlers.
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/refresh_token", post(refresh_token))
        .route("/health", get(health))
        .route("/api/playlists", get(list_playlists))
        .route("/api/playlists/{id}", get(get_playlist))
        .route("/api/playlists/{id}/tracks", get(list_playlist_tracks))
        .route("/api/library/tracks", get(saved_tracks))
        .route("/api/library/albums", get(saved_albums))
        .route("/api/library/shows", get(saved_shows))
        .route("/api/albums/{id}", get(get_album))
        .route("/api/player/recently-played", get(recently_played))
        .route("/api/playback/transfer", put(transfer_playback))
        .route("/api/playback/play", put(start_playback))
        .route("/api/{*rest}", any(api_not_found))
        .route("/login/{*rest}", any(api_not_found))
        .route("/callback/{*rest}", any(api_not_found))
        .route("/refresh_token/{*rest}", any(api_not_found))
        .with_state(state)
}
