use serde_json::{Map, Value, json};

use crate::domain::entities::BearerToken;
use crate::domain::errors::ApiError;
use crate::domain::pagination::{self, Page};

// Provider playlist ids are base62 and always this long.
pub const PLAYLIST_ID_LENGTH: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
}

// One call against the provider REST API, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: HttpMethod,
    // Path segments, encoded individually when the URL is built.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    fn get(segments: &[&str]) -> Self {
        Self {
            method: HttpMethod::Get,
            segments: segments.iter().map(|segment| segment.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    fn put(segments: &[&str], body: Value) -> Self {
        Self {
            method: HttpMethod::Put,
            body: Some(body),
            ..Self::get(segments)
        }
    }

    fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    fn with_page(self, page: Page) -> Self {
        self.with_query("limit", page.limit)
            .with_query("offset", page.offset)
    }

    // Path relative to the API base, for logs and tests.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

// Fields a caller may send to start playback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackStart {
    pub context_uri: Option<String>,
    pub uris: Option<Vec<Value>>,
    pub offset: Option<Value>,
}

// The fixed set of logical operations the proxy forwards.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyOperation {
    ListPlaylists(Page),
    GetPlaylist {
        id: String,
    },
    ListPlaylistTracks {
        id: String,
        page: Page,
    },
    SavedTracks(Page),
    SavedAlbums(Page),
    SavedShows(Page),
    GetAlbum {
        id: String,
    },
    RecentlyPlayed {
        limit: u32,
        before: Option<String>,
        after: Option<String>,
    },
    TransferPlayback {
        device_id: String,
        play: bool,
    },
    StartPlayback {
        device_id: String,
        start: PlaybackStart,
    },
}

impl ProxyOperation {
    pub fn get_playlist(id: impl Into<String>) -> Result<Self, ApiError> {
        let id = id.into();
        if id.chars().count() != PLAYLIST_ID_LENGTH {
            return Err(ApiError::InvalidPlaylistId);
        }
        Ok(ProxyOperation::GetPlaylist { id })
    }

    pub fn recently_played(
        limit: Option<&str>,
        before: Option<String>,
        after: Option<String>,
    ) -> Self {
        ProxyOperation::RecentlyPlayed {
            limit: pagination::normalize_limit(limit, pagination::RECENTLY_PLAYED),
            before: before.filter(|cursor| !cursor.is_empty()),
            after: after.filter(|cursor| !cursor.is_empty()),
        }
    }

    pub fn transfer_playback(device_id: Option<String>, play: Option<bool>) -> Result<Self, ApiError> {
        Ok(ProxyOperation::TransferPlayback {
            device_id: require_device_id(device_id)?,
            play: play.unwrap_or(true),
        })
    }

    pub fn start_playback(device_id: Option<String>, start: PlaybackStart) -> Result<Self, ApiError> {
        Ok(ProxyOperation::StartPlayback {
            device_id: require_device_id(device_id)?,
            start,
        })
    }

    // Stable operation name for spans and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ProxyOperation::ListPlaylists(_) => "list_playlists",
            ProxyOperation::GetPlaylist { .. } => "get_playlist",
            ProxyOperation::ListPlaylistTracks { .. } => "list_playlist_tracks",
            ProxyOperation::SavedTracks(_) => "saved_tracks",
            ProxyOperation::SavedAlbums(_) => "saved_albums",
            ProxyOperation::SavedShows(_) => "saved_shows",
            ProxyOperation::GetAlbum { .. } => "get_album",
            ProxyOperation::RecentlyPlayed { .. } => "recently_played",
            ProxyOperation::TransferPlayback { .. } => "transfer_playback",
            ProxyOperation::StartPlayback { .. } => "start_playback",
        }
    }

    // Whether the caller gets `{ok: true}` instead of the upstream body.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            ProxyOperation::TransferPlayback { .. } | ProxyOperation::StartPlayback { .. }
        )
    }

    pub fn upstream_request(&self) -> UpstreamRequest {
        match self {
            ProxyOperation::ListPlaylists(page) => {
                UpstreamRequest::get(&["me", "playlists"]).with_page(*page)
            }
            ProxyOperation::GetPlaylist { id } => UpstreamRequest::get(&["playlists", id.as_str()]),
            ProxyOperation::ListPlaylistTracks { id, page } => {
                UpstreamRequest::get(&["playlists", id.as_str(), "tracks"]).with_page(*page)
            }
            ProxyOperation::SavedTracks(page) => {
                UpstreamRequest::get(&["me", "tracks"]).with_page(*page)
            }
            ProxyOperation::SavedAlbums(page) => {
                UpstreamRequest::get(&["me", "albums"]).with_page(*page)
            }
            ProxyOperation::SavedShows(page) => {
                UpstreamRequest::get(&["me", "shows"]).with_page(*page)
            }
            ProxyOperation::GetAlbum { id } => UpstreamRequest::get(&["albums", id.as_str()]),
            ProxyOperation::RecentlyPlayed {
                limit,
                before,
                after,
            } => {
                let mut request =
                    UpstreamRequest::get(&["me", "player", "recently-played"]).with_query("limit", limit);
                if let Some(before) = before {
                    request = request.with_query("before", before);
                }
                if let Some(after) = after {
                    request = request.with_query("after", after);
                }
                request
            }
            ProxyOperation::TransferPlayback { device_id, play } => UpstreamRequest::put(
                &["me", "player"],
                json!({ "device_ids": [device_id], "play": play }),
            ),
            ProxyOperation::StartPlayback { device_id, start } => {
                let mut body = Map::new();
                if let Some(context_uri) = &start.context_uri {
                    body.insert("context_uri".to_string(), Value::String(context_uri.clone()));
                }
                if let Some(uris) = &start.uris {
                    body.insert("uris".to_string(), Value::Array(uris.clone()));
                }
                if let Some(offset) = &start.offset {
                    body.insert("offset".to_string(), offset.clone());
                }
                UpstreamRequest::put(&["me", "player", "play"], Value::Object(body))
                    .with_query("device_id", device_id)
            }
        }
    }
}

fn require_device_id(device_id: Option<String>) -> Result<String, ApiError> {
    device_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::DeviceIdRequired)
}

// A logical operation together with the credential it runs under.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub token: BearerToken,
    pub operation: ProxyOperation,
}
