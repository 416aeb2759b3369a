use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::domain::entities::CallbackParams;

// Decoded query string. Keys may repeat; lookups decide how to treat that.
#[derive(Debug, Default)]
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|raw| form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self(pairs)
    }

    // First value for `key`; later repeats are ignored.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    // Value for `key` only when it appears exactly once.
    pub fn single(&self, key: &str) -> Option<&str> {
        let mut values = self.0.iter().filter(|(name, _)| name == key);
        match (values.next(), values.next()) {
            (Some((_, value)), None) => Some(value.as_str()),
            _ => None,
        }
    }
}

// Pagination query accepted by list routes. Values stay raw until normalized.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = QueryPairs::parse(raw);
        Self {
            limit: pairs.first("limit").map(str::to_string),
            offset: pairs.first("offset").map(str::to_string),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecentlyPlayedQuery {
    pub limit: Option<String>,
    // Unix-millisecond cursors.
    pub before: Option<String>,
    pub after: Option<String>,
}

impl RecentlyPlayedQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = QueryPairs::parse(raw);
        Self {
            limit: pairs.first("limit").map(str::to_string),
            before: pairs.first("before").map(str::to_string),
            after: pairs.first("after").map(str::to_string),
        }
    }
}

// Provider redirect values. A repeated `state` is ambiguous and counts as absent.
pub fn callback_params(raw: Option<&str>) -> CallbackParams {
    let pairs = QueryPairs::parse(raw);
    CallbackParams {
        code: pairs.first("code").map(str::to_string),
        state: pairs.single("state").map(str::to_string),
        error: pairs.first("error").map(str::to_string),
    }
}

// Top-level fields of a JSON object body. Anything else reads as empty.
#[derive(Debug, Default)]
pub struct JsonFields(Map<String, Value>);

impl JsonFields {
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(Value::Object(fields)) => Self(fields),
            _ => Self::default(),
        }
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn array(&self, key: &str) -> Option<Vec<Value>> {
        self.0.get(key).and_then(Value::as_array).cloned()
    }

    // Any non-null value, forwarded untouched.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.0.get(key).filter(|value| !value.is_null()).cloned()
    }
}

// Request payload for token refresh.
#[derive(Debug, Default)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

impl RefreshTokenRequest {
    pub fn from_body(body: &[u8]) -> Self {
        Self {
            refresh_token: JsonFields::parse(body).string("refresh_token"),
        }
    }
}

// Response payload for token refresh.
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

// Each field is read on its own, so a mistyped `play` never hides `device_id`.
#[derive(Debug, Default)]
pub struct TransferPlaybackRequest {
    pub device_id: Option<String>,
    pub play: Option<bool>,
}

impl TransferPlaybackRequest {
    pub fn from_body(body: &[u8]) -> Self {
        let fields = JsonFields::parse(body);
        Self {
            device_id: fields.string("device_id"),
            play: fields.boolean("play"),
        }
    }
}

#[derive(Debug, Default)]
pub struct StartPlaybackRequest {
    pub device_id: Option<String>,
    // Non-empty strings only.
    pub context_uri: Option<String>,
    // Only a JSON array is kept.
    pub uris: Option<Vec<Value>>,
    pub offset: Option<Value>,
}

impl StartPlaybackRequest {
    pub fn from_body(body: &[u8]) -> Self {
        let fields = JsonFields::parse(body);
        Self {
            device_id: fields.string("device_id"),
            context_uri: fields.string("context_uri").filter(|uri| !uri.is_empty()),
            uris: fields.array("uris"),
            offset: fields.value("offset"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// Error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    // User-facing guidance, when a failure has been classified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn code(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            details: None,
        }
    }
}
