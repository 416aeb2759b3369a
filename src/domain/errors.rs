use serde_json::Value;
use std::fmt;

// Fallback when upstream gives neither a message nor a known status reason.
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Spotify API error";

// Failure reported by the provider REST API for one proxied call.
// `status` is carried through to the caller unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyError {
    pub status: u16,
    pub message: String,
    // Extra guidance for the end user, set by content-based remaps.
    pub hint: Option<String>,
    pub details: Value,
}

impl ProxyError {
    // Best-effort message: upstream `error.message`, else the status reason, else a generic label.
    pub fn from_upstream(status: u16, reason: Option<&str>, details: Value) -> Self {
        let message = details
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .or(reason)
            .unwrap_or(GENERIC_UPSTREAM_MESSAGE)
            .to_string();

        Self {
            status,
            message,
            hint: None,
            details,
        }
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream error {}: {}", self.status, self.message)
    }
}

impl std::error::Error for ProxyError {}

// Errors surfaced by the provider REST port.
#[derive(Debug)]
pub enum UpstreamError {
    Rejected(ProxyError),
    Transport(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Rejected(err) => write!(f, "{err}"),
            UpstreamError::Transport(reason) => write!(f, "upstream transport error: {reason}"),
        }
    }
}

impl std::error::Error for UpstreamError {}

// Errors raised by the proxy workflows.
#[derive(Debug)]
pub enum ApiError {
    InvalidPlaylistId,
    DeviceIdRequired,
    Upstream(ProxyError),
    Transport(String),
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Rejected(err) => ApiError::Upstream(err),
            UpstreamError::Transport(reason) => ApiError::Transport(reason),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidPlaylistId => f.write_str("invalid playlist id format"),
            ApiError::DeviceIdRequired => f.write_str("device_id is required"),
            ApiError::Upstream(err) => write!(f, "{err}"),
            ApiError::Transport(reason) => write!(f, "upstream transport error: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}

// Errors raised by the authorization-code and refresh workflows.
#[derive(Debug)]
pub enum AuthError {
    StateMismatch,
    // Callback passed state validation but carried no code.
    MissingCode { provider_error: Option<String> },
    MissingRefreshToken,
    TokenRejected { status: u16 },
    Transport(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::StateMismatch => f.write_str("state mismatch"),
            AuthError::MissingCode {
                provider_error: Some(error),
            } => write!(f, "authorization declined: {error}"),
            AuthError::MissingCode {
                provider_error: None,
            } => f.write_str("authorization code missing"),
            AuthError::MissingRefreshToken => f.write_str("refresh token missing"),
            AuthError::TokenRejected { status } => {
                write!(f, "token endpoint rejected the grant with {status}")
            }
            AuthError::Transport(reason) => write!(f, "token endpoint transport error: {reason}"),
        }
    }
}

impl std::error::Error for AuthError {}
