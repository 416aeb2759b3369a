use serde::Deserialize;
use std::fmt;

// Length of the anti-forgery state issued per login attempt.
pub const STATE_LENGTH: usize = 16;

// Permissions requested on every login. Consent is forced each time, so
// changing this list takes effect on the next login.
pub const REQUESTED_SCOPES: &[&str] = &[
    "streaming",
    "user-read-private",
    "user-read-email",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "playlist-read-private",
    "playlist-read-collaborative",
    "user-library-read",
    "user-read-recently-played",
];

// Tokens returned by the provider token endpoint.
// The server never stores these; they are handed to the client as-is.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    // Absent on most refresh responses.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

// Query values the provider appends to the redirect back to `/callback`.
#[derive(Debug, Default, Clone)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    // Set by the provider when the user declines consent.
    pub error: Option<String>,
}

// Access token presented by the caller. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    // Extract the token from an `Authorization` header value.
    // The scheme match is case-insensitive; an empty token counts as missing.
    pub fn from_header(value: &str) -> Option<Self> {
        let scheme = value.get(..7)?;
        if !scheme.eq_ignore_ascii_case("bearer ") {
            return None;
        }
        let token = &value[7..];
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}
