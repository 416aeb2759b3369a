use axum::http::{HeaderMap, header};

pub const STATE_COOKIE: &str = "spotify_auth_state";

// The state only has to survive one trip through the consent screen.
const STATE_COOKIE_MAX_AGE_SECONDS: u64 = 600;

// Read one cookie value from every `Cookie` header on the request.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

pub fn state_cookie(state: &str) -> String {
    format!(
        "{STATE_COOKIE}={state}; Path=/; HttpOnly; SameSite=Lax; Max-Age={STATE_COOKIE_MAX_AGE_SECONDS}"
    )
}

pub fn cleared_state_cookie() -> String {
    format!("{STATE_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
