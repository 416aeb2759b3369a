use serde::Deserialize;
use std::{fmt, path::PathBuf, time::Duration};
use url::Url;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:3000/callback";
const DEFAULT_CLIENT_ORIGIN: &str = "http://127.0.0.1:3000";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 10_000;

// Env var naming an optional TOML file with the same keys as `FileConfig`.
pub const CONFIG_FILE_ENV: &str = "BROKER_CONFIG";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
    File { path: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: {value:?}"),
            ConfigError::File { path, reason } => {
                write!(f, "failed to read config file {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// Keys accepted in the TOML config file. Environment variables win over these.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub client_origin: Option<String>,
    pub frontend_url: Option<String>,
    pub accounts_url: Option<String>,
    pub api_url: Option<String>,
    pub upstream_timeout_ms: Option<u64>,
    pub static_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

// Process configuration, built once at startup and handed to the server.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    // Origin allowed to call the API cross-origin.
    pub client_origin: String,
    // Landing page that receives the token fragment.
    pub frontend_url: String,
    pub authorize_url: Url,
    pub token_url: Url,
    pub api_url: Url,
    pub upstream_timeout: Duration,
    // Built single-page UI, served for unmatched paths when set.
    pub static_dir: Option<PathBuf>,
}

impl Config {
    // Read the optional config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.is_empty() => Some(read_file(&path)?),
            _ => None,
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(file: Option<FileConfig>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let port = match lookup("PORT") {
            Some(value) => parse_number("PORT", &value)?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };
        let client_id = lookup("SPOTIFY_CLIENT_ID")
            .or(file.client_id)
            .ok_or(ConfigError::Missing("SPOTIFY_CLIENT_ID"))?;
        let client_secret = lookup("SPOTIFY_CLIENT_SECRET")
            .or(file.client_secret)
            .ok_or(ConfigError::Missing("SPOTIFY_CLIENT_SECRET"))?;
        let redirect_uri = lookup("SPOTIFY_REDIRECT_URI")
            .or(file.redirect_uri)
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        let client_origin = lookup("CLIENT_ORIGIN")
            .or(file.client_origin)
            .unwrap_or_else(|| DEFAULT_CLIENT_ORIGIN.to_string());
        let frontend_url = lookup("FRONTEND_URL")
            .or(file.frontend_url)
            .unwrap_or_else(|| client_origin.clone());
        let accounts_url = lookup("SPOTIFY_ACCOUNTS_URL")
            .or(file.accounts_url)
            .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string());
        let api_url = lookup("SPOTIFY_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let upstream_timeout_ms = match lookup("UPSTREAM_TIMEOUT_MS") {
            Some(value) => parse_number("UPSTREAM_TIMEOUT_MS", &value)?,
            None => file.upstream_timeout_ms.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_MS),
        };
        let static_dir = lookup("STATIC_DIR").map(PathBuf::from).or(file.static_dir);

        parse_http_url("SPOTIFY_REDIRECT_URI", &redirect_uri)?;
        parse_http_url("CLIENT_ORIGIN", &client_origin)?;
        parse_http_url("FRONTEND_URL", &frontend_url)?;
        let accounts_base = parse_http_url("SPOTIFY_ACCOUNTS_URL", &accounts_url)?;

        Ok(Self {
            port,
            client_id,
            client_secret,
            redirect_uri,
            client_origin,
            frontend_url,
            authorize_url: endpoint(&accounts_base, &["authorize"]),
            token_url: endpoint(&accounts_base, &["api", "token"]),
            api_url: parse_http_url("SPOTIFY_API_URL", &api_url)?,
            upstream_timeout: Duration::from_millis(upstream_timeout_ms),
            static_dir,
        })
    }
}

// Keeps the client secret out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("client_origin", &self.client_origin)
            .field("frontend_url", &self.frontend_url)
            .field("authorize_url", &self.authorize_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("api_url", &self.api_url.as_str())
            .field("upstream_timeout", &self.upstream_timeout)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

fn read_file(path: &str) -> Result<FileConfig, ConfigError> {
    let source = std::fs::read_to_string(path).map_err(|err| ConfigError::File {
        path: path.to_string(),
        reason: err.to_string(),
    })?;
    FileConfig::parse(&source).map_err(|err| ConfigError::File {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_http_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

// Append path segments to an http(s) base, dropping a trailing empty segment.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SPOTIFY_CLIENT_ID", "client-123"),
            ("SPOTIFY_CLIENT_SECRET", "secret-456"),
        ]
    }

    #[test]
    fn when_only_credentials_are_set_then_defaults_apply() {
        let config = Config::from_sources(None, env_from(&credentials())).expect("expected config");

        assert_eq!(config.port, 3001);
        assert_eq!(config.redirect_uri, "http://127.0.0.1:3000/callback");
        assert_eq!(config.frontend_url, "http://127.0.0.1:3000");
        assert_eq!(config.authorize_url.as_str(), "https://accounts.spotify.com/authorize");
        assert_eq!(config.token_url.as_str(), "https://accounts.spotify.com/api/token");
        assert_eq!(config.api_url.as_str(), "https://api.spotify.com/v1");
        assert_eq!(config.upstream_timeout, Duration::from_millis(10_000));
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn when_client_secret_is_missing_then_missing_error() {
        let result = Config::from_sources(None, env_from(&[("SPOTIFY_CLIENT_ID", "client-123")]));

        assert!(matches!(result, Err(ConfigError::Missing("SPOTIFY_CLIENT_SECRET"))));
    }

    #[test]
    fn when_frontend_url_is_unset_then_client_origin_is_used() {
        let mut pairs = credentials();
        pairs.push(("CLIENT_ORIGIN", "https://player.example.com"));

        let config = Config::from_sources(None, env_from(&pairs)).expect("expected config");

        assert_eq!(config.frontend_url, "https://player.example.com");
    }

    #[test]
    fn when_port_is_not_numeric_then_invalid_error() {
        let mut pairs = credentials();
        pairs.push(("PORT", "eighty"));

        let result = Config::from_sources(None, env_from(&pairs));

        assert!(matches!(result, Err(ConfigError::Invalid { key: "PORT", .. })));
    }

    #[test]
    fn when_accounts_url_is_not_http_then_invalid_error() {
        let mut pairs = credentials();
        pairs.push(("SPOTIFY_ACCOUNTS_URL", "mailto:someone@example.com"));

        let result = Config::from_sources(None, env_from(&pairs));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "SPOTIFY_ACCOUNTS_URL",
                ..
            })
        ));
    }

    #[test]
    fn when_file_and_env_both_set_a_key_then_env_wins() {
        let file = FileConfig::parse(
            r#"
            port = 4000
            client_id = "file-client"
            client_secret = "file-secret"
            accounts_url = "http://127.0.0.1:9000/"
            upstream_timeout_ms = 2500
            static_dir = "dist"
            "#,
        )
        .expect("expected toml to parse");

        let config = Config::from_sources(Some(file), env_from(&[("PORT", "5000")]))
            .expect("expected config");

        assert_eq!(config.port, 5000);
        assert_eq!(config.client_id, "file-client");
        assert_eq!(config.token_url.as_str(), "http://127.0.0.1:9000/api/token");
        assert_eq!(config.upstream_timeout, Duration::from_millis(2500));
        assert_eq!(config.static_dir, Some(PathBuf::from("dist")));
    }

    #[test]
    fn when_env_value_is_blank_then_it_is_ignored() {
        let mut pairs = credentials();
        pairs.push(("FRONTEND_URL", "  "));

        let config = Config::from_sources(None, env_from(&pairs)).expect("expected config");

        assert_eq!(config.frontend_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn when_file_has_unknown_key_then_parse_fails() {
        assert!(FileConfig::parse("listen = 1").is_err());
    }

    #[test]
    fn when_config_is_debug_printed_then_secret_is_hidden() {
        let config = Config::from_sources(None, env_from(&credentials())).expect("expected config");

        let printed = format!("{config:?}");

        assert!(!printed.contains("secret-456"));
        assert!(printed.contains("client-123"));
    }
}
