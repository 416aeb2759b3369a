use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

use crate::domain::entities::BearerToken;
use crate::domain::errors::{ProxyError, UpstreamError};
use crate::domain::operations::{HttpMethod, UpstreamRequest};
use crate::domain::ports::WebApi;

// Thin reqwest client for the provider REST API.
#[derive(Clone)]
pub struct WebApiClient {
    http: Client,
    base_url: Url,
}

impl WebApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    // Append encoded path segments and query pairs to the base URL.
    pub fn url_for(&self, request: &UpstreamRequest) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Transport("api base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(&request.segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait]
impl WebApi for WebApiClient {
    async fn send(
        &self,
        token: &BearerToken,
        request: UpstreamRequest,
    ) -> Result<Value, UpstreamError> {
        let url = self.url_for(&request)?;
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Put => Method::PUT,
        };

        let mut builder = self.http.request(method, url).bearer_auth(token.as_str());
        if let Some(body) = &request.body {
            // `json` also sets the JSON content type.
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        // A malformed or empty body never fails the call on its own.
        let body = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| json!({}));

        if !status.is_success() {
            let err = ProxyError::from_upstream(status.as_u16(), status.canonical_reason(), body);
            tracing::warn!(
                status = err.status,
                message = %err.message,
                path = %request.path(),
                "provider api error"
            );
            return Err(UpstreamError::Rejected(err));
        }

        Ok(body)
    }
}
