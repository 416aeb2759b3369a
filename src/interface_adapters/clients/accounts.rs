use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Deserialize;
use std::time::Duration;
use url::{Url, form_urlencoded};

use crate::domain::entities::TokenPair;
use crate::domain::ports::{TokenEndpoint, TokenEndpointError};

// OAuth error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
}

// Thin reqwest client for the provider token endpoint.
// Authenticates with HTTP Basic client credentials on every grant.
#[derive(Clone)]
pub struct AccountsClient {
    http: Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl AccountsClient {
    pub fn new(
        token_url: Url,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            token_url,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        })
    }

    async fn grant(
        &self,
        grant_type: &str,
        params: &[(&str, &str)],
    ) -> Result<TokenPair, TokenEndpointError> {
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", grant_type)
            .extend_pairs(params)
            .finish();

        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|err| TokenEndpointError::Transport(err.to_string()))?;
        let status = response.status();

        // Keep the status so callers can tell a refused grant from an outage.
        if !status.is_success() {
            let error = response
                .json::<TokenErrorResponse>()
                .await
                .ok()
                .map(|payload| payload.error);
            tracing::warn!(%status, grant_type, error = ?error, "token endpoint refused grant");
            return Err(TokenEndpointError::Rejected {
                status: status.as_u16(),
            });
        }

        response
            .json::<TokenPair>()
            .await
            .map_err(|err| TokenEndpointError::Transport(format!("token response decode error: {err}")))
    }
}

#[async_trait]
impl TokenEndpoint for AccountsClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenPair, TokenEndpointError> {
        self.grant(
            "authorization_code",
            &[("code", code), ("redirect_uri", self.redirect_uri.as_str())],
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenEndpointError> {
        self.grant("refresh_token", &[("refresh_token", refresh_token)])
            .await
    }
}
