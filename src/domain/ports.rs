use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::entities::{BearerToken, TokenPair};
use crate::domain::errors::UpstreamError;
use crate::domain::operations::UpstreamRequest;

// Errors from the provider token endpoint.
#[derive(Debug)]
pub enum TokenEndpointError {
    // Non-success HTTP status from the provider.
    Rejected { status: u16 },
    Transport(String),
}

// Port for the provider OAuth token endpoint.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    // `authorization_code` grant.
    async fn exchange_code(&self, code: &str) -> Result<TokenPair, TokenEndpointError>;
    // `refresh_token` grant.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenEndpointError>;
}

// Port for the provider REST API.
#[async_trait]
pub trait WebApi: Send + Sync {
    // Returns the parsed body on success; an unparsable success body is `{}`.
    async fn send(&self, token: &BearerToken, request: UpstreamRequest)
    -> Result<Value, UpstreamError>;
}

// Port for anti-forgery state generation.
pub trait StateGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[async_trait]
impl<T: TokenEndpoint + ?Sized> TokenEndpoint for Arc<T> {
    async fn exchange_code(&self, code: &str) -> Result<TokenPair, TokenEndpointError> {
        (**self).exchange_code(code).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenEndpointError> {
        (**self).refresh(refresh_token).await
    }
}

#[async_trait]
impl<T: WebApi + ?Sized> WebApi for Arc<T> {
    async fn send(
        &self,
        token: &BearerToken,
        request: UpstreamRequest,
    ) -> Result<Value, UpstreamError> {
        (**self).send(token, request).await
    }
}

impl<T: StateGenerator + ?Sized> StateGenerator for Arc<T> {
    fn generate(&self) -> String {
        (**self).generate()
    }
}
