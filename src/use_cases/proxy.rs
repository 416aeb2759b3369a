use serde_json::{Value, json};

use crate::domain::classify::recently_played_guidance;
use crate::domain::errors::{ApiError, UpstreamError};
use crate::domain::operations::{ProxyOperation, ProxyRequest};
use crate::domain::ports::WebApi;

// Label for the recently-played 404 after remapping.
const NOT_FOUND_LABEL: &str = "Not Found";

// Forwards one logical operation to the provider REST API.
pub struct ProxyUseCase<A> {
    pub api: A,
}

impl<A> ProxyUseCase<A>
where
    A: WebApi,
{
    pub async fn execute(&self, request: ProxyRequest) -> Result<Value, ApiError> {
        let ProxyRequest { token, operation } = request;
        let upstream = operation.upstream_request();

        match self.api.send(&token, upstream).await {
            Ok(_) if operation.is_command() => Ok(json!({ "ok": true })),
            Ok(body) => Ok(body),
            Err(UpstreamError::Rejected(mut err))
                if err.status == 404 && matches!(operation, ProxyOperation::RecentlyPlayed { .. }) =>
            {
                err.hint = Some(recently_played_guidance(&err.message).to_string());
                err.message = NOT_FOUND_LABEL.to_string();
                Err(ApiError::Upstream(err))
            }
            Err(err) => Err(err.into()),
        }
    }
}
