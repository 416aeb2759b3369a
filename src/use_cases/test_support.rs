use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::{BearerToken, TokenPair};
use crate::domain::errors::{ProxyError, UpstreamError};
use crate::domain::operations::UpstreamRequest;
use crate::domain::ports::{StateGenerator, TokenEndpoint, TokenEndpointError, WebApi};

// Deterministic state for login tests.
pub(crate) struct FixedState(pub(crate) &'static str);

impl StateGenerator for FixedState {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

#[derive(Clone, Copy)]
pub(crate) enum TokenOutcome {
    // Issue tokens derived from the presented code or refresh token.
    Issue,
    Reject(u16),
    Unreachable,
}

#[derive(Default)]
struct TokenCalls {
    codes: Vec<String>,
    refreshes: Vec<String>,
}

// Token endpoint fake that records every grant it sees.
#[derive(Clone)]
pub(crate) struct FakeTokenEndpoint {
    outcome: TokenOutcome,
    calls: Arc<Mutex<TokenCalls>>,
}

impl FakeTokenEndpoint {
    pub(crate) fn new(outcome: TokenOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(Mutex::new(TokenCalls::default())),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        let guard = self.calls.lock().expect("token calls mutex poisoned");
        guard.codes.len() + guard.refreshes.len()
    }

    pub(crate) fn exchanged_codes(&self) -> Vec<String> {
        let guard = self.calls.lock().expect("token calls mutex poisoned");
        guard.codes.clone()
    }

    pub(crate) fn refreshed_tokens(&self) -> Vec<String> {
        let guard = self.calls.lock().expect("token calls mutex poisoned");
        guard.refreshes.clone()
    }

    fn reply(&self, seed: &str, with_refresh: bool) -> Result<TokenPair, TokenEndpointError> {
        match self.outcome {
            TokenOutcome::Issue => Ok(TokenPair {
                access_token: format!("access-for-{seed}"),
                refresh_token: with_refresh.then(|| format!("refresh-for-{seed}")),
                expires_in: Some(3600),
            }),
            TokenOutcome::Reject(status) => Err(TokenEndpointError::Rejected { status }),
            TokenOutcome::Unreachable => {
                Err(TokenEndpointError::Transport("connection refused".to_string()))
            }
        }
    }
}

#[async_trait]
impl TokenEndpoint for FakeTokenEndpoint {
    async fn exchange_code(&self, code: &str) -> Result<TokenPair, TokenEndpointError> {
        {
            let mut guard = self.calls.lock().expect("token calls mutex poisoned");
            guard.codes.push(code.to_string());
        }
        self.reply(code, true)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenEndpointError> {
        {
            let mut guard = self.calls.lock().expect("token calls mutex poisoned");
            guard.refreshes.push(refresh_token.to_string());
        }
        self.reply(refresh_token, false)
    }
}

#[derive(Clone)]
pub(crate) enum UpstreamReply {
    Ok(Value),
    Status(u16, Value),
    Unreachable,
}

#[derive(Clone, Debug)]
pub(crate) struct RecordedCall {
    pub token: String,
    pub request: UpstreamRequest,
}

// REST fake that records each forwarded request and answers with a canned reply.
#[derive(Clone)]
pub(crate) struct RecordingApi {
    reply: UpstreamReply,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingApi {
    pub(crate) fn new(reply: UpstreamReply) -> Self {
        Self {
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        let guard = self.calls.lock().expect("api calls mutex poisoned");
        guard.clone()
    }
}

#[async_trait]
impl WebApi for RecordingApi {
    async fn send(
        &self,
        token: &BearerToken,
        request: UpstreamRequest,
    ) -> Result<Value, UpstreamError> {
        {
            let mut guard = self.calls.lock().expect("api calls mutex poisoned");
            guard.push(RecordedCall {
                token: token.as_str().to_string(),
                request,
            });
        }

        match &self.reply {
            UpstreamReply::Ok(body) => Ok(body.clone()),
            UpstreamReply::Status(status, details) => Err(UpstreamError::Rejected(
                ProxyError::from_upstream(*status, None, details.clone()),
            )),
            UpstreamReply::Unreachable => {
                Err(UpstreamError::Transport("connection refused".to_string()))
            }
        }
    }
}
