use crate::domain::entities::{CallbackParams, TokenPair};
use crate::domain::errors::AuthError;
use crate::domain::ports::{TokenEndpoint, TokenEndpointError};

// Validates the provider redirect and exchanges the code for tokens.
pub struct HandleCallbackUseCase<T> {
    pub tokens: T,
}

impl<T> HandleCallbackUseCase<T>
where
    T: TokenEndpoint,
{
    // `stored_state` is the value from the state cookie, if any.
    pub async fn execute(
        &self,
        params: CallbackParams,
        stored_state: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        if !state_matches(params.state.as_deref(), stored_state) {
            return Err(AuthError::StateMismatch);
        }

        let code = match params.code.filter(|code| !code.is_empty()) {
            Some(code) => code,
            None => {
                return Err(AuthError::MissingCode {
                    provider_error: params.error,
                });
            }
        };

        self.tokens
            .exchange_code(&code)
            .await
            .map_err(map_token_error)
    }
}

// A callback is accepted only when both sides are present and identical.
pub fn state_matches(returned: Option<&str>, stored: Option<&str>) -> bool {
    match (returned, stored) {
        (Some(returned), Some(stored)) => !returned.is_empty() && returned == stored,
        _ => false,
    }
}

pub(crate) fn map_token_error(err: TokenEndpointError) -> AuthError {
    match err {
        TokenEndpointError::Rejected { status } => AuthError::TokenRejected { status },
        TokenEndpointError::Transport(reason) => AuthError::Transport(reason),
    }
}
