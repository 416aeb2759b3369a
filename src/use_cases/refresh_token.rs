use crate::domain::errors::AuthError;
use crate::domain::ports::TokenEndpoint;
use crate::use_cases::handle_callback::map_token_error;

// Result of a refresh. Only the access token goes back to the caller.
#[derive(Debug)]
pub struct RefreshedAccess {
    pub access_token: String,
}

// Exchanges a caller-held refresh token for a new access token.
// Holds no state, so concurrent refreshes of one token are independent.
pub struct RefreshTokenUseCase<T> {
    pub tokens: T,
}

impl<T> RefreshTokenUseCase<T>
where
    T: TokenEndpoint,
{
    pub async fn execute(&self, refresh_token: Option<String>) -> Result<RefreshedAccess, AuthError> {
        let refresh_token = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        let pair = self
            .tokens
            .refresh(&refresh_token)
            .await
            .map_err(map_token_error)?;

        // TODO: confirm whether the provider rotates refresh tokens; rotated ones are dropped here.
        if pair.refresh_token.is_some() {
            tracing::debug!("provider returned a rotated refresh token; not forwarded");
        }

        Ok(RefreshedAccess {
            access_token: pair.access_token,
        })
    }
}
