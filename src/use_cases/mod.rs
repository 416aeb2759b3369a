// Use cases layer: login, callback, refresh and proxy workflows.

pub mod begin_login;
pub mod handle_callback;
pub mod proxy;
pub mod refresh_token;
#[cfg(test)]
pub(crate) mod test_support;

pub use begin_login::{AuthorizeSettings, BeginLoginUseCase, LoginRedirect};
pub use handle_callback::HandleCallbackUseCase;
pub use proxy::ProxyUseCase;
pub use refresh_token::{RefreshTokenUseCase, RefreshedAccess};
