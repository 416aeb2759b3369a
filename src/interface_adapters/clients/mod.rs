// The clients defined here are reqwest clients for the provider's endpoints.

pub mod accounts;
pub mod web_api;

pub use accounts::AccountsClient;
pub use web_api::WebApiClient;
