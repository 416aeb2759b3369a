// Domain layer: credential hand-off and upstream request shapes.

pub mod classify;
pub mod entities;
pub mod errors;
pub mod operations;
pub mod pagination;
pub mod ports;

pub use entities::{BearerToken, CallbackParams, TokenPair};
pub use errors::{ApiError, AuthError, ProxyError, UpstreamError};
pub use operations::{HttpMethod, ProxyOperation, ProxyRequest, UpstreamRequest};
pub use pagination::{Page, PageLimits};
pub use ports::{StateGenerator, TokenEndpoint, WebApi};
