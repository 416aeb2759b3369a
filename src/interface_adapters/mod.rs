// Interface adapters: HTTP surface, provider clients and shared state.

pub mod clients;
pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
