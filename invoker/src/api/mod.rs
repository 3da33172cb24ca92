//! API module for the invoker HTTP server

pub mod routes;
pub mod server;

pub use routes::{ApiError, AppState, CACHE_TIER_HEADER};
pub use server::{router, ApiServer, ApiServerConfig};
