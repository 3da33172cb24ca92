pub mod api;
pub mod bootstrap;
pub mod config;

pub use api::{router, ApiServer, ApiServerConfig};
pub use bootstrap::build_coordinator;
pub use config::{ConfigOverrides, ServiceConfig};
