//! HTTP serving: configuration, middleware, lifecycle, and shutdown
//! control for the broker's listener.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod shutdown;

pub use config::NetworkConfig;
pub use handlers::AppState;
pub use module::NetworkModule;
pub use shutdown::{HealthState, ShutdownController};
