//! HTTP handler definitions for the broker.
//!
//! Defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for building the
//! router.

pub mod dispatch;
pub mod health;

pub use dispatch::handle_submission;
pub use health::{broker_handler, health_handler, ping_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use crate::queue::QueueConnectionManager;
use crate::router::ActionRouter;

use super::shutdown::ShutdownController;

/// Shared application state passed to all axum handlers via `State`
/// extraction. Holds `Arc` references so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Dispatch engine routing inbound actions to transport adapters.
    pub router: Arc<ActionRouter>,
    /// Graceful shutdown controller with the health state machine.
    pub shutdown: Arc<ShutdownController>,
    /// Shared queue connection, present when the queue strategy is
    /// configured; reported through `/health`.
    pub queue: Option<Arc<QueueConnectionManager>>,
    /// Process start time, used for uptime reporting.
    pub start_time: Instant,
}
