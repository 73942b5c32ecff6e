//! Graceful shutdown controller.
//!
//! Uses `ArcSwap` for lock-free health state reads and a `watch`
//! channel to fan the shutdown signal out to listeners.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

/// Server health state, transitioned by the shutdown controller.
///
/// State machine: Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Server is initializing (not yet accepting requests).
    Starting,
    /// Server is fully operational.
    Ready,
    /// Server is finishing in-flight requests; no new ones accepted.
    Draining,
    /// Server has fully stopped.
    Stopped,
}

impl HealthState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Coordinates shutdown: readiness probes read `health_state()`,
/// the serve loop selects on `shutdown_receiver()`, and the module
/// walks the state machine as it winds down.
#[derive(Debug)]
pub struct ShutdownController {
    shutdown_signal: watch::Sender<bool>,
    health_state: ArcSwap<HealthState>,
}

impl ShutdownController {
    /// Creates a controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shutdown_signal: tx,
            health_state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    /// Transitions to `Ready`.
    pub fn set_ready(&self) {
        self.health_state.store(Arc::new(HealthState::Ready));
    }

    /// Transitions to `Stopped` once teardown is complete.
    pub fn set_stopped(&self) {
        self.health_state.store(Arc::new(HealthState::Stopped));
    }

    /// Returns a receiver notified when shutdown is triggered.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Initiates graceful shutdown: transitions to `Draining` and
    /// signals all receivers.
    pub fn trigger_shutdown(&self) {
        self.health_state.store(Arc::new(HealthState::Draining));
        // Ignore send errors -- receivers may have been dropped.
        let _ = self.shutdown_signal.send(true);
    }

    /// Current health state.
    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.health_state.load()
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_state_machine() {
        let controller = ShutdownController::new();
        assert_eq!(controller.health_state(), HealthState::Starting);

        controller.set_ready();
        assert_eq!(controller.health_state(), HealthState::Ready);

        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Draining);

        controller.set_stopped();
        assert_eq!(controller.health_state(), HealthState::Stopped);
    }

    #[tokio::test]
    async fn shutdown_receiver_notified() {
        let controller = ShutdownController::new();
        let mut rx = controller.shutdown_receiver();
        assert!(!*rx.borrow());

        controller.trigger_shutdown();

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[test]
    fn state_names_for_health_reporting() {
        assert_eq!(HealthState::Starting.as_str(), "starting");
        assert_eq!(HealthState::Ready.as_str(), "ready");
        assert_eq!(HealthState::Draining.as_str(), "draining");
        assert_eq!(HealthState::Stopped.as_str(), "stopped");
    }
}
