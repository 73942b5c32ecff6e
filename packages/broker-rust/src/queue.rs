//! Lifecycle of the single long-lived AMQP connection.
//!
//! The manager owns the one lapin connection shared by every
//! queue-publish task. Startup dials with quadratic backoff under a
//! bounded attempt budget; a connection lost at runtime is repaired by
//! a single-flight redial. Publishers borrow fresh channels per call
//! and never close the connection.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use lapin::{Connection, ConnectionProperties};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::DispatchError;

/// Consecutive failed dials tolerated before the startup connect
/// aborts with `BrokerUnavailable`.
pub const MAX_DIAL_ATTEMPTS: u32 = 6;

/// Connection lifecycle states, exposed for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Disconnected,
    Connecting,
    Connected,
}

impl QueueState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

/// Owns the single long-lived connection to the message broker.
///
/// The connection slot lives behind an async mutex: the task holding
/// the lock is the only one allowed to drive the
/// Disconnected -> Connected transition, so concurrent publishers
/// never race a reconnect. The state flag is lock-free for cheap
/// health reads.
pub struct QueueConnectionManager {
    url: String,
    slot: Mutex<Option<Arc<Connection>>>,
    state: ArcSwap<QueueState>,
}

impl QueueConnectionManager {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            slot: Mutex::new(None),
            state: ArcSwap::from_pointee(QueueState::Disconnected),
        }
    }

    /// Backoff slept before dial attempt `attempt`: `attempt²` seconds,
    /// so the sequence is 0s, 1s, 4s, 9s, 16s, 25s.
    #[must_use]
    pub fn backoff_delay(attempt: u32) -> Duration {
        Duration::from_secs(u64::from(attempt) * u64::from(attempt))
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> QueueState {
        **self.state.load()
    }

    /// Dials the broker at startup.
    ///
    /// Attempt `n` sleeps `n²` seconds before dialing. The sixth
    /// consecutive failure is terminal: no further retries happen and
    /// the queue-publish strategy must not be served.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::BrokerUnavailable` once the attempt
    /// budget is exhausted.
    pub async fn connect(&self) -> Result<(), DispatchError> {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|c| c.status().connected()) {
            return Ok(());
        }
        self.state.store(Arc::new(QueueState::Connecting));

        for attempt in 0..MAX_DIAL_ATTEMPTS {
            tokio::time::sleep(Self::backoff_delay(attempt)).await;
            match Connection::connect(&self.url, ConnectionProperties::default()).await {
                Ok(conn) => {
                    info!("message broker connected");
                    *slot = Some(Arc::new(conn));
                    self.state.store(Arc::new(QueueState::Connected));
                    return Ok(());
                }
                Err(err) => {
                    warn!(attempt, error = %err, "message broker not ready");
                }
            }
        }

        self.state.store(Arc::new(QueueState::Disconnected));
        Err(DispatchError::BrokerUnavailable {
            attempts: MAX_DIAL_ATTEMPTS,
        })
    }

    /// Borrows a fresh publishing channel over the shared connection.
    ///
    /// Concurrent publishers open independent channels rather than
    /// serializing through one: the slot lock covers only the
    /// connected-check and redial, and the channel opens on a cloned
    /// handle after the guard is dropped. A lost connection is
    /// repaired here with a single redial -- no backoff budget at
    /// runtime; a failed redial is this publish's failure, not a
    /// process condition.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::DownstreamUnreachable` if the broker
    /// cannot be redialed or the channel cannot be opened.
    pub async fn channel(&self) -> Result<lapin::Channel, DispatchError> {
        let conn = {
            let mut slot = self.slot.lock().await;

            if !slot.as_ref().is_some_and(|c| c.status().connected()) {
                self.state.store(Arc::new(QueueState::Connecting));
                match Connection::connect(&self.url, ConnectionProperties::default()).await {
                    Ok(conn) => {
                        info!("message broker reconnected");
                        *slot = Some(Arc::new(conn));
                        self.state.store(Arc::new(QueueState::Connected));
                    }
                    Err(err) => {
                        *slot = None;
                        self.state.store(Arc::new(QueueState::Disconnected));
                        return Err(DispatchError::DownstreamUnreachable(format!(
                            "amqp dial: {err}"
                        )));
                    }
                }
            }

            let Some(conn) = slot.as_ref() else {
                return Err(DispatchError::DownstreamUnreachable(
                    "no broker connection".to_string(),
                ));
            };
            Arc::clone(conn)
        };

        conn.create_channel().await.map_err(|err| {
            DispatchError::DownstreamUnreachable(format!("channel open: {err}"))
        })
    }

    /// Closes the connection at process shutdown. Idempotent.
    pub async fn close(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(conn) = slot.take() {
            if let Err(err) = conn.close(200, "shutting down").await {
                warn!(error = %err, "error closing broker connection");
            }
        }
        self.state.store(Arc::new(QueueState::Disconnected));
    }
}
