//! HTTP server lifecycle with deferred startup.
//!
//! `new()` allocates shared state, `start()` binds the TCP listener,
//! and `serve()` accepts connections until the shutdown future fires.
//! The separation lets the bootstrap establish the queue connection
//! between construction and serving.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::queue::QueueConnectionManager;
use crate::router::ActionRouter;

use super::config::NetworkConfig;
use super::handlers::{
    broker_handler, handle_submission, health_handler, ping_handler, readiness_handler, AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;

/// Manages the broker's HTTP server lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    shutdown: Arc<ShutdownController>,
    router: Arc<ActionRouter>,
    queue: Option<Arc<QueueConnectionManager>>,
}

impl NetworkModule {
    /// Creates a new module without binding any port.
    #[must_use]
    pub fn new(
        config: NetworkConfig,
        router: Arc<ActionRouter>,
        queue: Option<Arc<QueueConnectionManager>>,
    ) -> Self {
        Self {
            config,
            listener: None,
            shutdown: Arc::new(ShutdownController::new()),
            router,
            queue,
        }
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `GET /` -- liveness probe (fixed success envelope)
    /// - `GET /ping` -- heartbeat
    /// - `GET /health` -- health detail JSON
    /// - `GET /health/ready` -- readiness probe
    /// - `POST /handle` -- the dispatch endpoint
    #[must_use]
    pub fn build_router(&self) -> Router {
        let state = AppState {
            router: Arc::clone(&self.router),
            shutdown: Arc::clone(&self.shutdown),
            queue: self.queue.clone(),
            start_time: Instant::now(),
        };
        build_router_with_state(state, &self.config)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the
    /// configured one when port 0 is used (OS-assigned).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves connections until the shutdown future fires, then winds
    /// down: Draining, close the queue connection, Stopped.
    ///
    /// Consumes `self` because the listener moves into the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server hits a fatal I/O error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .expect("start() must be called before serve()");

        let state = AppState {
            router: Arc::clone(&self.router),
            shutdown: Arc::clone(&self.shutdown),
            queue: self.queue.clone(),
            start_time: Instant::now(),
        };
        let router = build_router_with_state(state, &self.config);

        // Readiness probes pass from here on.
        self.shutdown.set_ready();

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.shutdown.trigger_shutdown();
        if let Some(queue) = &self.queue {
            queue.close().await;
        }
        self.shutdown.set_stopped();
        info!("broker stopped");
        Ok(())
    }
}

fn build_router_with_state(state: AppState, config: &NetworkConfig) -> Router {
    let layers = build_http_layers(config);

    Router::new()
        .route("/", get(broker_handler))
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/handle", post(handle_submission))
        .layer(layers)
        .with_state(state)
}
