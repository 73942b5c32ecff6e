//! Liveness, heartbeat, and health endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use crate::envelope::ResponseEnvelope;
use crate::network::HealthState;

use super::AppState;

/// `GET /` -- liveness probe producing a fixed success envelope.
pub async fn broker_handler() -> (StatusCode, Json<ResponseEnvelope>) {
    (StatusCode::OK, Json(ResponseEnvelope::ok("hit the broker")))
}

/// `GET /ping` -- plain heartbeat for load-balancer checks.
pub async fn ping_handler() -> &'static str {
    "."
}

/// `GET /health` -- detailed health information as JSON.
///
/// Always returns 200 -- the `state` field indicates whether the
/// broker is actually healthy, so monitoring can distinguish "up but
/// draining" from "down". The queue field reports `disabled` when no
/// queue strategy is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let queue_state = state
        .queue
        .as_ref()
        .map_or("disabled", |q| q.state().as_str());

    Json(json!({
        "state": state.shutdown.health_state().as_str(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "queue": queue_state,
    }))
}

/// `GET /health/ready` -- 200 when ready, 503 otherwise.
///
/// Returns 503 during startup (before `set_ready()`), while draining,
/// and after stop, removing the broker from its endpoint list.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.shutdown.health_state() == HealthState::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use crate::adapters::{AuthAdapter, MailAdapter};
    use crate::network::ShutdownController;
    use crate::queue::QueueConnectionManager;
    use crate::router::ActionRouter;

    use super::*;

    fn test_state(queue: Option<Arc<QueueConnectionManager>>) -> AppState {
        let mailer = Arc::new(MailAdapter::new("http://127.0.0.1:1/send"));
        let auth = AuthAdapter::new("http://127.0.0.1:1/authenticate", mailer);
        let log = Arc::new(crate::adapters::HttpLogTransport::new("http://127.0.0.1:1/log"));
        AppState {
            router: Arc::new(ActionRouter::new(auth, log)),
            shutdown: Arc::new(ShutdownController::new()),
            queue,
            start_time: Instant::now(),
        }
    }

    #[tokio::test]
    async fn broker_handler_returns_fixed_envelope() {
        let (status, Json(envelope)) = broker_handler().await;
        assert_eq!(status, StatusCode::OK);
        assert!(envelope.status);
        assert_eq!(envelope.message, "hit the broker");
    }

    #[tokio::test]
    async fn ping_is_a_heartbeat() {
        assert_eq!(ping_handler().await, ".");
    }

    #[tokio::test]
    async fn health_reports_state_and_disabled_queue() {
        let state = test_state(None);
        state.shutdown.set_ready();

        let response = health_handler(State(state)).await;
        assert_eq!(response.0["state"], "ready");
        assert_eq!(response.0["queue"], "disabled");
        assert!(response.0["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn health_reports_queue_state() {
        let queue = Arc::new(QueueConnectionManager::new("amqp://127.0.0.1:1"));
        let state = test_state(Some(queue));

        let response = health_handler(State(state)).await;
        assert_eq!(response.0["queue"], "disconnected");
    }

    #[tokio::test]
    async fn readiness_follows_health_state() {
        let state = test_state(None);
        assert_eq!(
            readiness_handler(State(state.clone())).await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        state.shutdown.set_ready();
        assert_eq!(readiness_handler(State(state.clone())).await, StatusCode::OK);

        state.shutdown.trigger_shutdown();
        assert_eq!(
            readiness_handler(State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
