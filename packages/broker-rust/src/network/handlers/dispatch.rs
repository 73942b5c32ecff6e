//! The dispatch endpoint: one uniform body in, one envelope out.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use crate::envelope::ResponseEnvelope;
use crate::error::DispatchError;
use crate::payload::InboundRequest;

use super::AppState;

/// `POST /handle` -- decodes the inbound request, routes it, and
/// mirrors the outcome into an HTTP status plus envelope.
///
/// Adapter errors never escape as faults: every failure becomes a
/// `status=false` envelope with a 4xx/5xx from the taxonomy. Success
/// paths answer 202 Accepted.
pub async fn handle_submission(
    State(state): State<AppState>,
    body: Result<Json<InboundRequest>, JsonRejection>,
) -> (StatusCode, Json<ResponseEnvelope>) {
    let Json(request) = match body {
        Ok(json) => json,
        Err(rejection) => {
            let err = DispatchError::MalformedRequest(rejection.body_text());
            return (err.status_code(), Json(err.to_envelope()));
        }
    };

    match state.router.dispatch(request).await {
        Ok(envelope) => (StatusCode::ACCEPTED, Json(envelope)),
        Err(err) => {
            warn!(error = %err, "dispatch failed");
            (err.status_code(), Json(err.to_envelope()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use async_trait::async_trait;

    use crate::adapters::{AuthAdapter, LogTransport, MailAdapter};
    use crate::network::ShutdownController;
    use crate::payload::LogPayload;
    use crate::router::ActionRouter;

    use super::*;

    struct StubLogTransport;

    #[async_trait]
    impl LogTransport for StubLogTransport {
        async fn write_log(
            &self,
            _entry: &LogPayload,
        ) -> Result<ResponseEnvelope, DispatchError> {
            Ok(ResponseEnvelope::ok("logged"))
        }
    }

    fn test_state() -> AppState {
        let mailer = Arc::new(MailAdapter::new("http://127.0.0.1:1/send"));
        let auth = AuthAdapter::new("http://127.0.0.1:1/authenticate", mailer);
        AppState {
            router: Arc::new(ActionRouter::new(auth, Arc::new(StubLogTransport))),
            shutdown: Arc::new(ShutdownController::new()),
            queue: None,
            start_time: Instant::now(),
        }
    }

    fn body(raw: &str) -> Result<Json<InboundRequest>, JsonRejection> {
        Ok(Json(serde_json::from_str(raw).unwrap()))
    }

    #[tokio::test]
    async fn unknown_action_is_a_client_error() {
        let (status, Json(envelope)) = handle_submission(
            State(test_state()),
            body(r#"{"action":"mail"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!envelope.status);
        assert_eq!(envelope.message, "unsupported action: mail");
    }

    #[tokio::test]
    async fn missing_payload_is_a_client_error() {
        let (status, Json(envelope)) = handle_submission(
            State(test_state()),
            body(r#"{"action":"log"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!envelope.status);
    }

    #[tokio::test]
    async fn log_success_is_accepted() {
        let (status, Json(envelope)) = handle_submission(
            State(test_state()),
            body(r#"{"action":"log","log":{"name":"test","data":"hello"}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(envelope.status);
        assert_eq!(envelope.message, "logged");
    }

    #[tokio::test]
    async fn unreachable_downstream_is_a_bad_gateway() {
        let (status, Json(envelope)) = handle_submission(
            State(test_state()),
            body(r#"{"action":"auth","auth":{"email":"a@b.com","password":"x"}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!envelope.status);
    }
}
