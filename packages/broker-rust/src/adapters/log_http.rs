//! Synchronous-request logging strategy.

use async_trait::async_trait;

use crate::envelope::ResponseEnvelope;
use crate::error::DispatchError;
use crate::payload::LogPayload;

use super::LogTransport;

/// HTTP POST to the logger service. Success requires the downstream
/// to answer exactly 202 Accepted.
pub struct HttpLogTransport {
    client: reqwest::Client,
    log_url: String,
}

impl HttpLogTransport {
    #[must_use]
    pub fn new(log_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            log_url: log_url.into(),
        }
    }
}

#[async_trait]
impl LogTransport for HttpLogTransport {
    // Status-code based only: the logger's body is not inspected for
    // soft failures, unlike the auth path.
    async fn write_log(&self, entry: &LogPayload) -> Result<ResponseEnvelope, DispatchError> {
        let response = self
            .client
            .post(&self.log_url)
            .json(entry)
            .send()
            .await
            .map_err(|err| {
                DispatchError::DownstreamUnreachable(format!("logger service: {err}"))
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::ACCEPTED {
            return Err(DispatchError::DownstreamError {
                code: status.as_u16(),
                detail: "logger service".to_string(),
            });
        }

        Ok(ResponseEnvelope::ok("logged"))
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;

    async fn spawn_server(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn sample() -> LogPayload {
        LogPayload {
            name: "test".to_string(),
            data: "hello".to_string(),
        }
    }

    #[tokio::test]
    async fn accepted_yields_success_envelope() {
        let router = Router::new().route(
            "/log",
            post(|Json(entry): Json<LogPayload>| async move {
                assert_eq!(entry.name, "test");
                assert_eq!(entry.data, "hello");
                StatusCode::ACCEPTED
            }),
        );
        let addr = spawn_server(router).await;

        let transport = HttpLogTransport::new(format!("http://{addr}/log"));
        let envelope = transport.write_log(&sample()).await.unwrap();
        assert!(envelope.status);
        assert_eq!(envelope.message, "logged");
    }

    #[tokio::test]
    async fn non_accepted_status_is_downstream_error() {
        let router = Router::new().route("/log", post(|| async { StatusCode::OK }));
        let addr = spawn_server(router).await;

        let transport = HttpLogTransport::new(format!("http://{addr}/log"));
        let err = transport.write_log(&sample()).await.unwrap_err();
        assert!(matches!(err, DispatchError::DownstreamError { code: 200, .. }));
    }

    #[tokio::test]
    async fn unreachable_logger_service() {
        let transport = HttpLogTransport::new("http://127.0.0.1:1/log");
        let err = transport.write_log(&sample()).await.unwrap_err();
        assert!(matches!(err, DispatchError::DownstreamUnreachable(_)));
    }
}
