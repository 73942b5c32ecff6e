//! Typed streaming-RPC logging strategy (gRPC).
//!
//! Plaintext channel -- this runs on an internal network with no
//! transport security. The whole connect-and-call sequence runs under
//! a short cancellable deadline; dropping the timed-out future tears
//! the channel down deterministically.

use std::time::Duration;

use async_trait::async_trait;

use crate::envelope::ResponseEnvelope;
use crate::error::DispatchError;
use crate::payload::LogPayload;

use super::logs::log_service_client::LogServiceClient;
use super::logs::{Log, LogRequest};
use super::LogTransport;

/// Per-call gRPC client against the logger service.
pub struct GrpcLogTransport {
    endpoint: String,
    deadline: Duration,
}

impl GrpcLogTransport {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, deadline: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            deadline,
        }
    }

    async fn call(&self, entry: &LogPayload) -> Result<ResponseEnvelope, DispatchError> {
        let mut client = LogServiceClient::connect(self.endpoint.clone())
            .await
            .map_err(|err| {
                DispatchError::DownstreamUnreachable(format!(
                    "grpc connect {}: {err}",
                    self.endpoint
                ))
            })?;

        let request = tonic::Request::new(LogRequest {
            log_entry: Some(Log {
                name: entry.name.clone(),
                data: entry.data.clone(),
            }),
        });

        let response = client.write_log(request).await.map_err(|status| {
            match status.code() {
                tonic::Code::DeadlineExceeded | tonic::Code::Unavailable => {
                    DispatchError::DownstreamUnreachable(format!("grpc write_log: {status}"))
                }
                code => DispatchError::DownstreamError {
                    code: code as u16,
                    detail: format!("grpc write_log: {}", status.message()),
                },
            }
        })?;

        Ok(ResponseEnvelope::ok(response.into_inner().result))
    }
}

#[async_trait]
impl LogTransport for GrpcLogTransport {
    // The channel lives inside the timed future: on deadline expiry
    // the future is dropped and the connection goes with it.
    async fn write_log(&self, entry: &LogPayload) -> Result<ResponseEnvelope, DispatchError> {
        match tokio::time::timeout(self.deadline, self.call(entry)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::DownstreamUnreachable(format!(
                "grpc deadline of {:?} exceeded",
                self.deadline
            ))),
        }
    }
}
