//! Transport adapters translating domain payloads into downstream
//! calls and protocol-specific outcomes into the uniform envelope.
//!
//! The logging action is explicitly polymorphic over transport:
//! exactly one [`LogTransport`] implementation is active per
//! deployment, selected at construction time -- never by runtime
//! branching inside one function.

pub mod auth;
pub mod log_grpc;
pub mod log_http;
pub mod log_queue;
pub mod log_rpc;
pub mod logs;
pub mod mail;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{BrokerConfig, LogTransportKind};
use crate::envelope::ResponseEnvelope;
use crate::error::DispatchError;
use crate::payload::LogPayload;
use crate::queue::QueueConnectionManager;

pub use auth::AuthAdapter;
pub use log_grpc::GrpcLogTransport;
pub use log_http::HttpLogTransport;
pub use log_queue::{LogPublisher, QueueLogTransport};
pub use log_rpc::RpcLogTransport;
pub use mail::MailAdapter;

/// One logging strategy: a single wire protocol for the `"log"`
/// action.
///
/// Every implementation produces the same envelope shape on success,
/// so the router and caller stay transport-agnostic.
#[async_trait]
pub trait LogTransport: Send + Sync {
    /// Forwards the entry to the logger downstream.
    ///
    /// # Errors
    ///
    /// `DownstreamUnreachable` when the downstream never answered,
    /// `DownstreamError` when it answered with an error status.
    async fn write_log(&self, entry: &LogPayload) -> Result<ResponseEnvelope, DispatchError>;
}

/// Builds the active logging transport for this deployment.
#[must_use]
pub fn make_log_transport(
    config: &BrokerConfig,
    queue: &Arc<QueueConnectionManager>,
) -> Arc<dyn LogTransport> {
    match config.log_transport {
        LogTransportKind::Http => Arc::new(HttpLogTransport::new(config.log_http_url.clone())),
        LogTransportKind::Queue => Arc::new(QueueLogTransport::new(
            Arc::clone(queue) as Arc<dyn LogPublisher>
        )),
        LogTransportKind::Rpc => Arc::new(RpcLogTransport::new(config.log_rpc_addr.clone())),
        LogTransportKind::Grpc => Arc::new(GrpcLogTransport::new(
            config.log_grpc_url.clone(),
            Duration::from_millis(config.log_grpc_deadline_ms),
        )),
    }
}
