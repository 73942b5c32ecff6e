//! Queue-publish logging strategy: at-most-once AMQP publish.

use std::sync::Arc;

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, ExchangeKind};

use crate::envelope::ResponseEnvelope;
use crate::error::DispatchError;
use crate::payload::LogPayload;
use crate::queue::QueueConnectionManager;

use super::LogTransport;

/// Exchange every log entry is published to.
pub const LOG_EXCHANGE: &str = "logs_topic";
/// Routing key for informational log entries.
pub const LOG_ROUTING_KEY: &str = "log.INFO";

/// The publish seam between the transport and the broker connection.
///
/// The transport depends on this rather than on a concrete channel,
/// so tests exercise it with an injected fake.
#[async_trait]
pub trait LogPublisher: Send + Sync {
    /// Hands one message body to the exchange under the routing key.
    ///
    /// # Errors
    ///
    /// `DownstreamUnreachable` when the broker cannot be reached or
    /// the publish hand-off fails.
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), DispatchError>;
}

#[async_trait]
impl LogPublisher for QueueConnectionManager {
    // One fresh channel per publish over the shared connection.
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), DispatchError> {
        let channel = self.channel().await?;

        channel
            .exchange_declare(
                exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|err| {
                DispatchError::DownstreamUnreachable(format!("exchange declare: {err}"))
            })?;

        channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default(),
            )
            .await
            .map_err(|err| DispatchError::DownstreamUnreachable(format!("publish: {err}")))?;

        Ok(())
    }
}

/// Publishes log entries through the injected publisher.
pub struct QueueLogTransport {
    publisher: Arc<dyn LogPublisher>,
}

impl QueueLogTransport {
    #[must_use]
    pub fn new(publisher: Arc<dyn LogPublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl LogTransport for QueueLogTransport {
    // Fire-and-forget: success means the publish was handed to the
    // broker connection, not that anything consumed it. The publisher
    // confirm is intentionally not awaited.
    async fn write_log(&self, entry: &LogPayload) -> Result<ResponseEnvelope, DispatchError> {
        let body = serde_json::to_vec(entry).map_err(|err| {
            DispatchError::DownstreamUnreachable(format!("encode log entry: {err}"))
        })?;

        self.publisher
            .publish(LOG_EXCHANGE, LOG_ROUTING_KEY, &body)
            .await?;

        Ok(ResponseEnvelope::ok("logged via queue"))
    }
}
