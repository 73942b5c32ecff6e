//! Switchboard Broker -- edge dispatcher routing tagged requests to
//! downstream services over HTTP, AMQP, binary RPC, and gRPC.

pub mod adapters;
pub mod config;
pub mod envelope;
pub mod error;
pub mod network;
pub mod payload;
pub mod queue;
pub mod router;

pub use config::{BrokerConfig, LogTransportKind};
pub use envelope::ResponseEnvelope;
pub use error::DispatchError;
pub use payload::{AuthPayload, InboundRequest, LogPayload, NotificationPayload};
pub use router::ActionRouter;
