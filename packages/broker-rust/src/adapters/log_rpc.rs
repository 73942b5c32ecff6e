//! Binary RPC logging strategy.
//!
//! One length-delimited MessagePack frame pair per call over a fresh
//! TCP connection: a request naming the remote procedure with the log
//! entry as its argument, then a string acknowledgment. The
//! connection is torn down after the call; there is no pooling.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::envelope::ResponseEnvelope;
use crate::error::DispatchError;
use crate::payload::LogPayload;

use super::LogTransport;

/// Remote procedure invoked on the logger service.
pub const LOG_METHOD: &str = "log.write";

/// Wire request: procedure name plus the entry as its argument.
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcCall {
    pub method: String,
    pub entry: LogPayload,
}

/// Wire response: the logger's string acknowledgment.
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcAck {
    pub result: String,
}

/// Framed MessagePack client dialing the logger per call.
pub struct RpcLogTransport {
    addr: String,
}

impl RpcLogTransport {
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl LogTransport for RpcLogTransport {
    // Any dial, encode, or IO failure means the downstream never
    // acknowledged: all of them surface as unreachable.
    async fn write_log(&self, entry: &LogPayload) -> Result<ResponseEnvelope, DispatchError> {
        let stream = TcpStream::connect(&self.addr).await.map_err(|err| {
            DispatchError::DownstreamUnreachable(format!("rpc dial {}: {err}", self.addr))
        })?;
        let mut framed = Framed::new(stream, LengthDelimitedCodec::new());

        let call = RpcCall {
            method: LOG_METHOD.to_string(),
            entry: entry.clone(),
        };
        let body = rmp_serde::to_vec_named(&call).map_err(|err| {
            DispatchError::DownstreamUnreachable(format!("encode rpc call: {err}"))
        })?;
        framed
            .send(Bytes::from(body))
            .await
            .map_err(|err| DispatchError::DownstreamUnreachable(format!("rpc send: {err}")))?;

        let frame = framed
            .next()
            .await
            .ok_or_else(|| {
                DispatchError::DownstreamUnreachable(
                    "rpc connection closed before acknowledgment".to_string(),
                )
            })?
            .map_err(|err| DispatchError::DownstreamUnreachable(format!("rpc recv: {err}")))?;
        let ack: RpcAck = rmp_serde::from_slice(&frame).map_err(|err| {
            DispatchError::DownstreamUnreachable(format!("decode rpc ack: {err}"))
        })?;

        Ok(ResponseEnvelope::ok(ack.result))
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;

    /// Minimal logger stub speaking the framed MessagePack protocol:
    /// accepts one connection, answers one call, hangs up.
    async fn spawn_rpc_stub() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
            let frame = framed.next().await.unwrap().unwrap();
            let call: RpcCall = rmp_serde::from_slice(&frame).unwrap();
            assert_eq!(call.method, LOG_METHOD);
            let ack = RpcAck {
                result: format!("logged {} via rpc", call.entry.name),
            };
            let body = rmp_serde::to_vec_named(&ack).unwrap();
            framed.send(Bytes::from(body)).await.unwrap();
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
    async fn round_trip_returns_acknowledgment() {
        let addr = spawn_rpc_stub().await;
        let transport = RpcLogTransport::new(addr.to_string());
        let envelope = transport.write_log(&sample()).await.unwrap();
        assert!(envelope.status);
        assert_eq!(envelope.message, "logged test via rpc");
    }

    #[tokio::test]
    async fn dial_failure_is_unreachable() {
        let transport = RpcLogTransport::new("127.0.0.1:1");
        let err = transport.write_log(&sample()).await.unwrap_err();
        assert!(matches!(err, DispatchError::DownstreamUnreachable(_)));
    }

    #[tokio::test]
    async fn hangup_before_ack_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and immediately drop the connection.
            let _ = listener.accept().await;
        });

        let transport = RpcLogTransport::new(addr.to_string());
        let err = transport.write_log(&sample()).await.unwrap_err();
        assert!(matches!(err, DispatchError::DownstreamUnreachable(_)));
    }
}
