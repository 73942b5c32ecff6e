//! Error taxonomy unifying four structurally different downstream
//! failure models into one contract.

use axum::http::StatusCode;

use crate::envelope::ResponseEnvelope;

/// Errors produced by the router and the transport adapters.
///
/// Every variant converts to a `status=false` envelope at the handler
/// boundary; none propagate as unhandled faults to the caller.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Inbound body failed to decode, or the tagged action arrived
    /// without its matching payload. Never retried.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// Unknown action tag.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),
    /// Explicit rejection by the auth service, either a 401 or a soft
    /// failure reported inside a 2xx. Never retried.
    #[error("{reason}")]
    InvalidCredentials { reason: String },
    /// Connection, dial, or timeout failure -- the downstream never
    /// answered.
    #[error("downstream unreachable: {0}")]
    DownstreamUnreachable(String),
    /// Downstream answered with an error status; the raw code is kept
    /// for diagnostics.
    #[error("downstream error ({detail}, status {code})")]
    DownstreamError { code: u16, detail: String },
    /// The queue connection exhausted its startup retry budget. Fatal:
    /// the process must not serve the queue-publish path without it.
    #[error("message broker unavailable after {attempts} connection attempts")]
    BrokerUnavailable { attempts: u32 },
}

impl DispatchError {
    /// The plain 401 rejection, with the fixed caller-facing message.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials {
            reason: "invalid credentials".to_string(),
        }
    }

    /// HTTP status mirroring the envelope's `status=false`.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) | Self::UnsupportedAction(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            Self::DownstreamUnreachable(_) | Self::DownstreamError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Self::BrokerUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// The failure envelope returned to the caller.
    #[must_use]
    pub fn to_envelope(&self) -> ResponseEnvelope {
        ResponseEnvelope::fail(self.to_string())
    }
}
