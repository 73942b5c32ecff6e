//! Action routing: one inbound shape, exactly one adapter per tag.

use std::sync::Arc;

use crate::adapters::{AuthAdapter, LogTransport};
use crate::envelope::ResponseEnvelope;
use crate::error::DispatchError;
use crate::payload::InboundRequest;

/// Routes inbound requests to the adapter owning the tagged
/// capability. The active logging transport is fixed at construction;
/// the router never branches on transport per request.
pub struct ActionRouter {
    auth: AuthAdapter,
    log: Arc<dyn LogTransport>,
}

impl ActionRouter {
    #[must_use]
    pub fn new(auth: AuthAdapter, log: Arc<dyn LogTransport>) -> Self {
        Self { auth, log }
    }

    /// Dispatches an inbound request to exactly one transport adapter.
    ///
    /// The router validates shape only: the tagged action must carry
    /// its matching payload. Adapter outcomes are surfaced unchanged
    /// and never retried here.
    ///
    /// # Errors
    ///
    /// `UnsupportedAction` for unknown tags, `MalformedRequest` when
    /// the payload matching the tag is absent, otherwise whatever the
    /// adapter returned.
    pub async fn dispatch(
        &self,
        request: InboundRequest,
    ) -> Result<ResponseEnvelope, DispatchError> {
        match request.action.as_str() {
            "auth" => {
                let payload = request.auth.ok_or_else(|| {
                    DispatchError::MalformedRequest(
                        "auth action without auth payload".to_string(),
                    )
                })?;
                self.auth.authenticate(payload).await
            }
            "log" => {
                let payload = request.log.ok_or_else(|| {
                    DispatchError::MalformedRequest(
                        "log action without log payload".to_string(),
                    )
                })?;
                self.log.write_log(&payload).await
            }
            other => Err(DispatchError::UnsupportedAction(other.to_string())),
        }
    }
}
