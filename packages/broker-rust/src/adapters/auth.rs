//! Authentication adapter: synchronous HTTP call to the auth service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::envelope::ResponseEnvelope;
use crate::error::DispatchError;
use crate::payload::{AuthPayload, NotificationPayload};

use super::mail::MailAdapter;

/// Forwards credentials to the auth service and normalizes its
/// three-way outcome into the envelope contract.
pub struct AuthAdapter {
    client: reqwest::Client,
    auth_url: String,
    mailer: Arc<MailAdapter>,
}

impl AuthAdapter {
    #[must_use]
    pub fn new(auth_url: impl Into<String>, mailer: Arc<MailAdapter>) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_url: auth_url.into(),
            mailer,
        }
    }

    /// Serializes the credentials, calls the auth endpoint, and
    /// interprets the protocol status:
    ///
    /// - transport failure -> `DownstreamUnreachable`
    /// - 401 -> `InvalidCredentials`, never retried
    /// - any other non-202 -> `DownstreamError` with the raw code
    /// - 202 -> decode the nested envelope; an inner `status=false`
    ///   is still `InvalidCredentials` carrying the inner message
    ///   (the downstream reports soft failures inside a 2xx)
    ///
    /// On full success a sign-in notification is dispatched as a
    /// detached task. It does not block or gate the reply; its
    /// failures are logged and swallowed, never retried.
    ///
    /// # Errors
    ///
    /// See the outcome mapping above.
    pub async fn authenticate(
        &self,
        payload: AuthPayload,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let response = self
            .client
            .post(&self.auth_url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                DispatchError::DownstreamUnreachable(format!("auth service: {err}"))
            })?;

        match response.status() {
            reqwest::StatusCode::ACCEPTED => {}
            reqwest::StatusCode::UNAUTHORIZED => {
                return Err(DispatchError::invalid_credentials());
            }
            other => {
                return Err(DispatchError::DownstreamError {
                    code: other.as_u16(),
                    detail: "auth service".to_string(),
                });
            }
        }

        let inner: ResponseEnvelope = response.json().await.map_err(|err| {
            DispatchError::DownstreamError {
                code: 202,
                detail: format!("auth service envelope: {err}"),
            }
        })?;
        if !inner.status {
            return Err(DispatchError::InvalidCredentials {
                reason: inner.message,
            });
        }

        info!(email = %payload.email, "authentication succeeded");

        let mailer = Arc::clone(&self.mailer);
        let note = NotificationPayload::sign_in_confirmation(&payload.email);
        tokio::spawn(async move {
            if let Err(err) = mailer.send(&note).await {
                warn!(error = %err, "sign-in notification failed");
            }
        });

        Ok(inner)
    }
}
