//! Best-effort notification delivery to the mail service.

use tracing::debug;

use crate::error::DispatchError;
use crate::payload::NotificationPayload;

/// Fire-and-forget mail sender. The downstream response is ignored;
/// failures only surface to the spawning task so it can log them.
pub struct MailAdapter {
    client: reqwest::Client,
    mail_url: String,
}

impl MailAdapter {
    #[must_use]
    pub fn new(mail_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            mail_url: mail_url.into(),
        }
    }

    /// Posts the notification to the mail service.
    ///
    /// # Errors
    ///
    /// `DownstreamUnreachable` on transport failure. Callers are
    /// expected to log and swallow this; it never reaches the
    /// original caller.
    pub async fn send(&self, note: &NotificationPayload) -> Result<(), DispatchError> {
        debug!(to = %note.to, "sending notification");
        self.client
            .post(&self.mail_url)
            .json(note)
            .send()
            .await
            .map_err(|err| {
                DispatchError::DownstreamUnreachable(format!("mail service: {err}"))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_mail_service_reports_transport_failure() {
        let adapter = MailAdapter::new("http://127.0.0.1:1/send");
        let note = NotificationPayload::sign_in_confirmation("a@b.com");
        let err = adapter.send(&note).await.unwrap_err();
        assert!(matches!(err, DispatchError::DownstreamUnreachable(_)));
    }
}
