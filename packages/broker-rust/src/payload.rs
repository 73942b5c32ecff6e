//! Inbound request and downstream payload shapes.
//!
//! All payloads are forwarded verbatim: the broker never inspects or
//! stores credentials and never rewrites log entries.

use serde::{Deserialize, Serialize};

/// The single uniform inbound body accepted on `POST /handle`.
///
/// `action` is a closed tag selecting which adapter serves the
/// request; exactly one of the optional payloads must be populated,
/// matching the tag. Mismatches are rejected before any adapter runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogPayload>,
}

/// Opaque credentials forwarded to the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub email: String,
    pub password: String,
}

/// An event name and free-form body forwarded to whichever logging
/// transport is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPayload {
    pub name: String,
    pub data: String,
}

/// Mail sent after a successful authentication. Derived from the
/// caller's [`AuthPayload`], never received from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub to: String,
    pub subject: String,
    pub message: String,
}

impl NotificationPayload {
    /// The sign-in confirmation mail sent after a successful
    /// authentication.
    #[must_use]
    pub fn sign_in_confirmation(email: &str) -> Self {
        Self {
            to: email.to_string(),
            subject: "Sign in successful".to_string(),
            message: "You have been signed in to the service.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_auth_request() {
        let raw = r#"{"action":"auth","auth":{"email":"a@b.com","password":"x"}}"#;
        let request: InboundRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.action, "auth");
        assert_eq!(request.auth.unwrap().email, "a@b.com");
        assert!(request.log.is_none());
    }

    #[test]
    fn decodes_log_request() {
        let raw = r#"{"action":"log","log":{"name":"test","data":"hello"}}"#;
        let request: InboundRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(
            request.log.unwrap(),
            LogPayload {
                name: "test".to_string(),
                data: "hello".to_string(),
            }
        );
    }

    #[test]
    fn action_without_payload_decodes_with_none_fields() {
        // Shape validation (tag vs payload) is the router's job; the
        // decoder only cares about JSON structure.
        let raw = r#"{"action":"auth"}"#;
        let request: InboundRequest = serde_json::from_str(raw).unwrap();
        assert!(request.auth.is_none());
    }

    #[test]
    fn sign_in_confirmation_targets_caller() {
        let note = NotificationPayload::sign_in_confirmation("a@b.com");
        assert_eq!(note.to, "a@b.com");
        assert_eq!(note.subject, "Sign in successful");
    }
}
