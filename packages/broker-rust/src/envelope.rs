//! The uniform success/failure envelope returned to every caller.

use serde::{Deserialize, Serialize};

/// Uniform response contract for every outward-facing reply.
///
/// `status` is `true` on success, with a human-readable `message` and
/// optional structured `data`. On any failure -- downstream or local --
/// `status` is `false` and `message` describes what went wrong. The
/// same shape is used by the downstream services, so a nested envelope
/// decodes with this type as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ResponseEnvelope {
    /// Success envelope without structured data.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: None,
        }
    }

    /// Success envelope carrying structured data.
    #[must_use]
    pub fn ok_with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Failure envelope.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data: None,
        }
    }
}
