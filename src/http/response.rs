//! Uniform response envelope.
//!
//! Every body the service writes is one of two shapes:
//!
//! ```text
//! {"success": true,  "data": <payload>, "traceId": "<id>"}
//! {"success": false, "message": "<text>"}
//! ```
//!
//! The failure shape gains `traceId` only when
//! `envelope.trace_id_on_failure` is enabled.

use serde::{Deserialize, Serialize};

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(rename = "traceId")]
    pub trace_id: String,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T, trace_id: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            trace_id: trace_id.into(),
        }
    }
}

/// Body of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(rename = "traceId", default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl FailureEnvelope {
    pub fn new(message: impl Into<String>, trace_id: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            trace_id,
        }
    }
}
