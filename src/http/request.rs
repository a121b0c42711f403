//! Per-request correlation context.
//!
//! # Responsibilities
//! - Adopt a caller-supplied trace id or generate one (UUID v4)
//! - Make it reachable downstream: request extensions (explicit) and a
//!   task-local scope (ambient), never global state
//! - Provide an extractor so handlers can take `TraceId` as an argument
//!
//! # Design Decisions
//! - The id is immutable once set; the outbound header and the envelope use
//!   the very same value
//! - Header values that are empty, blank or not UTF-8 count as absent; any
//!   other value is adopted byte for byte

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use uuid::Uuid;

/// Placeholder used when a component runs outside any request scope.
pub const UNKNOWN_TRACE_ID: &str = "unknown";

tokio::task_local! {
    static CURRENT_TRACE_ID: TraceId;
}

/// Correlation identifier of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(Arc<str>);

impl TraceId {
    /// A fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    /// Adopt `value` verbatim when usable, otherwise generate.
    pub fn from_header(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self(v.into()))
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_bytes(self.0.as_bytes()).ok()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run `fut` with `trace_id` as the ambient trace id.
pub async fn scope<F: Future>(trace_id: TraceId, fut: F) -> F::Output {
    CURRENT_TRACE_ID.scope(trace_id, fut).await
}

/// The ambient trace id, if called inside a request scope.
pub fn current_trace_id() -> Option<TraceId> {
    CURRENT_TRACE_ID.try_with(TraceId::clone).ok()
}

/// Extension lookup for a request, falling back to the ambient id.
pub fn trace_id_of(extensions: &axum::http::Extensions) -> Option<TraceId> {
    extensions.get::<TraceId>().cloned().or_else(current_trace_id)
}

impl<S: Send + Sync> FromRequestParts<S> for TraceId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(trace_id_of(&parts.extensions).unwrap_or_else(|| TraceId(UNKNOWN_TRACE_ID.into())))
    }
}
