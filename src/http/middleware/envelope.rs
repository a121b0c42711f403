//! Response envelope normalizer for the success path.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::value::RawValue;

use crate::http::error::{AppError, Failure};
use crate::http::request::{trace_id_of, UNKNOWN_TRACE_ID};
use crate::http::response::SuccessEnvelope;

/// Wrap every successful payload as `{success, data, traceId}`.
///
/// JSON payloads are embedded verbatim, an empty body becomes `null` and any
/// other body becomes a JSON string. Bodiless statuses (204, 205) become 200
/// so the envelope reaches the client. Failures are left to the fault translator.
pub async fn wrap_success(request: Request, next: Next) -> Response {
    let trace_id = trace_id_of(request.extensions())
        .map(|t| t.to_string())
        .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string());

    let response = next.run(request).await;
    if response.extensions().get::<Failure>().is_some() || !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::Internal(format!("Failed to read response body: {e}")).into_response()
        }
    };

    let data = match embed(&bytes) {
        Ok(data) => data,
        Err(e) => return AppError::Internal(format!("Failed to encode response: {e}")).into_response(),
    };
    let encoded = match serde_json::to_vec(&SuccessEnvelope::new(data, trace_id)) {
        Ok(encoded) => encoded,
        Err(e) => return AppError::Internal(format!("Failed to encode response: {e}")).into_response(),
    };

    if parts.status == StatusCode::NO_CONTENT || parts.status == StatusCode::RESET_CONTENT {
        parts.status = StatusCode::OK;
    }
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(encoded))
}

fn embed(bytes: &[u8]) -> Result<Box<RawValue>, serde_json::Error> {
    if bytes.is_empty() {
        return RawValue::from_string("null".to_string());
    }
    match serde_json::from_slice::<Box<RawValue>>(bytes) {
        Ok(raw) => Ok(raw),
        Err(_) => RawValue::from_string(serde_json::to_string(&String::from_utf8_lossy(bytes))?),
    }
}
