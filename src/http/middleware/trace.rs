//! Trace propagation stage: first stage of every request.

use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::config::TraceConfig;
use crate::http::request::{self, TraceId};

/// Inbound and outbound trace header names.
#[derive(Debug, Clone)]
pub struct TraceHeaders {
    pub inbound: HeaderName,
    pub outbound: HeaderName,
}

impl TraceHeaders {
    /// Header names from config. Names are validated at load time; an
    /// unparsable one falls back to the default.
    pub fn from_config(config: &TraceConfig) -> Self {
        let defaults = TraceConfig::default();
        let parse = |name: &str, fallback: &str| {
            HeaderName::from_bytes(name.as_bytes())
                .or_else(|_| HeaderName::from_bytes(fallback.as_bytes()))
                .unwrap_or_else(|_| HeaderName::from_static("x-trace-id"))
        };
        Self {
            inbound: parse(&config.inbound_header, &defaults.inbound_header),
            outbound: parse(&config.outbound_header, &defaults.outbound_header),
        }
    }
}

impl Default for TraceHeaders {
    fn default() -> Self {
        Self::from_config(&TraceConfig::default())
    }
}

/// Assign the trace id, run the rest of the pipeline inside its scope, and
/// echo it on the response. Never fails.
pub async fn propagate_trace_id(
    State(headers): State<TraceHeaders>,
    mut request: Request,
    next: Next,
) -> Response {
    let trace_id = TraceId::from_header(request.headers().get(&headers.inbound));
    request.extensions_mut().insert(trace_id.clone());

    let span = tracing::info_span!("request", trace_id = %trace_id);
    let mut response = request::scope(trace_id.clone(), next.run(request))
        .instrument(span)
        .await;

    if let Some(value) = trace_id.header_value() {
        response.headers_mut().insert(headers.outbound, value);
    }
    response
}
