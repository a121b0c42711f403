//! Fault translator: the only place a failure becomes a response body.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::EnvelopeConfig;
use crate::http::error::{classify, stack_trace, AppError, Failure};
use crate::http::request::trace_id_of;
use crate::http::response::FailureEnvelope;
use crate::observability::Logger;

const CONTEXT: &str = "FaultTranslator";

#[derive(Debug, Clone)]
pub struct FaultTranslator {
    logger: Logger,
    policy: EnvelopeConfig,
}

impl FaultTranslator {
    pub fn new(logger: Logger, policy: EnvelopeConfig) -> Self {
        Self { logger, policy }
    }

    /// Log `error` in full and render the failure envelope.
    pub fn render(&self, error: &AppError, trace_id: Option<&str>) -> Response {
        let stack = stack_trace(error);
        let message = format!("Global error: {error}");
        match trace_id {
            Some(id) => self
                .logger
                .for_request(id)
                .error(message, Some(&stack), Some(CONTEXT)),
            None => self.logger.error(message, Some(&stack), Some(CONTEXT)),
        }

        let fault = classify(error, &self.policy);
        let trace_id = self
            .policy
            .trace_id_on_failure
            .then(|| trace_id.map(str::to_string))
            .flatten();
        let body = FailureEnvelope::new(fault.message, trace_id);
        (fault.classification.status(), Json(body)).into_response()
    }
}

/// Catch-all failure boundary around the handler pipeline.
///
/// Renders responses that carry a [`Failure`], and converts any other error
/// status (405 from the router, 408 from the timeout layer) into the same
/// envelope. Successful responses pass through untouched.
pub async fn translate_faults(
    State(translator): State<FaultTranslator>,
    request: Request,
    next: Next,
) -> Response {
    let trace_id = trace_id_of(request.extensions());
    let mut response = next.run(request).await;

    let error = match response.extensions_mut().remove::<Failure>() {
        Some(Failure(error)) => error,
        None => {
            let status = response.status();
            if !(status.is_client_error() || status.is_server_error()) {
                return response;
            }
            std::sync::Arc::new(AppError::from_status(status))
        }
    };

    let mut rendered = translator.render(&error, trace_id.as_ref().map(|t| t.as_str()));
    if let Some(allow) = response.headers().get(header::ALLOW) {
        rendered.headers_mut().insert(header::ALLOW, allow.clone());
    }
    rendered
}

/// Response for a handler panic caught by `CatchPanicLayer`.
pub fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response<Body> {
    let message = crate::observability::logging::panic_message(payload.as_ref());
    AppError::Panic(message).into_response()
}
