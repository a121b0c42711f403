//! Request/response observer wrapped around each handler.
//!
//! Logs entry with a snapshot of body, query and path parameters, then exit
//! with the elapsed time and either the payload or the failure. The handler's
//! result is passed on unchanged; failures keep travelling towards the fault
//! translator.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{rejection::RawPathParamsRejection, Query, RawPathParams, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::EnvelopeConfig;
use crate::http::error::{classify, stack_trace, AppError, Failure, NO_STACK_TRACE};
use crate::http::middleware::fault::panic_response;
use crate::http::request::{trace_id_of, UNKNOWN_TRACE_ID};
use crate::observability::{metrics, LogMessage, Logger};

const CONTEXT: &str = "RequestObserver";

/// Observer state for one route: the handler identity it reports.
#[derive(Debug, Clone)]
pub struct Observer {
    logger: Logger,
    handler: &'static str,
    max_body_bytes: usize,
}

impl Observer {
    pub fn new(logger: Logger, handler: &'static str, max_body_bytes: usize) -> Self {
        Self {
            logger,
            handler,
            max_body_bytes,
        }
    }
}

/// Wrap `route` in `observer`, with a panic guard between the two so a
/// panicking handler reaches the observer as an ordinary failure.
pub fn observed<S>(route: MethodRouter<S>, observer: Observer) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route
        .layer::<_, Infallible>(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(observer, observe))
}

pub async fn observe(
    State(observer): State<Observer>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let handler = observer.handler;
    let trace_id = trace_id_of(request.extensions())
        .map(|t| t.to_string())
        .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string());
    let log = observer.logger.for_request(&trace_id);

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = Query::<BTreeMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(q)| q)
        .unwrap_or_default();
    let params: BTreeMap<&str, &str> = match &params {
        Ok(params) => params.iter().collect(),
        Err(_) => BTreeMap::new(),
    };

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, observer.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let error = AppError::rejected(StatusCode::PAYLOAD_TOO_LARGE, e.to_string());
            log.error(
                format!("{handler} - {method} {path} - request body rejected: {error}"),
                Some(NO_STACK_TRACE),
                Some(CONTEXT),
            );
            metrics::record_request(handler, method.as_str(), StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start);
            return error.into_response();
        }
    };

    let snapshot = json!({
        "body": snapshot_of(&bytes),
        "query": query,
        "params": params,
    });
    log.info(
        format!(
            "{handler} - {method} {path} - started - {}",
            LogMessage::structured(&snapshot)
        ),
        Some(CONTEXT),
    );

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;
    let elapsed = start.elapsed().as_millis();

    if let Some(Failure(error)) = response.extensions().get::<Failure>() {
        let status = classify(error, &EnvelopeConfig::default())
            .classification
            .status();
        log.error(
            format!("{handler} - failed after {elapsed}ms - {error}"),
            Some(&stack_trace(error.as_ref())),
            Some(CONTEXT),
        );
        metrics::record_request(handler, method.as_str(), status.as_u16(), start);
        return response;
    }

    let status = response.status();
    if !status.is_success() {
        log.error(
            format!("{handler} - failed after {elapsed}ms - status {status}"),
            Some(NO_STACK_TRACE),
            Some(CONTEXT),
        );
        metrics::record_request(handler, method.as_str(), status.as_u16(), start);
        return response;
    }

    let (parts, body) = response.into_parts();
    let payload = match to_bytes(body, usize::MAX).await {
        Ok(payload) => payload,
        Err(e) => {
            return AppError::Internal(format!("Failed to read response body: {e}")).into_response()
        }
    };
    log.info(
        format!(
            "{handler} - completed in {elapsed}ms - {}",
            String::from_utf8_lossy(&payload)
        ),
        Some(CONTEXT),
    );
    metrics::record_request(handler, method.as_str(), status.as_u16(), start);

    Response::from_parts(parts, Body::from(payload))
}

fn snapshot_of(bytes: &Bytes) -> Value {
    if bytes.is_empty() {
        return json!({});
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
