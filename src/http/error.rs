//! Pipeline error type and fault classification.
//!
//! Handlers and middleware return [`AppError`]. Its `IntoResponse` impl renders
//! no body: it parks the error in the response extensions as a [`Failure`] so
//! the observer can log it and the fault translator can decide the final
//! status and message. Nothing else decides what a caller sees.

use std::error::Error as StdError;
use std::sync::{Arc, LazyLock};

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use regex::Regex;
use thiserror::Error;

use crate::config::EnvelopeConfig;
use crate::inventory::StoreError;

pub const NOT_FOUND_MESSAGE: &str = "No matching record found, please verify the query conditions.";
pub const DUPLICATE_MESSAGE: &str = "Data already exists, please check the input.";
pub const UNKNOWN_ARGUMENT_MESSAGE: &str =
    "Unrecognized parameter, please verify the parameter names.";
pub const INVALID_VALUE_MESSAGE: &str = "Invalid parameter value, please check the input.";
pub const FALLBACK_MESSAGE: &str = "Operation failed, please retry later.";
pub const NO_STACK_TRACE: &str = "no stack trace available";

static UNKNOWN_ARGUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Unknown argument `(\w+)`").expect("static pattern"));

static INVALID_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Argument `(\w+)`: Invalid value provided\. Expected (.+), provided (.+)\.")
        .expect("static pattern")
});

/// Any failure raised while serving a request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Rejected by the framework before or around the handler
    /// (unmatched route, bad JSON, oversized body, timeout).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("handler panicked: {0}")]
    Panic(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Error for a response some layer produced with an error status and no
    /// attached failure.
    pub fn from_status(status: StatusCode) -> Self {
        Self::rejected(
            status,
            status.canonical_reason().unwrap_or("Request failed"),
        )
    }
}

/// Response extension carrying the error to the fault translator.
#[derive(Debug, Clone)]
pub struct Failure(pub Arc<AppError>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(Failure(Arc::new(self)));
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

/// Router fallback: every unmatched path is a failure envelope.
pub async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::rejected(
        StatusCode::NOT_FOUND,
        format!("Cannot {method} {}", uri.path()),
    )
}

/// Outward status category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    NotFound,
    BadRequest,
    InternalError,
}

impl Classification {
    pub fn status(self) -> StatusCode {
        match self {
            Classification::NotFound => StatusCode::NOT_FOUND,
            Classification::BadRequest => StatusCode::BAD_REQUEST,
            Classification::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn for_status(status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            Classification::NotFound
        } else if status.is_client_error() && status != StatusCode::REQUEST_TIMEOUT {
            Classification::BadRequest
        } else {
            Classification::InternalError
        }
    }
}

/// Classification plus the caller-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub classification: Classification,
    pub message: String,
}

impl Fault {
    fn new(classification: Classification, message: impl Into<String>) -> Self {
        Self {
            classification,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(Classification::InternalError, message)
    }
}

/// Decide status and message for `error`.
///
/// Structured store signals win, then framework rejections, then the
/// argument-message patterns, then the error text itself.
pub fn classify(error: &AppError, policy: &EnvelopeConfig) -> Fault {
    match error {
        AppError::Store(StoreError::NotFound) => {
            return Fault::new(Classification::NotFound, NOT_FOUND_MESSAGE)
        }
        AppError::Store(StoreError::UniqueViolation(_)) => {
            return Fault::new(Classification::BadRequest, DUPLICATE_MESSAGE)
        }
        AppError::Store(StoreError::InvalidInput(message)) => {
            return Fault::new(Classification::BadRequest, message.clone())
        }
        AppError::Rejected { status, message } => {
            return Fault::new(Classification::for_status(*status), message.clone())
        }
        _ => {}
    }

    let message = error.to_string();
    if message.contains("Unknown argument") {
        return Fault::internal(match UNKNOWN_ARGUMENT.captures(&message) {
            Some(caps) => format!(
                "Unrecognized parameter {}, please verify the parameter name.",
                &caps[1]
            ),
            None => UNKNOWN_ARGUMENT_MESSAGE.to_string(),
        });
    }
    if message.contains("Invalid value provided") {
        return Fault::internal(match INVALID_VALUE.captures(&message) {
            Some(caps) => format!(
                "Parameter {} has the wrong type: expected {}, provided {}.",
                &caps[1], &caps[2], &caps[3]
            ),
            None => INVALID_VALUE_MESSAGE.to_string(),
        });
    }
    if !message.is_empty() && policy.expose_internal_messages {
        return Fault::internal(message);
    }
    Fault::internal(FALLBACK_MESSAGE)
}

/// The error's cause chain, one cause per line.
pub fn stack_trace(error: &(dyn StdError + 'static)) -> String {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    if causes.is_empty() {
        NO_STACK_TRACE.to_string()
    } else {
        causes.join("\n")
    }
}
