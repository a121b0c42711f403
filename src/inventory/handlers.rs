//! HTTP handlers for `/phone`.
//!
//! Handlers return raw payloads; the envelope normalizer and fault translator
//! shape the final body.

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use crate::http::error::AppError;
use crate::http::extract::{JsonBody, PathParam, QueryParams};
use crate::http::request::TraceId;
use crate::http::server::AppState;
use crate::inventory::input;
use crate::inventory::types::{Page, Phone};

const CONTEXT: &str = "PhoneController";

/// `GET /phone`
pub async fn find_all(
    State(state): State<AppState>,
    trace_id: TraceId,
    QueryParams(params): QueryParams<BTreeMap<String, String>>,
) -> Result<Json<Page<Phone>>, AppError> {
    let query = input::phone_query(&params, &state.config.inventory)?;
    state.logger.for_request(&trace_id).debug(
        format!(
            "Listing phones page={} pageSize={}",
            query.page.page, query.page.page_size
        ),
        Some(CONTEXT),
    );
    Ok(Json(state.store.list(&query).await?))
}

/// `POST /phone/add`
pub async fn add(
    State(state): State<AppState>,
    trace_id: TraceId,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, Json<Phone>), AppError> {
    let phone = input::new_phone(&body)?;
    let created = state.store.create(phone).await?;
    state
        .logger
        .for_request(&trace_id)
        .debug(format!("Created phone {}", created.id), Some(CONTEXT));
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /phone/{id}`
pub async fn update(
    State(state): State<AppState>,
    trace_id: TraceId,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Phone>, AppError> {
    let changes = input::phone_changes(&body)?;
    let updated = state.store.update(id, changes).await?;
    state
        .logger
        .for_request(&trace_id)
        .debug(format!("Updated phone {id}"), Some(CONTEXT));
    Ok(Json(updated))
}

/// `DELETE /phone/{id}`: soft delete.
pub async fn remove(
    State(state): State<AppState>,
    trace_id: TraceId,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Phone>, AppError> {
    let removed = state.store.remove(id).await?;
    state
        .logger
        .for_request(&trace_id)
        .debug(format!("Removed phone {id}"), Some(CONTEXT));
    Ok(Json(removed))
}
