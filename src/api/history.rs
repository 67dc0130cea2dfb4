use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::identity::Identity;
use super::{SharedState, json_response};
use crate::history::{
    HistoryError, HistoryErrorType, parse_history_id, parse_limit, validate_create_request,
};

#[derive(Serialize)]
struct HistoryOk<T> {
    ok: bool,
    data: T,
}

#[derive(Serialize)]
struct HistoryErrBody<'a> {
    ok: bool,
    error: HistoryErrPayload<'a>,
}

#[derive(Serialize)]
struct HistoryErrPayload<'a> {
    #[serde(rename = "type")]
    kind: HistoryErrorType,
    message: &'a str,
}

impl IntoResponse for HistoryError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            HistoryErrorType::Validation => StatusCode::BAD_REQUEST,
            HistoryErrorType::Unauthorized => StatusCode::UNAUTHORIZED,
            HistoryErrorType::NotFound => StatusCode::NOT_FOUND,
            HistoryErrorType::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(message = %self.message, "history request failed");
        }
        json_response(
            status,
            HistoryErrBody {
                ok: false,
                error: HistoryErrPayload {
                    kind: self.kind,
                    message: &self.message,
                },
            },
        )
    }
}

fn ok<T: Serialize>(status: StatusCode, data: T) -> Response {
    json_response(status, HistoryOk { ok: true, data })
}

fn require_user(identity: Option<Identity>) -> Result<Identity, HistoryError> {
    identity.ok_or_else(|| {
        HistoryError::new(HistoryErrorType::Unauthorized, "Authentication required")
    })
}

pub(super) async fn create_history_handler(
    State(state): State<SharedState>,
    identity: Option<Identity>,
    body: Bytes,
) -> Result<Response, HistoryError> {
    let identity = require_user(identity)?;
    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| HistoryError::validation("Request body must be an object"))?;
    let request = validate_create_request(&body)?;

    let detail = state.history.insert(&identity.user_id, request).await?;
    info!(user_id = %identity.user_id, history_id = %detail.item.id, "roadmap history saved");
    Ok(ok(StatusCode::CREATED, detail))
}

pub(super) async fn list_history_handler(
    State(state): State<SharedState>,
    identity: Option<Identity>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, HistoryError> {
    let identity = require_user(identity)?;
    let limit = parse_limit(
        query.get("limit").map(String::as_str),
        state.config.history_default_limit,
        state.config.history_max_limit,
    )?;
    let items = state.history.list(&identity.user_id, limit).await?;
    Ok(ok(StatusCode::OK, items))
}

pub(super) async fn get_history_handler(
    State(state): State<SharedState>,
    identity: Option<Identity>,
    Path(raw_id): Path<String>,
) -> Result<Response, HistoryError> {
    let identity = require_user(identity)?;
    let id = parse_history_id(&raw_id)?;
    match state.history.get(&identity.user_id, id).await? {
        Some(detail) => Ok(ok(StatusCode::OK, detail)),
        None => Err(HistoryError::new(
            HistoryErrorType::NotFound,
            "History not found",
        )),
    }
}
