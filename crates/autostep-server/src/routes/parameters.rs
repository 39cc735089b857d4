use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/parameters: every process parameter.
pub async fn list_parameters(State(app): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(app.orchestrator.parameters().all())
}

/// GET /api/parameters/{key}: one parameter; unset keys read as `""`.
pub async fn get_parameter(
    State(app): State<AppState>,
    Path(key): Path<String>,
) -> Json<serde_json::Value> {
    let value = app.orchestrator.parameters().get(&key);
    Json(serde_json::json!({ "key": key, "value": value }))
}

#[derive(Deserialize)]
pub struct SetParameterBody {
    value: String,
}

/// PUT /api/parameters/{key}: set and persist a parameter.
pub async fn set_parameter(
    State(app): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<SetParameterBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if key.trim().is_empty() {
        return Err(AppError::bad_request("parameter key must not be empty"));
    }
    let store = app.orchestrator.parameters().clone();
    let (k, v) = (key.clone(), body.value.clone());
    tokio::task::spawn_blocking(move || store.set(&k, &v))
        .await??;
    Ok(Json(serde_json::json!({ "key": key, "value": body.value })))
}

/// DELETE /api/parameters/{key}
pub async fn delete_parameter(
    State(app): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    let store = app.orchestrator.parameters().clone();
    let removed = tokio::task::spawn_blocking(move || store.remove(&key))
        .await??;
    Ok(if removed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}
