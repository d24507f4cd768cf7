use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use domains::AppError;
use serde_json::json;

use crate::avatar;
use crate::web::error::ApiResult;
use crate::web::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.services.health().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable" }))),
    }
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::Internal(std::io::Error::other(e).into()))?;
    Ok((
        [(header::CONTENT_TYPE, "application/openmetrics-text; version=1.0.0; charset=utf-8")],
        body,
    ))
}

pub async fn avatar(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<impl IntoResponse> {
    let user = state.services.users.get(id).await?;
    let svg = avatar::render(user.id, &user.username)
        .map_err(|e| AppError::Internal(std::io::Error::other(e.to_string()).into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        svg,
    ))
}
