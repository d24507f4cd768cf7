//! The caller's notifications and reading history.

use axum::extract::{Path, Query, State};
use axum::Json;
use domains::models::Notification;
use domains::Page;
use serde_json::{json, Value};
use services::notifications::NotificationQuery;
use services::views::HistoryEntry;

use crate::web::error::ApiResult;
use crate::web::extract::CurrentUser;
use crate::web::AppState;

pub async fn notifications(
    State(state): State<AppState>,
    me: CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Json<Page<Notification>>> {
    Ok(Json(state.services.notifications.list(me.user.id, query).await?))
}

pub async fn unread_count(State(state): State<AppState>, me: CurrentUser) -> ApiResult<Json<Value>> {
    let count = state.services.notifications.unread_count(me.user.id).await?;
    Ok(Json(json!({ "count": count })))
}

pub async fn mark_all_read(State(state): State<AppState>, me: CurrentUser) -> ApiResult<Json<Value>> {
    let updated = state.services.notifications.mark_all_read(me.user.id).await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(state.services.notifications.mark_read(me.user.id, id).await?))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.services.notifications.delete(me.user.id, id).await?;
    Ok(Json(json!({ "message": "notification deleted" })))
}

pub async fn history(State(state): State<AppState>, me: CurrentUser) -> ApiResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.services.history.list(me.user.id).await?))
}

pub async fn clear_history(State(state): State<AppState>, me: CurrentUser) -> ApiResult<Json<Value>> {
    let removed = state.services.history.clear(me.user.id).await?;
    Ok(Json(json!({ "removed": removed })))
}
