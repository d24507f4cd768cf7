use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{Page, PageRequest};
use serde::Deserialize;
use services::views::{AdminAnonymousMessageView, AnonymousMessageView};

use crate::web::error::ApiResult;
use crate::web::extract::{ClientIp, CurrentUser};
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct NewMessage {
    pub content: String,
}

pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<AnonymousMessageView>>> {
    Ok(Json(state.services.anonymous.list(page).await?))
}

pub async fn send(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(msg): Json<NewMessage>,
) -> ApiResult<(StatusCode, Json<AnonymousMessageView>)> {
    let view = state.services.anonymous.send(&msg.content, &ip).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn admin_list(
    State(state): State<AppState>,
    me: CurrentUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<AdminAnonymousMessageView>>> {
    Ok(Json(state.services.anonymous.admin_list(&me.user, page).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<AdminAnonymousMessageView>> {
    Ok(Json(state.services.anonymous.delete(&me.user, id).await?))
}
