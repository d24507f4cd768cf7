//! Comments, likes and bookmarks.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::CascadeReport;
use services::comments::NewComment;
use services::views::{CommentView, InteractionStatus};

use crate::web::error::ApiResult;
use crate::web::extract::CurrentUser;
use crate::web::AppState;

pub async fn like(State(state): State<AppState>, me: CurrentUser, Path(id): Path<i64>) -> ApiResult<Json<InteractionStatus>> {
    Ok(Json(state.services.interactions.like(&me.user, id).await?))
}

pub async fn unlike(State(state): State<AppState>, me: CurrentUser, Path(id): Path<i64>) -> ApiResult<Json<InteractionStatus>> {
    Ok(Json(state.services.interactions.unlike(&me.user, id).await?))
}

pub async fn bookmark(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<InteractionStatus>> {
    Ok(Json(state.services.interactions.bookmark(&me.user, id).await?))
}

pub async fn unbookmark(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<InteractionStatus>> {
    Ok(Json(state.services.interactions.unbookmark(&me.user, id).await?))
}

pub async fn interaction_status(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<InteractionStatus>> {
    Ok(Json(state.services.interactions.status(me.user.id, id).await?))
}

pub async fn comments(State(state): State<AppState>, Path(post_id): Path<i64>) -> ApiResult<Json<Vec<CommentView>>> {
    Ok(Json(state.services.comments.list(post_id).await?))
}

pub async fn comment(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(post_id): Path<i64>,
    Json(input): Json<NewComment>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let comment = state.services.comments.create(&me.user, post_id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CascadeReport>> {
    Ok(Json(state.services.comments.delete(&me.user, id).await?))
}

pub async fn like_comment(
    State(state): State<AppState>,
    _me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CommentView>> {
    Ok(Json(state.services.comments.like(id).await?))
}
