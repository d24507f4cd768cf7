use axum::extract::{Path, Query, State};
use axum::Json;
use domains::models::PublicUser;
use domains::{AppError, Page, PageRequest};
use serde::Deserialize;
use services::views::{CommentView, FollowStatus, PostView};

use crate::web::error::ApiResult;
use crate::web::extract::{CurrentUser, MaybeUser};
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_recommended")]
    pub limit: usize,
}

fn default_recommended() -> usize {
    5
}

pub async fn recommended(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let viewer = viewer.map(|u| u.id);
    Ok(Json(state.services.users.recommended(viewer, q.limit.min(50)).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.services.users.get(id).await?))
}

pub async fn posts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MaybeUser(viewer): MaybeUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<PostView>>> {
    Ok(Json(state.services.users.posts(id, viewer.as_ref(), page).await?))
}

pub async fn comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<CommentView>>> {
    Ok(Json(state.services.comments.by_user(id, page).await?))
}

/// Only the owner and admins see a bookmark list.
pub async fn bookmarks(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<PostView>>> {
    if !me.user.can_modify(id) {
        return Err(AppError::forbidden("bookmarks are private").into());
    }
    Ok(Json(state.services.users.bookmarks(id, page).await?))
}

pub async fn followers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<PublicUser>>> {
    Ok(Json(state.services.follows.followers(id, page).await?))
}

pub async fn following(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<PublicUser>>> {
    Ok(Json(state.services.follows.following(id, page).await?))
}

pub async fn follow(State(state): State<AppState>, me: CurrentUser, Path(id): Path<i64>) -> ApiResult<Json<FollowStatus>> {
    Ok(Json(state.services.follows.follow(&me.user, id).await?))
}

pub async fn unfollow(State(state): State<AppState>, me: CurrentUser, Path(id): Path<i64>) -> ApiResult<Json<FollowStatus>> {
    Ok(Json(state.services.follows.unfollow(&me.user, id).await?))
}

pub async fn follow_status(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<FollowStatus>> {
    Ok(Json(state.services.follows.status(me.user.id, id).await?))
}
