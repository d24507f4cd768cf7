use axum::extract::{Path, Query, State};
use axum::Json;
use domains::models::PublicUser;
use domains::{AppError, CascadeReport, Page, PageRequest};
use services::views::{CommentView, PostView, Stats};

use crate::web::error::{ApiError, ApiResult};
use crate::web::extract::CurrentUser;
use crate::web::AppState;

/// The admin routes reuse owner-or-admin service calls; gate them here.
fn admin_only(me: &CurrentUser) -> Result<(), ApiError> {
    if me.user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("administrator role required").into())
    }
}

pub async fn stats(State(state): State<AppState>, me: CurrentUser) -> ApiResult<Json<Stats>> {
    Ok(Json(state.services.admin.stats(&me.user).await?))
}

pub async fn users(
    State(state): State<AppState>,
    me: CurrentUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<PublicUser>>> {
    Ok(Json(state.services.admin.users(&me.user, page).await?))
}

pub async fn posts(
    State(state): State<AppState>,
    me: CurrentUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<PostView>>> {
    Ok(Json(state.services.admin.posts(&me.user, page).await?))
}

pub async fn comments(
    State(state): State<AppState>,
    me: CurrentUser,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<CommentView>>> {
    Ok(Json(state.services.admin.comments(&me.user, page).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CascadeReport>> {
    Ok(Json(state.services.users.delete(&me.user, id).await?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CascadeReport>> {
    admin_only(&me)?;
    Ok(Json(state.services.posts.delete(&me.user, id).await?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CascadeReport>> {
    admin_only(&me)?;
    Ok(Json(state.services.comments.delete(&me.user, id).await?))
}
