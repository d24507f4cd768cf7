use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{CascadeReport, Page};
use serde::Deserialize;
use services::posts::{NewPost, PostPatch, PostQuery};
use services::views::PostView;

use crate::web::error::ApiResult;
use crate::web::extract::{image_upload, ClientIp, CurrentUser, MaybeUser};
use crate::web::AppState;

pub async fn list(State(state): State<AppState>, Query(query): Query<PostQuery>) -> ApiResult<Json<Page<PostView>>> {
    Ok(Json(state.services.posts.list(&query).await?))
}

/// Counts a view; signed-in readers also get a history entry.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    MaybeUser(viewer): MaybeUser,
    ClientIp(ip): ClientIp,
) -> ApiResult<Json<PostView>> {
    Ok(Json(state.services.posts.get_by_slug(&slug, viewer.as_ref(), &ip).await?))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MaybeUser(viewer): MaybeUser,
) -> ApiResult<Json<PostView>> {
    Ok(Json(state.services.posts.get_by_id(id, viewer.as_ref()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    me: CurrentUser,
    Json(input): Json<NewPost>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    let post = state.services.posts.create(&me.user, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
    Json(patch): Json<PostPatch>,
) -> ApiResult<Json<PostView>> {
    Ok(Json(state.services.posts.update(&me.user, id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CascadeReport>> {
    Ok(Json(state.services.posts.delete(&me.user, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CoverTarget {
    pub post_id: i64,
}

pub async fn upload_cover(
    State(state): State<AppState>,
    me: CurrentUser,
    Query(target): Query<CoverTarget>,
    multipart: Multipart,
) -> ApiResult<Json<PostView>> {
    let (data, content_type) = image_upload(multipart).await?;
    Ok(Json(
        state
            .services
            .posts
            .set_cover(&me.user, target.post_id, data, content_type)
            .await?,
    ))
}
