//! Tags and search.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use domains::models::{PublicUser, Tag};
use domains::pagination::DEFAULT_LIMIT;
use domains::{Page, PageRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use services::tags::NewTag;
use services::views::{PostView, Suggestion};

use crate::web::error::ApiResult;
use crate::web::extract::CurrentUser;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl SearchQuery {
    fn page(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

fn first_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "default_popular")]
    pub limit: usize,
}

fn default_popular() -> usize {
    10
}

pub async fn tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.services.tags.list().await?))
}

pub async fn popular_tags(State(state): State<AppState>, Query(q): Query<PopularQuery>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.services.tags.popular(q.limit).await?))
}

pub async fn create_tag(
    State(state): State<AppState>,
    me: CurrentUser,
    Json(input): Json<NewTag>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let tag = state.services.tags.create(&me.user, input).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn delete_tag(State(state): State<AppState>, me: CurrentUser, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.services.tags.delete(&me.user, id).await?;
    Ok(Json(json!({ "message": "tag deleted" })))
}

pub async fn search_posts(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> ApiResult<Json<Page<PostView>>> {
    Ok(Json(state.services.search.posts(&q.q, q.page()).await?))
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<Page<PublicUser>>> {
    Ok(Json(state.services.search.users(&q.q, q.page()).await?))
}

pub async fn suggestions(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> ApiResult<Json<Vec<Suggestion>>> {
    Ok(Json(state.services.search.suggestions(&q.q).await?))
}
