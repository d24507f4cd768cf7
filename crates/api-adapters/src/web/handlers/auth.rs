use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use domains::models::PublicUser;
use serde_json::{json, Value};
use services::auth::{LoginInput, LoginOutcome, PasswordChange, ProfileUpdate, RegisterInput};

use crate::web::error::ApiResult;
use crate::web::extract::{image_upload, CurrentUser};
use crate::web::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let user = state.services.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(State(state): State<AppState>, Json(input): Json<LoginInput>) -> ApiResult<Json<LoginOutcome>> {
    Ok(Json(state.services.auth.login(input).await?))
}

pub async fn logout(State(state): State<AppState>, me: CurrentUser) -> ApiResult<Json<Value>> {
    state.services.auth.logout(&me.token)?;
    Ok(Json(json!({ "message": "logged out" })))
}

pub async fn profile(State(state): State<AppState>, me: CurrentUser) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.services.auth.profile(me.user.id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    me: CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.services.auth.update_profile(me.user.id, update).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    me: CurrentUser,
    Json(change): Json<PasswordChange>,
) -> ApiResult<Json<Value>> {
    state.services.auth.change_password(me.user.id, change).await?;
    Ok(Json(json!({ "message": "password changed" })))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    me: CurrentUser,
    multipart: Multipart,
) -> ApiResult<Json<PublicUser>> {
    let (data, content_type) = image_upload(multipart).await?;
    Ok(Json(state.services.auth.set_avatar(me.user.id, data, content_type).await?))
}
