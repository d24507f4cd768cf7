//! Request extractors: who is calling, and from where.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Multipart};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use bytes::Bytes;
use domains::models::User;
use domains::AppError;
use mime::Mime;

use super::error::ApiError;
use super::AppState;

/// `Authorization: Bearer <token>`; `None` when the header is absent.
fn bearer_token(parts: &Parts) -> Result<Option<String>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized("malformed authorization header"))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim().to_string()))
        }
        _ => Err(AppError::unauthorized("expected a bearer token").into()),
    }
}

/// An authenticated caller. Rejects with 401.
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or_else(|| AppError::unauthorized("missing bearer token"))?;
        let user = state.services.auth.authenticate(&token).await?;
        Ok(Self { user, token })
    }
}

/// The caller if a token was sent. A token that was sent but is not valid
/// is still a 401.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(Self(Some(state.services.auth.authenticate(&token).await?))),
            None => Ok(Self(None)),
        }
    }
}

/// First `X-Forwarded-For` hop, else the socket peer address.
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let ip = match forwarded {
            Some(ip) => ip.to_string(),
            None => parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        };
        Ok(Self(ip))
    }
}

/// Pulls the `file` part out of a multipart upload.
pub async fn image_upload(mut multipart: Multipart) -> Result<(Bytes, Option<Mime>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let content_type = field.content_type().and_then(|ct| ct.parse::<Mime>().ok());
            let data = field.bytes().await?;
            return Ok((data, content_type));
        }
    }
    Err(AppError::validation("multipart field 'file' is required").into())
}
