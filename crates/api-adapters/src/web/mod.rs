//! Axum router and shared state.

pub mod error;
pub mod extract;
mod handlers;
mod middleware;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, Request};
use axum::routing::{delete, get, post, put};
use axum::Router;
use services::Services;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::metrics::Metrics;

/// Multipart overhead on top of the largest accepted image.
const BODY_LIMIT: usize = storage_adapters::local_media::MAX_UPLOAD_BYTES + 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services: Arc::new(services), metrics: Arc::new(Metrics::new()) }
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}

/// Every route, with uploads under `upload_dir` served at `/static`.
pub fn router(state: AppState, upload_dir: &Path) -> Router {
    use handlers::{admin, anonymous, auth, catalog, me, posts, social, system, users};

    let api = Router::new()
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        // auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile).put(auth::update_profile))
        .route("/auth/change-password", put(auth::change_password))
        .route("/auth/upload-avatar", post(auth::upload_avatar))
        // posts
        .route("/posts", get(posts::list).post(posts::create))
        .route("/posts/search", get(catalog::search_posts))
        .route("/posts/upload-cover", post(posts::upload_cover))
        .route("/posts/id/{id}", get(posts::get_by_id))
        .route("/posts/{id}", get(posts::get_by_slug).put(posts::update).delete(posts::delete))
        .route("/posts/{id}/like", post(social::like).delete(social::unlike))
        .route("/posts/{id}/bookmark", post(social::bookmark).delete(social::unbookmark))
        .route("/posts/{id}/status", get(social::interaction_status))
        .route("/posts/{id}/comments", get(social::comments).post(social::comment))
        .route("/comments/{id}", delete(social::delete_comment))
        .route("/comments/{id}/like", post(social::like_comment))
        // users
        .route("/users/recommended", get(users::recommended))
        .route("/users/{id}", get(users::get))
        .route("/users/{id}/avatar.svg", get(system::avatar))
        .route("/users/{id}/posts", get(users::posts))
        .route("/users/{id}/comments", get(users::comments))
        .route("/users/{id}/bookmarks", get(users::bookmarks))
        .route("/users/{id}/followers", get(users::followers))
        .route("/users/{id}/following", get(users::following))
        .route("/users/{id}/follow", post(users::follow).delete(users::unfollow))
        .route("/users/{id}/follow/status", get(users::follow_status))
        // the caller's own inbox and history
        .route("/notifications", get(me::notifications))
        .route("/notifications/unread-count", get(me::unread_count))
        .route("/notifications/read-all", put(me::mark_all_read))
        .route("/notifications/{id}/read", put(me::mark_read))
        .route("/notifications/{id}", delete(me::delete_notification))
        .route("/history", get(me::history).delete(me::clear_history))
        // tags and search
        .route("/tags", get(catalog::tags).post(catalog::create_tag))
        .route("/tags/popular", get(catalog::popular_tags))
        .route("/tags/{id}", delete(catalog::delete_tag))
        .route("/search/posts", get(catalog::search_posts))
        .route("/search/users", get(catalog::search_users))
        .route("/search/suggestions", get(catalog::suggestions))
        // anonymous board
        .route("/anonymous/messages", get(anonymous::list).post(anonymous::send))
        .route("/anonymous/messages/{id}", delete(anonymous::delete))
        // admin
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::users))
        .route("/admin/posts", get(admin::posts))
        .route("/admin/comments", get(admin::comments))
        .route("/admin/anonymous/messages", get(anonymous::admin_list))
        .route("/admin/users/{id}", delete(admin::delete_user))
        .route("/admin/posts/{id}", delete(admin::delete_post))
        .route("/admin/comments/{id}", delete(admin::delete_comment));

    api.nest_service("/static", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::track_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
