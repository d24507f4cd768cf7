//! # services
//!
//! Business logic of Inkwell. Each service owns one slice of the API and
//! talks to storage only through [`db::Db`], which serializes writers.
//! Everything outside this crate is reached through the port traits in
//! `domains::ports`.

pub mod admin;
pub mod anonymous;
pub mod auth;
pub mod comments;
pub mod db;
pub mod follows;
pub mod history;
pub mod interactions;
pub mod notifications;
pub mod posts;
pub mod search;
pub mod tags;
pub mod users;
pub mod validate;
pub mod views;

use std::sync::Arc;

use chrono::Duration;
use domains::models::{Records, User};
use domains::ports::{AuthProvider, DocumentStore, MediaStorage, SessionStore};
use domains::{AppError, Document, Result};

use crate::db::Db;
use crate::validate::ContentFilter;

pub(crate) fn require_admin(actor: &User) -> Result<()> {
    if !actor.is_admin() {
        tracing::debug!(user_id = actor.id, "admin check failed");
        return Err(AppError::forbidden("administrator role required"));
    }
    Ok(())
}

/// The acting account as it is stored now. A session can outlive its user
/// by one request; writes on its behalf are refused.
pub(crate) fn live_account(doc: &Document, user_id: i64) -> Result<&User> {
    doc.users.by_id(user_id).ok_or_else(|| {
        tracing::debug!(user_id, "actor no longer exists");
        AppError::unauthorized("account no longer exists")
    })
}

/// Adapters the services are built on.
#[derive(Clone)]
pub struct Ports {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub sessions: Arc<dyn SessionStore>,
    pub media: Arc<dyn MediaStorage>,
}

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub forbidden_words: Vec<String>,
    /// Repeat visits by one client inside this window count as one view.
    pub view_window: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { forbidden_words: Vec::new(), view_window: Duration::minutes(30) }
    }
}

/// Every service, wired to one shared [`Db`].
pub struct Services {
    pub db: Arc<Db>,
    pub auth: auth::AuthService,
    pub users: users::UserService,
    pub posts: posts::PostService,
    pub comments: comments::CommentService,
    pub interactions: interactions::InteractionService,
    pub follows: follows::FollowService,
    pub notifications: notifications::NotificationService,
    pub history: history::HistoryService,
    pub tags: tags::TagService,
    pub anonymous: anonymous::AnonymousService,
    pub admin: admin::AdminService,
    pub search: search::SearchService,
}

impl Services {
    pub fn new(ports: Ports, settings: ServiceSettings) -> Self {
        let db = Arc::new(Db::new(ports.store));
        let filter = ContentFilter::new(&settings.forbidden_words);
        Self {
            auth: auth::AuthService::new(
                db.clone(),
                ports.auth.clone(),
                ports.sessions.clone(),
                ports.media.clone(),
            ),
            users: users::UserService::new(db.clone(), ports.sessions.clone()),
            posts: posts::PostService::new(db.clone(), ports.auth.clone(), ports.media, settings.view_window),
            comments: comments::CommentService::new(db.clone(), filter.clone()),
            interactions: interactions::InteractionService::new(db.clone()),
            follows: follows::FollowService::new(db.clone()),
            notifications: notifications::NotificationService::new(db.clone()),
            history: history::HistoryService::new(db.clone()),
            tags: tags::TagService::new(db.clone()),
            anonymous: anonymous::AnonymousService::new(db.clone(), ports.auth, filter),
            admin: admin::AdminService::new(db.clone()),
            search: search::SearchService::new(db.clone()),
            db,
        }
    }

    /// Succeeds when the document can be loaded.
    pub async fn health(&self) -> Result<()> {
        self.db.read().await.map(|_| ())
    }
}
