//! Likes and bookmarks on posts.

use std::sync::Arc;

use chrono::Utc;
use domains::models::{Bookmark, Like, NotificationKind, Records, RelatedType, User};
use domains::{AppError, Result};

use crate::db::Db;
use crate::live_account;
use crate::notifications::{notify, Notice};
use crate::views::InteractionStatus;

pub struct InteractionService {
    db: Arc<Db>,
}

impl InteractionService {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn like(&self, user: &User, post_id: i64) -> Result<InteractionStatus> {
        self.db
            .mutate(|doc| {
                live_account(doc, user.id)?;
                let post = doc.posts.fetch(post_id)?;
                let (author, title) = (post.author_id, post.title.clone());
                if doc.has_liked(user.id, post_id) {
                    tracing::debug!(post_id, "already liked");
                    return Err(AppError::conflict("post already liked"));
                }
                let id = doc.likes.next_id();
                doc.likes.push(Like { id, user_id: user.id, post_id, created_at: Utc::now() });
                doc.recount_post(post_id);
                notify(
                    doc,
                    Notice {
                        recipient: author,
                        actor: user.id,
                        kind: NotificationKind::Like,
                        title: format!("{} liked \"{title}\"", user.username),
                        content: String::new(),
                        related: Some((RelatedType::Post, post_id)),
                    },
                );
                Ok(InteractionStatus::of(doc, user.id, doc.posts.fetch(post_id)?))
            })
            .await
    }

    #[tracing::instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn unlike(&self, user: &User, post_id: i64) -> Result<InteractionStatus> {
        self.db
            .mutate(|doc| {
                doc.posts.fetch(post_id)?;
                let before = doc.likes.len();
                doc.likes.retain(|l| !(l.user_id == user.id && l.post_id == post_id));
                if doc.likes.len() == before {
                    return Err(AppError::not_found("like", post_id));
                }
                doc.recount_post(post_id);
                Ok(InteractionStatus::of(doc, user.id, doc.posts.fetch(post_id)?))
            })
            .await
    }

    #[tracing::instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn bookmark(&self, user: &User, post_id: i64) -> Result<InteractionStatus> {
        self.db
            .mutate(|doc| {
                live_account(doc, user.id)?;
                doc.posts.fetch(post_id)?;
                if doc.has_bookmarked(user.id, post_id) {
                    tracing::debug!(post_id, "already bookmarked");
                    return Err(AppError::conflict("post already bookmarked"));
                }
                let id = doc.bookmarks.next_id();
                doc.bookmarks.push(Bookmark { id, user_id: user.id, post_id, created_at: Utc::now() });
                doc.recount_post(post_id);
                Ok(InteractionStatus::of(doc, user.id, doc.posts.fetch(post_id)?))
            })
            .await
    }

    #[tracing::instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn unbookmark(&self, user: &User, post_id: i64) -> Result<InteractionStatus> {
        self.db
            .mutate(|doc| {
                doc.posts.fetch(post_id)?;
                let before = doc.bookmarks.len();
                doc.bookmarks.retain(|b| !(b.user_id == user.id && b.post_id == post_id));
                if doc.bookmarks.len() == before {
                    return Err(AppError::not_found("bookmark", post_id));
                }
                doc.recount_post(post_id);
                Ok(InteractionStatus::of(doc, user.id, doc.posts.fetch(post_id)?))
            })
            .await
    }

    pub async fn status(&self, user_id: i64, post_id: i64) -> Result<InteractionStatus> {
        let doc = self.db.read().await?;
        let post = doc.posts.fetch(post_id)?;
        Ok(InteractionStatus::of(&doc, user_id, post))
    }
}
