use std::sync::Arc;

use chrono::Utc;
use domains::models::{Notification, NotificationKind, Records, RelatedType};
use domains::{AppError, Document, Page, PageRequest, Result};
use serde::Deserialize;

use crate::db::Db;

/// What to tell whom. Built by the operation that triggers it.
pub(crate) struct Notice {
    pub recipient: i64,
    pub actor: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub content: String,
    pub related: Option<(RelatedType, i64)>,
}

/// Appends a notification inside an ongoing mutation. Nobody is notified of
/// their own action.
pub(crate) fn notify(doc: &mut Document, notice: Notice) {
    if notice.recipient == notice.actor {
        return;
    }
    let id = doc.notifications.next_id();
    doc.notifications.push(Notification {
        id,
        user_id: notice.recipient,
        kind: notice.kind,
        title: notice.title,
        content: notice.content,
        related_id: notice.related.map(|(_, id)| id),
        related_type: notice.related.map(|(ty, _)| ty),
        is_read: false,
        created_at: Utc::now(),
    });
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn first_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    domains::pagination::DEFAULT_LIMIT
}

impl Default for NotificationQuery {
    fn default() -> Self {
        Self { unread_only: false, page: first_page(), limit: default_limit() }
    }
}

pub struct NotificationService {
    db: Arc<Db>,
}

impl NotificationService {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Newest first.
    pub async fn list(&self, user_id: i64, query: NotificationQuery) -> Result<Page<Notification>> {
        let doc = self.db.read().await?;
        let mut mine: Vec<Notification> = doc
            .notifications
            .into_iter()
            .rev()
            .filter(|n| n.user_id == user_id && (!query.unread_only || !n.is_read))
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Page::slice(mine, PageRequest::new(query.page, query.limit))
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<usize> {
        let doc = self.db.read().await?;
        Ok(doc
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count())
    }

    #[tracing::instrument(skip(self))]
    pub async fn mark_read(&self, user_id: i64, id: i64) -> Result<Notification> {
        self.db
            .mutate(|doc| {
                let n = doc.notifications.fetch_mut(id)?;
                if n.user_id != user_id {
                    return Err(AppError::forbidden("not your notification"));
                }
                n.is_read = true;
                Ok(n.clone())
            })
            .await
    }

    /// Returns how many notifications changed state.
    #[tracing::instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: i64) -> Result<usize> {
        self.db
            .mutate(|doc| {
                let mut changed = 0;
                for n in doc.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
                    n.is_read = true;
                    changed += 1;
                }
                Ok(changed)
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<()> {
        self.db
            .mutate(|doc| {
                if doc.notifications.fetch(id)?.user_id != user_id {
                    return Err(AppError::forbidden("not your notification"));
                }
                doc.delete::<Notification>(id, user_id, Utc::now())?;
                Ok(())
            })
            .await
    }
}
