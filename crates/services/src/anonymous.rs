//! The anonymous message board. Senders are identified only by a keyed hash
//! of their address, which never leaves this module.

use std::sync::Arc;

use chrono::Utc;
use domains::models::{AnonymousMessage, Records, User};
use domains::ports::AuthProvider;
use domains::{Page, PageRequest, Result};

use crate::db::Db;
use crate::validate::{self, ContentFilter};
use crate::views::{AdminAnonymousMessageView, AnonymousMessageView};
use crate::{live_account, require_admin};

pub struct AnonymousService {
    db: Arc<Db>,
    auth: Arc<dyn AuthProvider>,
    filter: ContentFilter,
}

impl AnonymousService {
    pub fn new(db: Arc<Db>, auth: Arc<dyn AuthProvider>, filter: ContentFilter) -> Self {
        Self { db, auth, filter }
    }

    /// Visible messages, newest first.
    pub async fn list(&self, page: PageRequest) -> Result<Page<AnonymousMessageView>> {
        let doc = self.db.read().await?;
        let mut visible: Vec<&AnonymousMessage> =
            doc.anonymous_messages.iter().filter(|m| !m.is_deleted).collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::slice(visible, page)?.map(AnonymousMessageView::from))
    }

    #[tracing::instrument(skip(self, content, client_ip))]
    pub async fn send(&self, content: &str, client_ip: &str) -> Result<AnonymousMessageView> {
        let content = validate::length("content", content, 1, validate::MAX_ANONYMOUS_LEN)?.to_string();
        self.filter.check(&content)?;
        let ip_hash = self.auth.hash_ip(client_ip);

        let view = self
            .db
            .mutate(|doc| {
                let id = doc.anonymous_messages.next_id();
                let msg = AnonymousMessage {
                    id,
                    content,
                    created_at: Utc::now(),
                    ip_hash,
                    is_deleted: false,
                    deleted_at: None,
                    deleted_by: None,
                };
                let view = AnonymousMessageView::from(&msg);
                doc.anonymous_messages.push(msg);
                Ok(view)
            })
            .await?;
        tracing::info!(message_id = view.id, "anonymous message posted");
        Ok(view)
    }

    /// Everything, deleted messages included, newest first.
    pub async fn admin_list(&self, actor: &User, page: PageRequest) -> Result<Page<AdminAnonymousMessageView>> {
        require_admin(actor)?;
        let doc = self.db.read().await?;
        let mut all: Vec<&AnonymousMessage> = doc.anonymous_messages.iter().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::slice(all, page)?.map(AdminAnonymousMessageView::from))
    }

    /// Soft delete. A message that is already gone reads as not found.
    #[tracing::instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn delete(&self, actor: &User, id: i64) -> Result<AdminAnonymousMessageView> {
        require_admin(actor)?;
        let view = self
            .db
            .mutate(|doc| {
                live_account(doc, actor.id)?;
                doc.delete::<AnonymousMessage>(id, actor.id, Utc::now())?;
                Ok(AdminAnonymousMessageView::from(doc.anonymous_messages.fetch(id)?))
            })
            .await?;
        tracing::info!(message_id = id, "anonymous message removed");
        Ok(view)
    }
}
