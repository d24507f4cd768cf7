use std::sync::Arc;

use chrono::Utc;
use domains::models::{History, Records};
use domains::Result;

use crate::db::Db;
use crate::live_account;
use crate::views::HistoryEntry;

pub struct HistoryService {
    db: Arc<Db>,
}

impl HistoryService {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Marks `post_id` as visited now. Reading a post by slug does this too.
    pub async fn record(&self, user_id: i64, post_id: i64) -> Result<()> {
        self.db
            .mutate(|doc| {
                live_account(doc, user_id)?;
                doc.posts.fetch(post_id)?;
                doc.touch_history(user_id, post_id, Utc::now());
                Ok(())
            })
            .await
    }

    /// Most recent visit first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<HistoryEntry>> {
        let doc = self.db.read().await?;
        let mut mine: Vec<&History> = doc.history.iter().filter(|h| h.user_id == user_id).collect();
        mine.sort_by(|a, b| (b.visited_at, b.id).cmp(&(a.visited_at, a.id)));
        Ok(mine
            .into_iter()
            .filter_map(|h| {
                let post = doc.posts.by_id(h.post_id)?;
                Some(HistoryEntry {
                    id: h.id,
                    post_id: post.id,
                    slug: post.slug.clone(),
                    title: post.title.clone(),
                    visited_at: h.visited_at,
                })
            })
            .collect())
    }

    /// Returns how many entries were removed.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: i64) -> Result<usize> {
        self.db
            .mutate(|doc| {
                let before = doc.history.len();
                doc.history.retain(|h| h.user_id != user_id);
                Ok(before - doc.history.len())
            })
            .await
    }
}
