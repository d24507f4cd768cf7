use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::DeletionPolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Published,
    Draft,
}

/// A blog article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    /// URL slug, unique across the collection.
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "authorId")]
    pub author_id: i64,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub views_count: u64,
    /// Always equal to the number of live comments on this post.
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub bookmarks_count: u64,
    #[serde(default)]
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Client identifier -> last time that client was counted as a view.
    #[serde(default)]
    pub view_records: BTreeMap<String, DateTime<Utc>>,
}

entity!(Post, "post", DeletionPolicy::Cascade);

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Refreshes the client's view record and reports whether this visit
    /// counts as a new view (first visit, or last one older than `window`).
    pub fn register_view(&mut self, client: &str, now: DateTime<Utc>, window: Duration) -> bool {
        let counted = match self.view_records.get(client) {
            Some(last) => now.signed_duration_since(*last) >= window,
            None => true,
        };
        self.view_records.insert(client.to_string(), now);
        if counted {
            self.views_count += 1;
        }
        counted
    }
}
