use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeletionPolicy;

/// A comment on a post, optionally replying to another comment on the same post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(rename = "postId")]
    pub post_id: i64,
    #[serde(rename = "authorId")]
    pub author_id: i64,
    pub content: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

entity!(Comment, "comment", DeletionPolicy::Cascade);
