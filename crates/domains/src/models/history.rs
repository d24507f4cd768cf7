use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeletionPolicy;

/// Most recent visit of a user to a post. One record per (user, post).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "postId")]
    pub post_id: i64,
    pub visited_at: DateTime<Utc>,
}

entity!(History, "history", DeletionPolicy::Hard);
