use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeletionPolicy;

/// At most one per (user, post).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "postId")]
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

entity!(Like, "like", DeletionPolicy::Hard);

/// At most one per (user, post).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "postId")]
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

entity!(Bookmark, "bookmark", DeletionPolicy::Hard);

/// Directed edge: `follower_id` follows `following_id`. Never a self-loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    #[serde(rename = "followerId")]
    pub follower_id: i64,
    #[serde(rename = "followingId")]
    pub following_id: i64,
    pub created_at: DateTime<Utc>,
}

entity!(Follow, "follow", DeletionPolicy::Hard);
