use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeletionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Comment,
    Reply,
    Like,
    Follow,
    #[serde(other)]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedType {
    Post,
    Comment,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    /// Recipient.
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "relatedId", default)]
    pub related_id: Option<i64>,
    #[serde(rename = "relatedType", default)]
    pub related_type: Option<RelatedType>,
    #[serde(rename = "isRead", default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

entity!(Notification, "notification", DeletionPolicy::Hard);

impl Notification {
    pub fn is_about(&self, ty: RelatedType, id: i64) -> bool {
        self.related_type == Some(ty) && self.related_id == Some(id)
    }
}
