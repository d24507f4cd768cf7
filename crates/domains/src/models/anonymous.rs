use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeletionPolicy;

/// A message posted without an account. Only ever soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymousMessage {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Keyed hash of the sender's address. Must never appear in a response.
    pub ip_hash: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Id of the admin who removed it.
    #[serde(default)]
    pub deleted_by: Option<i64>,
}

entity!(AnonymousMessage, "anonymous message", DeletionPolicy::Soft);

impl AnonymousMessage {
    pub fn soft_delete(&mut self, by: i64, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
        self.deleted_by = Some(by);
    }
}
