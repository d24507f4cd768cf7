use serde::{Deserialize, Serialize};

use super::DeletionPolicy;

pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    /// Unique, compared case-insensitively.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    /// Number of posts carrying this tag name.
    #[serde(default)]
    pub post_count: u64,
}

fn default_color() -> String {
    DEFAULT_TAG_COLOR.to_string()
}

entity!(Tag, "tag", DeletionPolicy::Hard);
