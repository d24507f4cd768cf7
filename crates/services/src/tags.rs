use std::sync::Arc;

use chrono::Utc;
use domains::models::{Records, Tag, User, DEFAULT_TAG_COLOR};
use domains::{AppError, Result};
use serde::Deserialize;

use crate::db::Db;
use crate::{require_admin, validate};

#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

pub struct TagService {
    db: Arc<Db>,
}

impl TagService {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// Alphabetical, case-insensitive.
    pub async fn list(&self) -> Result<Vec<Tag>> {
        let mut tags = self.db.read().await?.tags;
        tags.sort_by_key(|t| t.name.to_lowercase());
        Ok(tags)
    }

    pub async fn popular(&self, limit: usize) -> Result<Vec<Tag>> {
        let mut tags = self.db.read().await?.tags;
        tags.sort_by(|a, b| b.post_count.cmp(&a.post_count));
        tags.truncate(limit);
        Ok(tags)
    }

    #[tracing::instrument(skip(self, actor, input), fields(actor_id = actor.id, name = %input.name))]
    pub async fn create(&self, actor: &User, input: NewTag) -> Result<Tag> {
        require_admin(actor)?;
        let name = validate::length("name", &input.name, 1, validate::MAX_TAG_LEN)?.to_string();
        let color = match input.color.as_deref() {
            Some(c) => validate::color(c)?,
            None => DEFAULT_TAG_COLOR.to_string(),
        };
        let description = input.description.unwrap_or_default().trim().to_string();

        let tag = self
            .db
            .mutate(|doc| {
                if doc.tag_by_name(&name).is_some() {
                    return Err(AppError::conflict(format!("tag '{name}' already exists")));
                }
                let id = doc.tags.next_id();
                doc.tags.push(Tag { id, name, description, color, post_count: 0 });
                doc.recount_tags();
                Ok(doc.tags.fetch(id)?.clone())
            })
            .await?;
        tracing::info!(tag_id = tag.id, "tag created");
        Ok(tag)
    }

    /// Posts keep the tag name in their own tag lists.
    #[tracing::instrument(skip(self, actor), fields(actor_id = actor.id))]
    pub async fn delete(&self, actor: &User, id: i64) -> Result<()> {
        require_admin(actor)?;
        self.db
            .mutate(|doc| {
                doc.delete::<Tag>(id, actor.id, Utc::now())?;
                Ok(())
            })
            .await?;
        tracing::info!(tag_id = id, "tag deleted");
        Ok(())
    }
}
