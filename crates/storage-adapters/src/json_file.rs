//! # JsonFileStore
//!
//! `DocumentStore` over one pretty-printed JSON file. Saves go through a
//! sibling temp file that is fsynced and renamed over the target, so a crash
//! mid-write leaves either the old or the new document, never half of one.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use domains::ports::DocumentStore;
use domains::Document;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty document if none exists yet. Returns `true` when it did.
    pub async fn init_if_missing(&self) -> anyhow::Result<bool> {
        if fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        self.save(&Document::default()).await?;
        tracing::info!(path = %self.path.display(), "created empty document");
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self) -> anyhow::Result<Document> {
        let raw = fs::read(&self.path)
            .await
            .with_context(|| format!("reading document {}", self.path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("malformed document {}", self.path.display()))
    }

    async fn save(&self, doc: &Document) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(doc)?;
        let tmp = self.temp_path();

        let mut file = fs::File::create(&tmp)
            .await
            .with_context(|| format!("creating {}", tmp.display()))?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing document {}", self.path.display()))?;
        tracing::debug!(bytes = body.len(), "document saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::models::Tag;

    #[tokio::test]
    async fn load_fails_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn load_fails_when_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[tokio::test]
    async fn save_then_load_and_no_temp_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("db.json"));
        assert!(store.init_if_missing().await.unwrap());
        assert!(!store.init_if_missing().await.unwrap());

        let mut doc = store.load().await.unwrap();
        doc.tags.push(Tag {
            id: 1,
            name: "rust".into(),
            description: "systems".into(),
            color: "#FF0000".into(),
            post_count: 0,
        });
        tokio_test::assert_ok!(store.save(&doc).await);

        assert_eq!(store.load().await.unwrap(), doc);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn persisted_keys_are_the_collection_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        store.init_if_missing().await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        for key in [
            "users", "posts", "comments", "tags", "likes", "bookmarks", "follows",
            "notifications", "history", "anonymous_messages",
        ] {
            assert!(raw[key].is_array(), "missing {key}");
        }
    }
}
