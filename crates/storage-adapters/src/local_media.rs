//! # LocalMediaStorage
//!
//! Local filesystem implementation of `MediaStorage`.
//! Layout: `<root>/<avatars|covers>/<owner id>.<ext>`, served under `url_prefix`.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use domains::ports::{MediaKind, MediaStorage};
use domains::{AppError, Result};
use mime::Mime;
use tokio::fs;

/// Uploads above this size are rejected.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub struct LocalMediaStorage {
    /// Root directory for all uploads (e.g., "./uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static")
    url_prefix: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root_path: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates the side-tree directories.
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        for kind in [MediaKind::Avatar, MediaKind::Cover] {
            fs::create_dir_all(self.root_path.join(kind.dir())).await?;
        }
        Ok(())
    }

    pub fn root(&self) -> &PathBuf {
        &self.root_path
    }
}

/// Sniffs the payload and returns the file extension to store it under.
fn image_extension(data: &[u8], content_type: Option<&Mime>) -> Result<&'static str> {
    if data.is_empty() {
        return Err(AppError::validation("empty upload"));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::validation(format!(
            "upload exceeds {} bytes",
            MAX_UPLOAD_BYTES
        )));
    }
    if let Some(ct) = content_type {
        if ct.type_() != mime::IMAGE {
            return Err(AppError::validation(format!("expected an image, got {ct}")));
        }
    }
    let format = image::guess_format(data)
        .map_err(|_| AppError::validation("unrecognised image format"))?;
    format
        .extensions_str()
        .first()
        .copied()
        .ok_or_else(|| AppError::validation("unsupported image format"))
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store_image(
        &self,
        kind: MediaKind,
        owner_id: i64,
        data: Bytes,
        content_type: Option<Mime>,
    ) -> Result<String> {
        let ext = image_extension(&data, content_type.as_ref())?;
        let dir = self.root_path.join(kind.dir());
        let file_name = format!("{owner_id}.{ext}");

        fs::create_dir_all(&dir).await.map_err(anyhow::Error::from)?;
        fs::write(dir.join(&file_name), &data)
            .await
            .map_err(anyhow::Error::from)?;

        tracing::info!(kind = kind.dir(), owner_id, bytes = data.len(), "stored upload");
        Ok(format!("{}/{}/{}", self.url_prefix, kind.dir(), file_name))
    }
}
