//! The single gateway between services and the `DocumentStore` port.
//!
//! Reads load a fresh copy of the document. Mutations run one at a time:
//! lock, load, apply, save. A closure that fails aborts before anything is
//! written, so no operation is ever persisted half-done.

use std::sync::Arc;

use domains::ports::DocumentStore;
use domains::{AppError, Document, Result};
use tokio::sync::Mutex;

pub struct Db {
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl Db {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    pub async fn read(&self) -> Result<Document> {
        self.store.load().await.map_err(|e| {
            tracing::error!(error = %e, "loading document failed");
            AppError::Internal(e)
        })
    }

    /// Load-mutate-save under the writer lock. `f` sees the freshest document.
    pub async fn mutate<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read().await?;
        let out = f(&mut doc)?;
        self.store.save(&doc).await.map_err(|e| {
            tracing::error!(error = %e, "saving document failed");
            AppError::Internal(e)
        })?;
        Ok(out)
    }
}
