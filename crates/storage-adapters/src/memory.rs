//! In-process `DocumentStore`, used by tests and ephemeral runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use domains::ports::DocumentStore;
use domains::Document;

#[derive(Default)]
pub struct MemoryStore {
    doc: Mutex<Document>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new(doc: Document) -> Self {
        Self { doc: Mutex::new(doc), saves: AtomicUsize::new(0) }
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Current contents without going through the port.
    pub fn snapshot(&self) -> Document {
        self.doc.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> anyhow::Result<Document> {
        let doc = self.doc.lock().map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        Ok(doc.clone())
    }

    async fn save(&self, doc: &Document) -> anyhow::Result<()> {
        let mut slot = self.doc.lock().map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        *slot = doc.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
