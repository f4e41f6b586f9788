//! In-memory stores, used when persistence is not needed (one-off CLI scrapes) and in tests.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewPosting, NewSource, Source, StoredPosting};
use crate::traits::{PostingStore, SourceStore};

/// Source store backed by a `Vec`, preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    sources: Arc<Mutex<Vec<Source>>>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(sources: Vec<Source>) -> Self {
        Self {
            sources: Arc::new(Mutex::new(sources)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Source>>, AppError> {
        self.sources
            .lock()
            .map_err(|_| AppError::DatabaseError("source store lock poisoned".into()))
    }
}

impl SourceStore for MemorySources {
    async fn list_all(&self) -> Result<Vec<Source>, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Source>, AppError> {
        Ok(self.lock()?.iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, source: &NewSource) -> Result<Source, AppError> {
        let created = Source {
            id: Uuid::new_v4(),
            name: source.name.clone(),
            url: source.url.clone(),
            selector: source.selector.clone(),
            kind: source.kind,
        };
        self.lock()?.push(created.clone());
        Ok(created)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.lock()?.len() as u64)
    }
}

/// Posting store backed by a `Vec`. Deduplication lookups scan linearly.
#[derive(Debug, Clone, Default)]
pub struct MemoryPostings {
    postings: Arc<Mutex<Vec<StoredPosting>>>,
}

impl MemoryPostings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored so far.
    pub fn snapshot(&self) -> Vec<StoredPosting> {
        self.postings
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredPosting>>, AppError> {
        self.postings
            .lock()
            .map_err(|_| AppError::DatabaseError("posting store lock poisoned".into()))
    }
}

impl PostingStore for MemoryPostings {
    async fn list_all(&self) -> Result<Vec<StoredPosting>, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredPosting>, AppError> {
        Ok(self.lock()?.iter().find(|p| p.id == id).cloned())
    }

    async fn save(&self, posting: &NewPosting) -> Result<StoredPosting, AppError> {
        let stored = posting.clone().into_stored(Uuid::new_v4());
        self.lock()?.push(stored.clone());
        Ok(stored)
    }
}
