//! URL normalisation and save-or-skip against already stored postings.

use chrono::Utc;

use crate::error::AppError;
use crate::models::{CandidatePosting, NewPosting, Source, StoredPosting};
use crate::traits::PostingStore;

/// Strip everything from the first `#` onward.
///
/// Returns `None` for URLs that are blank before or after stripping.
pub fn normalize_url(url: &str) -> Option<String> {
    if url.trim().is_empty() {
        return None;
    }
    let stripped = url.split('#').next().unwrap_or_default();
    if stripped.trim().is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Case-insensitive URL equality used for deduplication.
pub fn same_url(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// What happened to a single candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(StoredPosting),
    /// A posting with the same normalised URL already exists.
    Duplicate,
    /// The candidate had no usable URL.
    Discarded,
}

/// Saves candidates whose normalised URL has not been seen before.
#[derive(Debug, Clone)]
pub struct Deduplicator<S: PostingStore> {
    store: S,
}

impl<S: PostingStore> Deduplicator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `candidate` unless its URL is blank or already stored.
    ///
    /// Existing postings are never updated or merged.
    pub async fn try_save(
        &self,
        candidate: CandidatePosting,
        source: &Source,
    ) -> Result<SaveOutcome, AppError> {
        let Some(url) = normalize_url(&candidate.url) else {
            return Ok(SaveOutcome::Discarded);
        };

        if self.store.contains_url(&url).await? {
            tracing::debug!(%url, "Posting already known");
            return Ok(SaveOutcome::Duplicate);
        }

        let now = Utc::now();
        let posting = NewPosting {
            source: source.display_name().to_string(),
            title: candidate.title,
            company: candidate.company,
            location: None,
            description: candidate.description,
            url,
            posted_at: now,
            fetched_at: now,
        };

        let stored = self.store.save(&posting).await?;
        tracing::info!(id = %stored.id, title = %stored.title, url = %stored.url, "Saved posting");
        Ok(SaveOutcome::Saved(stored))
    }
}
