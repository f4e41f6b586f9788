use std::future::Future;

use uuid::Uuid;

use crate::dedup::same_url;
use crate::error::AppError;
use crate::models::{NewPosting, NewSource, Source, StoredPosting};

/// What a fetch is for. Implementations pick timeouts and content-type policy from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// An HTML document; non-textual content types are rejected.
    Page,
    /// Raw feed content; content type is ignored.
    Feed,
    /// A `robots.txt` file; short timeout, content type ignored.
    Robots,
}

/// Fetches the body of a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(
        &self,
        url: &str,
        kind: FetchKind,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Read access to configured sources, plus the administrative writes the server exposes.
pub trait SourceStore: Send + Sync + Clone {
    /// All sources in listing order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Source>, AppError>> + Send;

    fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<Source>, AppError>> + Send;

    fn create(&self, source: &NewSource) -> impl Future<Output = Result<Source, AppError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, AppError>> + Send;
}

/// Persists and retrieves harvested postings.
pub trait PostingStore: Send + Sync + Clone {
    fn list_all(&self) -> impl Future<Output = Result<Vec<StoredPosting>, AppError>> + Send;

    fn get(&self, id: Uuid)
    -> impl Future<Output = Result<Option<StoredPosting>, AppError>> + Send;

    /// Save a new posting. Returns it with its assigned id.
    fn save(
        &self,
        posting: &NewPosting,
    ) -> impl Future<Output = Result<StoredPosting, AppError>> + Send;

    /// Whether a posting with this URL (compared case-insensitively) is already stored.
    ///
    /// The default scans every stored posting; indexed stores should override it.
    fn contains_url(&self, url: &str) -> impl Future<Output = Result<bool, AppError>> + Send {
        async move {
            let all = self.list_all().await?;
            Ok(all.iter().any(|p| same_url(&p.url, url)))
        }
    }
}
