//! Test utilities: handwritten mocks for the core traits.
//!
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::error::AppError;
use crate::memory::MemoryPostings;
use crate::models::{NewPosting, NewSource, Source, SourceKind, StoredPosting};
use crate::scheduler::{SweepEvent, SweepReporter};
use crate::traits::{FetchKind, Fetcher, PostingStore, SourceStore};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum MockResponse {
    Body(String),
    Failure(String),
}

/// Mock fetcher that answers per URL. Unrouted URLs return HTTP 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, MockResponse>>>,
    calls: Arc<Mutex<Vec<(String, FetchKind)>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `body`.
    pub fn route(self, url: &str, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), MockResponse::Body(body.to_string()));
        self
    }

    /// Fail `url` with a network error.
    pub fn fail(self, url: &str, message: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), MockResponse::Failure(message.to_string()));
        self
    }

    /// Every URL fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// The kind each URL was fetched with, in order.
    pub fn kinds(&self) -> Vec<FetchKind> {
        self.calls.lock().unwrap().iter().map(|(_, k)| *k).collect()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .count()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, kind: FetchKind) -> Result<String, AppError> {
        self.calls.lock().unwrap().push((url.to_string(), kind));
        let response = self.routes.lock().unwrap().get(url).cloned();
        match response {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Failure(message)) => Err(AppError::NetworkError(message)),
            None => Err(AppError::HttpError(format!("HTTP 404 for {url}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Source store whose listing always fails.
#[derive(Clone, Default)]
pub struct FailingSources;

impl SourceStore for FailingSources {
    async fn list_all(&self) -> Result<Vec<Source>, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }

    async fn get(&self, _id: Uuid) -> Result<Option<Source>, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }

    async fn create(&self, _source: &NewSource) -> Result<Source, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }

    async fn count(&self) -> Result<u64, AppError> {
        Err(AppError::DatabaseError("connection refused".into()))
    }
}

/// Posting store that fails saves for selected URLs and delegates everything else.
#[derive(Clone, Default)]
pub struct FlakyPostings {
    pub inner: MemoryPostings,
    failing_urls: Arc<Mutex<Vec<String>>>,
}

impl FlakyPostings {
    pub fn failing_on(urls: &[&str]) -> Self {
        Self {
            inner: MemoryPostings::new(),
            failing_urls: Arc::new(Mutex::new(urls.iter().map(|u| u.to_string()).collect())),
        }
    }
}

impl PostingStore for FlakyPostings {
    async fn list_all(&self) -> Result<Vec<StoredPosting>, AppError> {
        self.inner.list_all().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredPosting>, AppError> {
        self.inner.get(id).await
    }

    async fn save(&self, posting: &NewPosting) -> Result<StoredPosting, AppError> {
        let fails = self.failing_urls.lock().unwrap().contains(&posting.url);
        if fails {
            return Err(AppError::DatabaseError("disk full".into()));
        }
        self.inner.save(posting).await
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Sweep reporter that records event labels.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl SweepReporter for RecordingReporter {
    fn report(&self, event: SweepEvent<'_>) {
        let label = match &event {
            SweepEvent::Started { .. } => "Started".to_string(),
            SweepEvent::SourceStarted { source } => format!("SourceStarted:{}", source.name),
            SweepEvent::Skipped { source } => format!("Skipped:{}", source.name),
            SweepEvent::SourceCompleted { source, .. } => {
                format!("SourceCompleted:{}", source.name)
            }
            SweepEvent::SourceFailed { source, .. } => format!("SourceFailed:{}", source.name),
            SweepEvent::Aborted { .. } => "Aborted".to_string(),
            SweepEvent::Finished { .. } => "Finished".to_string(),
        };
        self.events.lock().unwrap().push(label);
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a source for testing.
pub fn make_source(name: &str, url: &str, kind: SourceKind) -> Source {
    Source {
        id: Uuid::new_v4(),
        name: name.to_string(),
        url: url.to_string(),
        selector: None,
        kind,
    }
}

/// A two-item RSS 2.0 feed.
pub const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Remote Jobs</title>
    <link>https://feeds.example/</link>
    <item>
      <title>Rust Engineer</title>
      <link>https://feeds.example/jobs/1</link>
      <description>Build things</description>
    </item>
    <item>
      <title><![CDATA[Platform Engineer & SRE]]></title>
      <link>https://feeds.example/jobs/2#apply</link>
    </item>
  </channel>
</rss>"#;
