use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use harvest_core::models::{ScrapeOutcome, Source, StoredPosting};

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateSourceRequest {
    pub name: String,
    pub url: String,
    /// CSS selector for the selector strategy
    pub selector: Option<String>,
    /// `rss`, `jsonld` or `links`; anything else means selector, then JSON-LD
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SourceResponse {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub selector: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<Source> for SourceResponse {
    fn from(source: Source) -> Self {
        Self {
            id: source.id,
            name: source.name,
            url: source.url,
            selector: source.selector,
            kind: source.kind.to_string(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SourceListResponse {
    pub sources: Vec<SourceResponse>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Postings
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PostingResponse {
    pub id: Uuid,
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    pub url: String,
    pub posted_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

impl From<StoredPosting> for PostingResponse {
    fn from(p: StoredPosting) -> Self {
        Self {
            id: p.id,
            source: p.source,
            title: p.title,
            company: p.company,
            location: p.location,
            description: p.description,
            url: p.url,
            posted_at: p.posted_at,
            fetched_at: p.fetched_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreatePostingRequest {
    pub source: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    pub url: String,
    /// Defaults to the time of the request
    pub posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListPostingsQuery {
    /// Maximum number of postings (default 50, at most 500)
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PostingListResponse {
    pub postings: Vec<PostingResponse>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ScrapeResponse {
    pub source: String,
    pub strategy: String,
    pub candidates: usize,
    pub saved: Vec<PostingResponse>,
    pub duplicates: usize,
    pub discarded: usize,
    pub failed: usize,
}

impl From<ScrapeOutcome> for ScrapeResponse {
    fn from(outcome: ScrapeOutcome) -> Self {
        Self {
            source: outcome.source,
            strategy: outcome.strategy.to_string(),
            candidates: outcome.candidates,
            saved: outcome.saved.into_iter().map(PostingResponse::from).collect(),
            duplicates: outcome.duplicates,
            discarded: outcome.discarded,
            failed: outcome.failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
