use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared harvesting strategy of a source.
///
/// Absent or unrecognised declarations resolve to [`SourceKind::SelectorOrJsonLd`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum SourceKind {
    #[serde(rename = "rss")]
    Rss,
    #[serde(rename = "jsonld")]
    JsonLd,
    #[serde(rename = "links")]
    Links,
    #[default]
    #[serde(rename = "selector-or-jsonld")]
    SelectorOrJsonLd,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Rss => "rss",
            SourceKind::JsonLd => "jsonld",
            SourceKind::Links => "links",
            SourceKind::SelectorOrJsonLd => "selector-or-jsonld",
        }
    }

    /// Resolve an optional, free-form type declaration (case-insensitive).
    pub fn from_declared(declared: Option<&str>) -> Self {
        match declared.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("rss") => SourceKind::Rss,
            Some("jsonld") => SourceKind::JsonLd,
            Some("links") => SourceKind::Links,
            _ => SourceKind::SelectorOrJsonLd,
        }
    }
}

impl From<String> for SourceKind {
    fn from(value: String) -> Self {
        SourceKind::from_declared(Some(&value))
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A configured external site or feed to harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    /// CSS selector for the selector fallback strategy.
    pub selector: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
}

impl Source {
    /// Name recorded on postings harvested from this source (URL if the name is blank).
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.url
        } else {
            &self.name
        }
    }

    /// The declared selector, if it is non-blank.
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// DTO for creating a new source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSource {
    pub name: String,
    pub url: String,
    pub selector: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
}

impl NewSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            selector: None,
            kind,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

/// Unvalidated, unpersisted extraction result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidatePosting {
    pub title: String,
    pub company: String,
    pub description: String,
    pub url: String,
}

impl CandidatePosting {
    /// A candidate carrying only a title and a link.
    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}

/// A deduplicated, persisted job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPosting {
    pub id: Uuid,
    /// Name of the source the posting was harvested from.
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    /// Fragment-stripped URL, unique case-insensitively.
    pub url: String,
    pub posted_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

/// DTO for inserting a new posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPosting {
    pub source: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: String,
    pub url: String,
    pub posted_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

impl NewPosting {
    pub fn into_stored(self, id: Uuid) -> StoredPosting {
        StoredPosting {
            id,
            source: self.source,
            title: self.title,
            company: self.company,
            location: self.location,
            description: self.description,
            url: self.url,
            posted_at: self.posted_at,
            fetched_at: self.fetched_at,
        }
    }
}

/// Result of harvesting a single source.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub source: String,
    pub strategy: &'static str,
    /// Number of candidates the extractor produced.
    pub candidates: usize,
    pub saved: Vec<StoredPosting>,
    /// Candidates whose URL was already stored.
    pub duplicates: usize,
    /// Candidates without a usable URL.
    pub discarded: usize,
    /// Candidates whose save failed.
    pub failed: usize,
}
