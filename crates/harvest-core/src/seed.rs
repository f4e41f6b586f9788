//! Starter sources for an empty installation.

use crate::error::AppError;
use crate::models::{NewSource, SourceKind};
use crate::traits::SourceStore;

/// One source of each common shape: a feed aggregator, a hosted career
/// board and a structured postings API.
pub fn default_sources() -> Vec<NewSource> {
    vec![
        NewSource::new(
            "WeWorkRemotely - Remote Jobs RSS",
            "https://weworkremotely.com/remote-jobs.rss",
            SourceKind::Rss,
        ),
        NewSource::new(
            "Greenhouse - Airtable",
            "https://boards.greenhouse.io/airtable",
            SourceKind::Links,
        ),
        NewSource::new(
            "Lever Demo Feed",
            "https://api.lever.co/v0/postings/leverdemo?mode=json",
            SourceKind::JsonLd,
        ),
    ]
}

/// Insert [`default_sources`] if the store holds no sources yet.
///
/// Returns how many sources were created (zero when the store was not empty).
pub async fn seed_default_sources<S: SourceStore>(store: &S) -> Result<usize, AppError> {
    if store.count().await? > 0 {
        tracing::debug!("Sources already present, skipping seed");
        return Ok(0);
    }

    let defaults = default_sources();
    for source in &defaults {
        let created = store.create(source).await?;
        tracing::info!(id = %created.id, name = %created.name, "Seeded source");
    }
    Ok(defaults.len())
}
