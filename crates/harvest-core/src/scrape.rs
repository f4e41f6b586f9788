use crate::dedup::{Deduplicator, SaveOutcome};
use crate::error::{AppError, ScrapeFailure};
use crate::models::{ScrapeOutcome, Source};
use crate::strategy::resolve_strategy;
use crate::traits::{Fetcher, PostingStore};

/// Orchestrates one source: resolve strategy → fetch → extract → dedup → save.
///
/// Generic over the fetcher and posting store so the pipeline runs against
/// mocks in tests and against the throttled HTTP client and Postgres in
/// production.
#[derive(Clone)]
pub struct ScrapeService<F, S>
where
    F: Fetcher,
    S: PostingStore,
{
    fetcher: F,
    dedup: Deduplicator<S>,
}

impl<F, S> ScrapeService<F, S>
where
    F: Fetcher,
    S: PostingStore,
{
    pub fn new(fetcher: F, store: S) -> Self {
        Self {
            fetcher,
            dedup: Deduplicator::new(store),
        }
    }

    pub fn store(&self) -> &S {
        self.dedup.store()
    }

    /// Harvest `source` once.
    ///
    /// Fetch and extraction errors abort the source. A failed save only
    /// drops that candidate; the rest are still attempted.
    pub async fn scrape_source(&self, source: &Source) -> Result<ScrapeOutcome, AppError> {
        let strategy = resolve_strategy(source);
        let extractor = strategy.extractor();

        tracing::info!(
            source = %source.name,
            url = %source.url,
            strategy = extractor.name(),
            "Scraping source"
        );
        let document = self.fetcher.fetch(&source.url, strategy.fetch_kind()).await?;
        tracing::debug!(source = %source.name, bytes = document.len(), "Fetched document");

        let candidates = extractor.extract(&document, source)?;

        let mut outcome = ScrapeOutcome {
            source: source.display_name().to_string(),
            strategy: extractor.name(),
            candidates: candidates.len(),
            saved: Vec::new(),
            duplicates: 0,
            discarded: 0,
            failed: 0,
        };

        for candidate in candidates {
            let url = candidate.url.clone();
            match self.dedup.try_save(candidate, source).await {
                Ok(SaveOutcome::Saved(posting)) => outcome.saved.push(posting),
                Ok(SaveOutcome::Duplicate) => outcome.duplicates += 1,
                Ok(SaveOutcome::Discarded) => outcome.discarded += 1,
                Err(e) => {
                    tracing::warn!(source = %source.name, %url, error = %e, "Failed to save posting");
                    outcome.failed += 1;
                }
            }
        }

        tracing::info!(
            source = %source.name,
            candidates = outcome.candidates,
            saved = outcome.saved.len(),
            duplicates = outcome.duplicates,
            "Source scraped"
        );
        Ok(outcome)
    }

    /// Manually triggered scrape of a single source.
    ///
    /// Robots rules are not consulted. Failures come back as a message
    /// rather than a structured error.
    pub async fn scrape_one(&self, source: &Source) -> Result<ScrapeOutcome, ScrapeFailure> {
        self.scrape_source(source).await.map_err(|e| {
            tracing::warn!(source = %source.name, error = %e, "Manual scrape failed");
            ScrapeFailure::from(e)
        })
    }
}
