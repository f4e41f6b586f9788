pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod memory;
pub mod models;
pub mod robots;
pub mod scheduler;
pub mod scrape;
pub mod seed;
pub mod strategy;
pub mod throttle;
pub mod traits;

#[cfg(test)]
mod testutil;

pub use config::HarvestConfig;
pub use dedup::{Deduplicator, SaveOutcome};
pub use error::{AppError, ScrapeFailure};
pub use memory::{MemoryPostings, MemorySources};
pub use models::{
    CandidatePosting, NewPosting, NewSource, ScrapeOutcome, Source, SourceKind, StoredPosting,
};
pub use robots::RobotsGate;
pub use scheduler::{Scheduler, SweepEvent, SweepReporter, SweepSummary, TracingSweepReporter};
pub use scrape::ScrapeService;
pub use strategy::{Strategy, resolve_strategy};
pub use throttle::{HostRateLimiter, ThrottledFetcher};
pub use traits::{FetchKind, Fetcher, PostingStore, SourceStore};
