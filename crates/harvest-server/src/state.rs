use std::sync::Arc;

use harvest_client::ReqwestFetcher;
use harvest_core::scrape::ScrapeService;
use harvest_core::throttle::{HostRateLimiter, ThrottledFetcher};
use harvest_core::{AppError, HarvestConfig};
use harvest_db::{Database, PostingRepository};

/// The fetcher every request path shares, so manual scrapes and the
/// background sweep wait on the same per-host limiter.
pub type SharedFetcher = ThrottledFetcher<ReqwestFetcher>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub fetcher: SharedFetcher,
    /// Manual, robots-bypassing scrapes triggered through the API.
    pub scraper: ScrapeService<SharedFetcher, PostingRepository>,
}

impl AppState {
    pub fn new(db: Database, config: &HarvestConfig) -> Result<Self, AppError> {
        let limiter = Arc::new(HostRateLimiter::new(config.min_delay));
        let fetcher = ThrottledFetcher::new(ReqwestFetcher::from_config(config)?, limiter);
        let scraper = ScrapeService::new(fetcher.clone(), db.posting_repo());

        Ok(Self {
            db,
            fetcher,
            scraper,
        })
    }
}
