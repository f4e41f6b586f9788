//! Per-host request throttling for polite fetching.
//!
//! [`HostRateLimiter`] enforces a minimum delay between consecutive requests
//! to the same host. It is shared (behind an `Arc`) by every fetch path, so a
//! manual scrape racing the scheduled sweep still waits its turn.
//! [`ThrottledFetcher`] wraps any [`Fetcher`] with it.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use harvest_core::throttle::{HostRateLimiter, ThrottledFetcher};
//!
//! # use harvest_core::traits::{FetchKind, Fetcher};
//! # #[derive(Clone)] struct MyFetcher;
//! # impl Fetcher for MyFetcher {
//! #     async fn fetch(&self, _: &str, _: FetchKind) -> Result<String, harvest_core::AppError> { todo!() }
//! # }
//! let limiter = Arc::new(HostRateLimiter::new(Duration::from_secs(2)));
//! let fetcher = ThrottledFetcher::new(MyFetcher, limiter.clone());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::error::AppError;
use crate::traits::{FetchKind, Fetcher};

/// Default minimum delay between two requests to the same host.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(2000);

/// Last access time of one host. Holding its lock is the critical section.
type HostSlot = Arc<tokio::sync::Mutex<Option<Instant>>>;

/// Enforces a minimum inter-request delay per target host.
///
/// Each host has its own lock, held across check, wait and record, so two
/// callers targeting the same host can never both pass inside `min_delay`.
/// Callers targeting different hosts do not contend.
#[derive(Debug)]
pub struct HostRateLimiter {
    min_delay: Duration,
    hosts: Mutex<HashMap<String, HostSlot>>,
}

impl HostRateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Extract the limiter key (lowercased host) from a URL.
    ///
    /// URLs without a host share the empty key; unparseable URLs yield `None`.
    pub fn host_key(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        Some(url.host_str().unwrap_or_default().to_ascii_lowercase())
    }

    fn slot(&self, host: &str) -> HostSlot {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts.entry(host.to_string()).or_default().clone()
    }

    /// Wait until `min_delay` has passed since the previous acquisition for
    /// `host` returned, then record the current instant and return it.
    pub async fn acquire(&self, host: &str) -> Instant {
        let slot = self.slot(&host.to_ascii_lowercase());
        let mut last = slot.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                let sleep_duration = self.min_delay - elapsed;
                tracing::debug!(
                    %host,
                    sleep_ms = %sleep_duration.as_millis(),
                    "Throttling request"
                );
                tokio::time::sleep(sleep_duration).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}

impl Default for HostRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY)
    }
}

/// A [`Fetcher`] wrapper that acquires the shared [`HostRateLimiter`] before every request.
#[derive(Clone)]
pub struct ThrottledFetcher<F> {
    inner: F,
    limiter: Arc<HostRateLimiter>,
}

impl<F: Fetcher> ThrottledFetcher<F> {
    pub fn new(inner: F, limiter: Arc<HostRateLimiter>) -> Self {
        Self { inner, limiter }
    }

    pub fn limiter(&self) -> &Arc<HostRateLimiter> {
        &self.limiter
    }
}

impl<F: Fetcher> Fetcher for ThrottledFetcher<F> {
    async fn fetch(&self, url: &str, kind: FetchKind) -> Result<String, AppError> {
        if let Some(host) = HostRateLimiter::host_key(url) {
            self.limiter.acquire(&host).await;
        }
        self.inner.fetch(url, kind).await
    }
}
