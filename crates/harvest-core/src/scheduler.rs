use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::models::{ScrapeOutcome, Source};
use crate::robots::RobotsGate;
use crate::scrape::ScrapeService;
use crate::traits::{Fetcher, PostingStore, SourceStore};

/// Default delay between the end of one sweep and the start of the next.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Events emitted during a sweep for monitoring/logging.
#[derive(Debug, Clone)]
pub enum SweepEvent<'a> {
    Started {
        sources: usize,
    },
    SourceStarted {
        source: &'a Source,
    },
    /// robots.txt disallows the source URL.
    Skipped {
        source: &'a Source,
    },
    SourceCompleted {
        source: &'a Source,
        outcome: &'a ScrapeOutcome,
    },
    SourceFailed {
        source: &'a Source,
        error: &'a str,
        transient: bool,
    },
    /// The sweep could not start (e.g. sources could not be listed).
    Aborted {
        error: &'a str,
    },
    Finished {
        summary: &'a SweepSummary,
    },
}

/// Trait for receiving sweep events (decoupled logging).
pub trait SweepReporter: Send + Sync {
    fn report(&self, event: SweepEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSweepReporter;

impl SweepReporter for TracingSweepReporter {
    fn report(&self, event: SweepEvent<'_>) {
        match event {
            SweepEvent::Started { sources } => {
                tracing::info!(%sources, "Sweep started");
            }
            SweepEvent::SourceStarted { source } => {
                tracing::debug!(source = %source.name, url = %source.url, "Processing source");
            }
            SweepEvent::Skipped { source } => {
                tracing::info!(source = %source.name, url = %source.url, "Disallowed by robots.txt, skipping");
            }
            SweepEvent::SourceCompleted { source, outcome } => {
                tracing::info!(
                    source = %source.name,
                    strategy = outcome.strategy,
                    saved = outcome.saved.len(),
                    "Source completed"
                );
            }
            SweepEvent::SourceFailed {
                source,
                error,
                transient,
            } => {
                tracing::warn!(source = %source.name, %error, %transient, "Source failed");
            }
            SweepEvent::Aborted { error } => {
                tracing::error!(%error, "Sweep aborted");
            }
            SweepEvent::Finished { summary } => {
                tracing::info!(
                    scraped = summary.scraped,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    saved = summary.saved,
                    "Sweep finished"
                );
            }
        }
    }
}

/// Counters for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub sources: usize,
    pub scraped: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Postings newly stored during the sweep.
    pub saved: usize,
}

/// Periodic harvester: sweeps every source, then waits a fixed delay.
pub struct Scheduler<F, SS, PS>
where
    F: Fetcher,
    SS: SourceStore,
    PS: PostingStore,
{
    sources: SS,
    robots: RobotsGate<F>,
    service: ScrapeService<F, PS>,
    interval: Duration,
}

impl<F, SS, PS> Scheduler<F, SS, PS>
where
    F: Fetcher,
    SS: SourceStore,
    PS: PostingStore,
{
    /// `fetcher` should be the shared, throttled one so robots.txt and page
    /// fetches count against the same per-host limit as manual scrapes.
    pub fn new(fetcher: F, sources: SS, postings: PS, interval: Duration) -> Self {
        Self {
            sources,
            robots: RobotsGate::new(fetcher.clone()),
            service: ScrapeService::new(fetcher, postings),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn robots(&self) -> &RobotsGate<F> {
        &self.robots
    }

    /// Sweep every source once, in listing order.
    ///
    /// A failing source is reported and the sweep moves on. If the sources
    /// cannot be listed the sweep is aborted and an empty summary returned.
    pub async fn run_sweep<R: SweepReporter>(&self, reporter: &R) -> SweepSummary {
        let sources = match self.sources.list_all().await {
            Ok(sources) => sources,
            Err(e) => {
                let error = e.to_string();
                reporter.report(SweepEvent::Aborted { error: &error });
                return SweepSummary::default();
            }
        };

        let mut summary = SweepSummary {
            sources: sources.len(),
            ..SweepSummary::default()
        };
        reporter.report(SweepEvent::Started {
            sources: sources.len(),
        });

        for source in &sources {
            reporter.report(SweepEvent::SourceStarted { source });

            if !self.robots.allowed(&source.url).await {
                summary.skipped += 1;
                reporter.report(SweepEvent::Skipped { source });
                continue;
            }

            match self.service.scrape_source(source).await {
                Ok(outcome) => {
                    summary.scraped += 1;
                    summary.saved += outcome.saved.len();
                    reporter.report(SweepEvent::SourceCompleted {
                        source,
                        outcome: &outcome,
                    });
                }
                Err(e) => {
                    summary.failed += 1;
                    let error = e.to_string();
                    reporter.report(SweepEvent::SourceFailed {
                        source,
                        error: &error,
                        transient: e.is_transient(),
                    });
                }
            }
        }

        reporter.report(SweepEvent::Finished { summary: &summary });
        summary
    }

    /// Sweep immediately, then again `interval` after each sweep ends, until cancelled.
    ///
    /// Cancellation is observed between sweeps; a sweep in progress runs to completion.
    pub async fn run<R: SweepReporter>(&self, cancel_token: CancellationToken, reporter: &R) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Scheduler started");

        loop {
            if cancel_token.is_cancelled() {
                break;
            }

            self.run_sweep(reporter).await;

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = cancel_token.cancelled() => break,
            }
        }

        tracing::info!("Scheduler stopped");
    }
}
