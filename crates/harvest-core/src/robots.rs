//! Best-effort robots exclusion.
//!
//! Only `Disallow:` lines are honoured, for every user agent alike. Rules are
//! fetched once per host and kept for the lifetime of the gate.

use std::sync::Arc;

use moka::future::Cache;
use url::Url;

use crate::traits::{FetchKind, Fetcher};

/// Per-host cache of disallowed path prefixes, consulted before scheduled fetches.
#[derive(Clone)]
pub struct RobotsGate<F: Fetcher> {
    fetcher: F,
    rules: Cache<String, Arc<Vec<String>>>,
}

impl<F: Fetcher> RobotsGate<F> {
    /// The fetcher should be the shared, throttled one: robots.txt requests
    /// count against the host's rate limit too.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            rules: Cache::builder().build(),
        }
    }

    /// Whether `url` may be fetched.
    ///
    /// Unparseable or host-less URLs are refused. A failed robots.txt fetch
    /// allows everything on that host.
    pub async fn allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };

        let robots_url = robots_url(&parsed, &host);
        let rules = self
            .rules
            .get_with(host, self.load_rules(robots_url))
            .await;

        let path = parsed.path();
        !rules.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Cached rules for `host`, if it has been visited.
    pub async fn cached_rules(&self, host: &str) -> Option<Arc<Vec<String>>> {
        self.rules.get(&host.to_ascii_lowercase()).await
    }

    async fn load_rules(&self, robots_url: String) -> Arc<Vec<String>> {
        match self.fetcher.fetch(&robots_url, FetchKind::Robots).await {
            Ok(body) => {
                let rules = parse_disallow_rules(&body);
                tracing::debug!(url = %robots_url, rules = rules.len(), "Loaded robots.txt");
                Arc::new(rules)
            }
            Err(e) => {
                tracing::debug!(url = %robots_url, error = %e, "robots.txt unavailable, allowing all");
                Arc::new(Vec::new())
            }
        }
    }
}

fn robots_url(url: &Url, host: &str) -> String {
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{}://{}{}/robots.txt", url.scheme(), host, port)
}

/// Collect the non-empty path prefixes of every `Disallow:` line (case-insensitive).
pub fn parse_disallow_rules(body: &str) -> Vec<String> {
    const DIRECTIVE: &str = "disallow:";

    body.lines()
        .map(str::trim)
        .filter(|line| {
            line.len() >= DIRECTIVE.len()
                && line.is_char_boundary(DIRECTIVE.len())
                && line[..DIRECTIVE.len()].eq_ignore_ascii_case(DIRECTIVE)
        })
        .map(|line| line[DIRECTIVE.len()..].trim().to_string())
        .filter(|prefix| !prefix.is_empty())
        .collect()
}
