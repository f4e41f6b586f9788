use std::time::Duration;

use harvest_core::config::{DEFAULT_PAGE_TIMEOUT, DEFAULT_ROBOTS_TIMEOUT, DEFAULT_USER_AGENT};
use harvest_core::error::AppError;
use harvest_core::traits::{FetchKind, Fetcher};
use harvest_core::HarvestConfig;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

/// HTTP fetcher using reqwest.
///
/// Timeouts depend on the [`FetchKind`]: pages and feeds share one, robots.txt
/// gets a shorter one. Page fetches refuse non-textual responses; feed and
/// robots fetches take whatever the server returns.
///
/// This fetcher does not throttle. Wrap it in a
/// [`ThrottledFetcher`](harvest_core::throttle::ThrottledFetcher).
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    page_timeout: Duration,
    robots_timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::build(DEFAULT_USER_AGENT, DEFAULT_PAGE_TIMEOUT, DEFAULT_ROBOTS_TIMEOUT)
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self, AppError> {
        Self::build(&config.user_agent, config.page_timeout, config.robots_timeout)
    }

    fn build(
        user_agent: &str,
        page_timeout: Duration,
        robots_timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            page_timeout,
            robots_timeout,
        })
    }

    pub fn timeout_for(&self, kind: FetchKind) -> Duration {
        match kind {
            FetchKind::Page | FetchKind::Feed => self.page_timeout,
            FetchKind::Robots => self.robots_timeout,
        }
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, kind: FetchKind) -> Result<String, AppError> {
        let parsed = Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::InvalidUrl(format!(
                "scheme '{}' is not allowed (only http/https)",
                parsed.scheme()
            )));
        }

        let timeout = self.timeout_for(kind);
        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(timeout.as_secs())
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    AppError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        if kind == FetchKind::Page {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            if let Some(ct) = content_type
                && !is_textual_content_type(ct)
            {
                return Err(AppError::HttpError(format!(
                    "Unhandled content type '{ct}' for {url}"
                )));
            }
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(timeout.as_secs())
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })
    }
}

/// Whether a page response can be parsed as markup: `text/*`,
/// `application/xml`, or any `application/*+xml`.
pub fn is_textual_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/")
        || mime == "application/xml"
        || (mime.starts_with("application/") && mime.ends_with("+xml"))
}
