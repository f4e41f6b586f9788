//! Extraction strategies: each turns a fetched document into candidate postings.
//!
//! Extractors never touch storage; the orchestrator passes their output to the
//! [`Deduplicator`](crate::dedup::Deduplicator).

mod career_board;
mod jsonld;
mod links;
mod rss;
mod selector;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::AppError;
use crate::models::{CandidatePosting, Source};

pub use career_board::CareerBoardExtractor;
pub use jsonld::{JsonLdExtractor, postings_from_json_ld};
pub use links::LinkExtractor;
pub use rss::RssExtractor;
pub use selector::SelectorExtractor;

/// Turns one fetched document into zero or more candidate postings.
pub trait Extractor: Send + Sync {
    /// Short name used in logs and scrape outcomes.
    fn name(&self) -> &'static str;

    fn extract(&self, document: &str, source: &Source)
    -> Result<Vec<CandidatePosting>, AppError>;
}

/// Parse a CSS selector, mapping failures into [`AppError::SelectorError`].
pub(crate) fn parse_selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::SelectorError {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Visible text of an element with whitespace collapsed.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Absolute form of an element's `href`, resolved against `base`.
///
/// `None` when the element has no `href` or it cannot be resolved.
pub(crate) fn absolute_href(element: &ElementRef<'_>, base: Option<&Url>) -> Option<String> {
    let href = element.value().attr("href")?.trim();
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute.to_string());
    }
    base?.join(href).ok().map(|u| u.to_string())
}
