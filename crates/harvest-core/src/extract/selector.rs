use scraper::Html;
use url::Url;

use super::{Extractor, JsonLdExtractor, absolute_href, element_text, parse_selector};
use crate::error::AppError;
use crate::models::{CandidatePosting, Source};

/// Applies the source's own CSS selector, or falls back to JSON-LD when it has none.
///
/// Matched elements without a usable `href` point back at the source page.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorExtractor;

impl Extractor for SelectorExtractor {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn extract(
        &self,
        document: &str,
        source: &Source,
    ) -> Result<Vec<CandidatePosting>, AppError> {
        let Some(css) = source.selector() else {
            return JsonLdExtractor.extract(document, source);
        };

        let selector = parse_selector(css)?;
        let base = Url::parse(&source.url).ok();
        let html = Html::parse_document(document);

        Ok(html
            .select(&selector)
            .map(|element| {
                let url = absolute_href(&element, base.as_ref())
                    .unwrap_or_else(|| source.url.clone());
                CandidatePosting::link(element_text(&element), url)
            })
            .collect())
    }
}
