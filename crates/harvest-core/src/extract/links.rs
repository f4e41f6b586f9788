use scraper::Html;
use url::Url;

use super::{Extractor, absolute_href, element_text, parse_selector};
use crate::error::AppError;
use crate::models::{CandidatePosting, Source};

/// Keywords an absolute href must contain (lowercased) to count as a job link.
pub const JOB_LINK_KEYWORDS: [&str; 3] = ["job", "careers", "position"];

/// Keeps every anchor whose absolute target looks like a job page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkExtractor;

impl Extractor for LinkExtractor {
    fn name(&self) -> &'static str {
        "links"
    }

    fn extract(
        &self,
        document: &str,
        source: &Source,
    ) -> Result<Vec<CandidatePosting>, AppError> {
        let anchors = parse_selector("a[href]")?;
        let base = Url::parse(&source.url).ok();
        let html = Html::parse_document(document);

        let postings = html
            .select(&anchors)
            .filter_map(|anchor| {
                let href = absolute_href(&anchor, base.as_ref())?;
                let lowered = href.to_lowercase();
                JOB_LINK_KEYWORDS
                    .iter()
                    .any(|k| lowered.contains(k))
                    .then(|| CandidatePosting::link(element_text(&anchor), href))
            })
            .collect();
        Ok(postings)
    }
}
