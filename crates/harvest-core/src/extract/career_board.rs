use scraper::Html;
use url::Url;

use super::{Extractor, JsonLdExtractor, absolute_href, element_text, parse_selector};
use crate::error::AppError;
use crate::models::{CandidatePosting, Source};

/// Anchors that point at hosted career-board listings.
pub const CAREER_BOARD_ANCHORS: &str =
    "a[href*='careers'], a[href*='/jobs/'], a[href*='greenhouse.io']";

/// Career-board pages: board-style anchors first, then any JSON-LD postings.
///
/// The two result sets are concatenated; overlap is left to deduplication.
#[derive(Debug, Clone, Copy, Default)]
pub struct CareerBoardExtractor;

impl Extractor for CareerBoardExtractor {
    fn name(&self) -> &'static str {
        "career-board"
    }

    fn extract(
        &self,
        document: &str,
        source: &Source,
    ) -> Result<Vec<CandidatePosting>, AppError> {
        let anchors = parse_selector(CAREER_BOARD_ANCHORS)?;
        let base = Url::parse(&source.url).ok();

        let mut postings: Vec<CandidatePosting> = {
            let html = Html::parse_document(document);
            html.select(&anchors)
                .filter_map(|anchor| {
                    let href = absolute_href(&anchor, base.as_ref())?;
                    Some(CandidatePosting::link(element_text(&anchor), href))
                })
                .collect()
        };

        postings.extend(JsonLdExtractor.extract(document, source)?);
        Ok(postings)
    }
}
