use scraper::Html;
use serde_json::Value;

use super::{Extractor, parse_selector};
use crate::error::AppError;
use crate::models::{CandidatePosting, Source};

/// Reads `<script type="application/ld+json">` blocks for job-typed entities.
///
/// Each block is parsed on its own; a malformed block is skipped without
/// affecting the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdExtractor;

impl Extractor for JsonLdExtractor {
    fn name(&self) -> &'static str {
        "jsonld"
    }

    fn extract(
        &self,
        document: &str,
        source: &Source,
    ) -> Result<Vec<CandidatePosting>, AppError> {
        let scripts = parse_selector(r#"script[type="application/ld+json"]"#)?;
        let html = Html::parse_document(document);

        let mut candidates = Vec::new();
        for script in html.select(&scripts) {
            let raw: String = script.text().collect();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => candidates.extend(postings_from_json_ld(&value)),
                Err(e) => {
                    tracing::debug!(source = %source.name, error = %e, "Skipping malformed JSON-LD block");
                }
            }
        }
        Ok(candidates)
    }
}

/// Walk one parsed JSON-LD value and collect every job-typed entity.
///
/// Top-level arrays are walked item by item. An object carrying `@graph`
/// is only a container: its members are walked, the object itself is not
/// considered.
pub fn postings_from_json_ld(value: &Value) -> Vec<CandidatePosting> {
    let mut out = Vec::new();
    match value {
        Value::Array(items) => items.iter().for_each(|item| walk(item, &mut out)),
        other => walk(other, &mut out),
    }
    out
}

fn walk(node: &Value, out: &mut Vec<CandidatePosting>) {
    if let Some(graph) = node.get("@graph") {
        match graph {
            Value::Array(members) => members.iter().for_each(|m| walk(m, out)),
            Value::Object(_) => walk(graph, out),
            _ => {}
        }
        return;
    }

    let declared = node
        .get("@type")
        .or_else(|| node.get("type"))
        .map(text_of);
    let is_job = declared.is_some_and(|t| t.to_lowercase().contains("job"));
    if !is_job {
        return;
    }

    out.push(CandidatePosting {
        title: node
            .get("title")
            .or_else(|| node.get("name"))
            .map(text_of)
            .unwrap_or_default(),
        company: company_of(node.get("hiringOrganization")),
        description: node.get("description").map(text_of).unwrap_or_default(),
        url: node.get("url").map(text_of).unwrap_or_default(),
    });
}

fn company_of(organization: Option<&Value>) -> String {
    match organization {
        Some(Value::String(name)) => name.clone(),
        Some(org) => org.get("name").map(text_of).unwrap_or_default(),
        None => String::new(),
    }
}

/// Scalar text of a JSON value. Arrays of scalars are joined with spaces
/// (`"@type": ["JobPosting", "Thing"]`); objects and null have no text.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(text_of)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) | Value::Null => String::new(),
    }
}
