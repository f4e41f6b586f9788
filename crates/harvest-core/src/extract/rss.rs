use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;

use super::{Extractor, collapse_whitespace};
use crate::error::AppError;
use crate::models::{CandidatePosting, Source};

/// Pulls `<item>` (RSS) and `<entry>` (Atom) elements out of a raw feed.
///
/// The feed is read as a stream. If the markup breaks part way, items already
/// read are kept and the rest of the feed is dropped. Corruption that swallows
/// the remaining input, such as an unclosed comment or CDATA section, therefore
/// loses every later item even if it is well formed.
///
/// Inside an RSS `<item>` only unprefixed `<title>`/`<link>` count, so
/// `<atom:link>` or `<media:title>` never stand in for them. Atom `<entry>`
/// children are matched on their local name.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            _ => None,
        }
    }
}

#[derive(Default)]
struct PendingItem {
    /// Atom `<entry>` rather than RSS `<item>`.
    atom: bool,
    title: Option<String>,
    link: Option<String>,
    /// Field currently being read, its text so far, and the `href` it carried.
    open: Option<(Field, String, Option<String>)>,
}

impl PendingItem {
    fn new(atom: bool) -> Self {
        Self {
            atom,
            ..Self::default()
        }
    }

    fn field(&self, name: QName<'_>) -> Option<Field> {
        if self.atom {
            Field::from_tag(name.local_name().as_ref())
        } else {
            Field::from_tag(name.as_ref())
        }
    }

    fn open(&mut self, field: Field, href: Option<String>) {
        let taken = match field {
            Field::Title => self.title.is_some(),
            Field::Link => self.link.is_some(),
        };
        if !taken && self.open.is_none() {
            self.open = Some((field, String::new(), href));
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some((_, buffer, _)) = self.open.as_mut() {
            buffer.push_str(text);
        }
    }

    fn close(&mut self, field: Field) {
        let Some((open_field, text, href)) = self.open.take() else {
            return;
        };
        if open_field != field {
            self.open = Some((open_field, text, href));
            return;
        }
        let text = collapse_whitespace(&text);
        match field {
            Field::Title => self.title = Some(text),
            Field::Link if text.is_empty() => self.link = href.map(|h| h.trim().to_string()),
            Field::Link => self.link = Some(text),
        }
    }

    fn finish(self) -> CandidatePosting {
        CandidatePosting {
            title: self.title.unwrap_or_default(),
            url: self.link.unwrap_or_default(),
            ..CandidatePosting::default()
        }
    }
}

fn is_item(name: &[u8]) -> bool {
    name == b"item" || name == b"entry"
}

fn href_of(element: &BytesStart<'_>) -> Option<String> {
    let attr = element.try_get_attribute("href").ok().flatten()?;
    attr.unescape_value().ok().map(|v| v.into_owned())
}

impl Extractor for RssExtractor {
    fn name(&self) -> &'static str {
        "rss"
    }

    fn extract(
        &self,
        document: &str,
        source: &Source,
    ) -> Result<Vec<CandidatePosting>, AppError> {
        let mut reader = Reader::from_str(document);
        reader.config_mut().check_end_names = false;

        let mut items = Vec::new();
        let mut current: Option<PendingItem> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(
                        source = %source.name,
                        position = reader.buffer_position(),
                        error = %e,
                        kept = items.len(),
                        "Feed markup broken, keeping items read so far"
                    );
                    break;
                }
            };

            match event {
                Event::Start(e) => {
                    let name = e.local_name();
                    if is_item(name.as_ref()) {
                        current = Some(PendingItem::new(name.as_ref() == b"entry"));
                    } else if let Some(item) = current.as_mut()
                        && let Some(field) = item.field(e.name())
                    {
                        item.open(field, href_of(&e));
                    }
                }
                Event::Empty(e) => {
                    if let Some(item) = current.as_mut()
                        && item.field(e.name()) == Some(Field::Link)
                        && item.link.is_none()
                    {
                        item.link = href_of(&e).map(|h| h.trim().to_string());
                    }
                }
                Event::Text(t) => {
                    if let Some(item) = current.as_mut() {
                        match t.unescape() {
                            Ok(text) => item.push_text(&text),
                            Err(_) => item.push_text(&String::from_utf8_lossy(&t)),
                        }
                    }
                }
                Event::CData(c) => {
                    if let Some(item) = current.as_mut() {
                        item.push_text(&String::from_utf8_lossy(&c));
                    }
                }
                Event::End(e) => {
                    let name = e.local_name();
                    if is_item(name.as_ref()) {
                        if let Some(item) = current.take() {
                            items.push(item.finish());
                        }
                    } else if let Some(item) = current.as_mut()
                        && let Some(field) = item.field(e.name())
                    {
                        item.close(field);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(items)
    }
}
