//! Typed content sections that make up a post body.
//!
//! Sections arrive as JSON objects discriminated by a `type` field. Decoding
//! maps every object onto [`ContentSection`]. Kinds this build does not know
//! survive as [`ContentSection::Unrecognized`] so newer content never breaks an
//! older renderer, while objects that do not match their declared shape
//! produce a [`SectionError`] carrying the offending index.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::error::DomainError;

pub const MIN_HEADING_LEVEL: u8 = 1;
pub const MAX_HEADING_LEVEL: u8 = 3;

/// Semantic heading level, restricted to `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const THREE: Self = Self(3);

    pub fn new(level: u8) -> Result<Self, DomainError> {
        if (MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(DomainError::validation(format!(
                "heading level `{level}` is outside {MIN_HEADING_LEVEL}..={MAX_HEADING_LEVEL}"
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.0
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Paragraph {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListSection {
    pub items: Vec<String>,
    #[serde(default)]
    pub ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeSection {
    pub content: String,
    pub language: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinksSection {
    pub items: Vec<LinkItem>,
}

/// One block of post content. Order within a document is rendering order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSection {
    Header(Heading),
    Paragraph(Paragraph),
    List(ListSection),
    Code(CodeSection),
    Links(LinksSection),
    /// A well-formed section whose `type` this build does not render.
    Unrecognized { kind: String },
}

impl ContentSection {
    pub fn heading(level: HeadingLevel, content: impl Into<String>) -> Self {
        Self::Header(Heading {
            level,
            content: content.into(),
        })
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::Paragraph(Paragraph {
            content: content.into(),
        })
    }

    pub fn list<I, S>(items: I, ordered: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(ListSection {
            items: items.into_iter().map(Into::into).collect(),
            ordered,
        })
    }

    pub fn code(
        content: impl Into<String>,
        language: impl Into<String>,
        filename: Option<&str>,
    ) -> Self {
        Self::Code(CodeSection {
            content: content.into(),
            language: language.into(),
            filename: filename.map(str::to_string),
        })
    }

    pub fn links<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        Self::Links(LinksSection {
            items: items
                .into_iter()
                .map(|(text, url)| LinkItem {
                    text: text.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        })
    }

    /// The discriminator this section was declared with.
    pub fn kind(&self) -> &str {
        match self {
            Self::Header(_) => "header",
            Self::Paragraph(_) => "paragraph",
            Self::List(_) => "list",
            Self::Code(_) => "code",
            Self::Links(_) => "links",
            Self::Unrecognized { kind } => kind.as_str(),
        }
    }

    /// Decode a single section object found at `index` of its document.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, SectionError> {
        let Some(object) = value.as_object() else {
            return Err(SectionError::new(
                index,
                None,
                format!("expected an object, found {}", json_kind(value)),
            ));
        };

        let kind = match object.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => {
                return Err(SectionError::new(
                    index,
                    None,
                    format!("`type` must be a string, found {}", json_kind(other)),
                ));
            }
            None => {
                return Err(SectionError::new(index, None, "missing `type` field"));
            }
        };

        let decoded = match kind {
            "header" => payload(value).map(Self::Header),
            "paragraph" => payload(value).map(Self::Paragraph),
            "list" => payload(value).map(Self::List),
            "code" => payload(value).map(Self::Code),
            "links" => payload(value).map(Self::Links),
            other => {
                return Ok(Self::Unrecognized {
                    kind: other.to_string(),
                });
            }
        };

        decoded.map_err(|err| SectionError::new(index, Some(kind.to_string()), err.to_string()))
    }
}

fn payload<'a, T>(value: &'a Value) -> Result<T, serde_json::Error>
where
    T: Deserialize<'a>,
{
    T::deserialize(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A section that does not match the shape its `type` promises.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "section #{index} ({}) is malformed: {reason}",
    .kind.as_deref().unwrap_or("untyped")
)]
pub struct SectionError {
    pub index: usize,
    pub kind: Option<String>,
    pub reason: String,
}

impl SectionError {
    pub fn new(index: usize, kind: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("content sections must be an array, found {found}")]
    NotAnArray { found: &'static str },
    #[error(transparent)]
    Section(#[from] SectionError),
}

/// Outcome of decoding one section: the section itself or the reason it was rejected.
pub type SectionSlot = Result<ContentSection, SectionError>;

/// Decode every section independently so one bad entry cannot hide the rest.
pub fn decode_sections(value: &Value) -> Result<Vec<SectionSlot>, DocumentError> {
    let items = value.as_array().ok_or(DocumentError::NotAnArray {
        found: json_kind(value),
    })?;
    Ok(decode_section_values(items))
}

pub fn decode_section_values(items: &[Value]) -> Vec<SectionSlot> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| ContentSection::from_value(index, item))
        .collect()
}

/// Decode a document, rejecting it at the first malformed section.
pub fn decode_sections_strict(value: &Value) -> Result<Vec<ContentSection>, DocumentError> {
    decode_sections(value)?
        .into_iter()
        .map(|slot| slot.map_err(DocumentError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_every_known_kind_in_order() {
        let document = json!([
            {"type": "header", "level": 2, "content": "Install"},
            {"type": "paragraph", "content": "Run the following:"},
            {"type": "list", "items": ["a", "b"], "ordered": true},
            {"type": "code", "language": "bash", "content": "npm run dev"},
            {"type": "links", "items": [{"text": "Docs", "url": "https://nextjs.org/docs"}]}
        ]);

        let sections = decode_sections_strict(&document).expect("valid document");
        let kinds: Vec<&str> = sections.iter().map(ContentSection::kind).collect();
        assert_eq!(kinds, ["header", "paragraph", "list", "code", "links"]);
        assert_eq!(
            sections[0],
            ContentSection::heading(HeadingLevel::TWO, "Install")
        );
        assert_eq!(
            sections[3],
            ContentSection::code("npm run dev", "bash", None)
        );
    }

    #[test]
    fn list_defaults_to_unordered() {
        let section =
            ContentSection::from_value(0, &json!({"type": "list", "items": ["x"]})).expect("list");
        assert_eq!(section, ContentSection::list(["x"], false));
    }

    #[test]
    fn unknown_kind_is_preserved_not_rejected() {
        let section = ContentSection::from_value(4, &json!({"type": "video", "src": "clip.mp4"}))
            .expect("unknown kinds decode");
        assert_eq!(
            section,
            ContentSection::Unrecognized {
                kind: "video".into()
            }
        );
    }

    #[test]
    fn heading_level_out_of_range_is_rejected() {
        let err =
            ContentSection::from_value(7, &json!({"type": "header", "level": 4, "content": "Deep"}))
                .expect_err("level 4 is rejected");
        assert_eq!(err.index, 7);
        assert_eq!(err.kind.as_deref(), Some("header"));
        assert!(err.reason.contains("outside 1..=3"), "{}", err.reason);
    }

    #[test]
    fn heading_level_zero_is_rejected_in_rust_too() {
        assert!(HeadingLevel::new(0).is_err());
        assert!(HeadingLevel::new(4).is_err());
        assert_eq!(HeadingLevel::new(3).map(HeadingLevel::get), Ok(3));
    }

    #[test]
    fn shape_mismatch_names_index_and_kind() {
        let err = ContentSection::from_value(2, &json!({"type": "code", "content": 42}))
            .expect_err("numeric content is a mismatch");
        assert_eq!(err.index, 2);
        assert!(err.to_string().starts_with("section #2 (code) is malformed"));
    }

    #[test]
    fn untyped_sections_are_errors() {
        let missing = ContentSection::from_value(0, &json!({"content": "orphan"}))
            .expect_err("missing type");
        assert_eq!(missing.kind, None);
        assert!(missing.to_string().contains("untyped"));

        let scalar = ContentSection::from_value(1, &json!("text")).expect_err("scalar section");
        assert!(scalar.reason.contains("a string"));
    }

    #[test]
    fn lenient_decode_keeps_good_sections_around_bad_ones() {
        let document = json!([
            {"type": "paragraph", "content": "before"},
            {"type": "paragraph"},
            {"type": "paragraph", "content": "after"}
        ]);

        let slots = decode_sections(&document).expect("array document");
        assert_eq!(slots.len(), 3);
        assert!(slots[0].is_ok());
        assert_eq!(slots[1].as_ref().map_err(|err| err.index), Err(1));
        assert!(slots[2].is_ok());

        let strict = decode_sections_strict(&document).expect_err("strict rejects");
        assert!(matches!(strict, DocumentError::Section(SectionError { index: 1, .. })));
    }

    #[test]
    fn non_array_document_is_rejected() {
        let err = decode_sections(&json!({"type": "paragraph"})).expect_err("object document");
        assert_eq!(err, DocumentError::NotAnArray { found: "an object" });
    }

    #[test]
    fn empty_items_decode_without_error() {
        let section =
            ContentSection::from_value(0, &json!({"type": "links", "items": []})).expect("links");
        assert_eq!(section, ContentSection::Links(LinksSection { items: vec![] }));
    }
}
