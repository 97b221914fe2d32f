use serde::Serialize;
use thiserror::Error;

use crate::application::clipboard::ClipboardPayload;
use crate::domain::inline::InlineNode;
use crate::domain::sections::{ContentSection, HeadingLevel, LinkItem, SectionSlot};

/// Visual tier a heading is drawn at. Level 1 is the largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualWeight {
    Largest,
    Medium,
    Small,
}

impl VisualWeight {
    pub fn for_level(level: HeadingLevel) -> Self {
        match level.get() {
            1 => Self::Largest,
            2 => Self::Medium,
            _ => Self::Small,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Largest => "content-heading--largest",
            Self::Medium => "content-heading--medium",
            Self::Small => "content-heading--small",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeCaption {
    pub filename: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCode {
    /// Document-unique element id (`code-block-1`, `code-block-2`, ...).
    pub dom_id: String,
    pub caption: Option<CodeCaption>,
    pub language: String,
    /// Highlighted `<pre>` markup; plain escaped text when highlighting fails.
    pub highlighted_html: String,
    pub copy: ClipboardPayload,
}

/// One visual block of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum RenderedBlock {
    Heading {
        level: HeadingLevel,
        weight: VisualWeight,
        anchor: String,
        text: String,
    },
    Paragraph {
        inlines: Vec<InlineNode>,
    },
    List {
        style: ListStyle,
        items: Vec<Vec<InlineNode>>,
    },
    Code(RenderedCode),
    Links {
        items: Vec<LinkItem>,
    },
    /// Stand-in for a section that failed to decode.
    Placeholder {
        index: usize,
        kind: Option<String>,
        reason: String,
    },
}

impl RenderedBlock {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::List { .. } => "list",
            Self::Code(_) => "code",
            Self::Links { .. } => "links",
            Self::Placeholder { .. } => "placeholder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnknownKind,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSection {
    pub index: usize,
    pub kind: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub anchor: String,
    pub text: String,
}

/// Ordered blocks plus diagnostics about sections that produced none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub blocks: Vec<RenderedBlock>,
    pub skipped: Vec<SkippedSection>,
}

impl RenderedDocument {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn outline(&self) -> Vec<OutlineEntry> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                RenderedBlock::Heading {
                    level,
                    anchor,
                    text,
                    ..
                } => Some(OutlineEntry {
                    level: *level,
                    anchor: anchor.clone(),
                    text: text.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn code_blocks(&self) -> impl Iterator<Item = &RenderedCode> {
        self.blocks.iter().filter_map(|block| match block {
            RenderedBlock::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn placeholder_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, RenderedBlock::Placeholder { .. }))
            .count()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("failed to highlight `{language}` code: {message}")]
    Highlighting { language: String, message: String },
}

/// Turns content sections into rendered documents.
///
/// Implementations are immutable after construction and shared across
/// threads; rendering is a pure function of its input.
pub trait RenderService: Send + Sync {
    fn render_slots(&self, slots: &[SectionSlot]) -> RenderedDocument;

    fn render(&self, sections: &[ContentSection]) -> RenderedDocument {
        let slots: Vec<SectionSlot> = sections.iter().cloned().map(Ok).collect();
        self.render_slots(&slots)
    }

    /// Sanitised HTML fragment for `document`.
    fn to_html(&self, document: &RenderedDocument) -> String;
}
