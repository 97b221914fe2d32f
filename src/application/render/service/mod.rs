mod config;
mod highlight;
mod html;

use std::sync::Arc;

use metrics::counter;
use once_cell::sync::Lazy;
use syntect::{dumps::from_uncompressed_data, html::ClassStyle, parsing::SyntaxSet};
use tracing::{debug, warn};

use crate::application::clipboard::ClipboardPayload;
use crate::application::render::types::{
    CodeCaption, ListStyle, RenderService, RenderedBlock, RenderedCode, RenderedDocument,
    SkipReason, SkippedSection, VisualWeight,
};
use crate::domain::inline::parse_inline;
use crate::domain::sections::{CodeSection, ContentSection, SectionError, SectionSlot};
use crate::domain::slug::AnchorSlugger;

use highlight::{highlight_code, plain_code};
use config::build_content_sanitizer;

pub const METRIC_RENDER_BLOCKS_TOTAL: &str = "folio_render_blocks_total";
pub const METRIC_RENDER_PLACEHOLDERS_TOTAL: &str = "folio_render_placeholders_total";
pub const METRIC_RENDER_SKIPPED_TOTAL: &str = "folio_render_skipped_total";

/// Section renderer with Syntect highlighting and Ammonia sanitisation.
pub struct ContentRenderService {
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
    sanitizer: ammonia::Builder<'static>,
}

impl ContentRenderService {
    /// Construct a renderer using the syntax pack generated by `build.rs`,
    /// emitting `syntax-` prefixed CSS classes.
    pub fn new() -> Self {
        let syntax_bytes = include_bytes!(env!("SYNTAX_PACK_FILE"));
        let syntax_set: SyntaxSet =
            from_uncompressed_data(syntax_bytes).expect("syntax pack must be valid");

        Self {
            syntax_set,
            class_style: ClassStyle::SpacedPrefixed { prefix: "syntax-" },
            sanitizer: build_content_sanitizer(),
        }
    }

    fn render_code(&self, ordinal: usize, code: &CodeSection) -> RenderedCode {
        let highlighted_html = highlight_code(
            &code.language,
            &code.content,
            &self.syntax_set,
            &self.class_style,
        )
        .unwrap_or_else(|err| {
            warn!(
                target = "folio::application::render",
                language = %code.language,
                error = %err,
                "falling back to plain code block"
            );
            plain_code(&code.language, &code.content)
        });

        RenderedCode {
            dom_id: format!("code-block-{ordinal}"),
            caption: code.filename.as_ref().map(|filename| CodeCaption {
                filename: filename.clone(),
                language: code.language.clone(),
            }),
            language: code.language.clone(),
            highlighted_html,
            copy: ClipboardPayload::new(code.content.clone()),
        }
    }
}

static RENDER_SERVICE: Lazy<Arc<ContentRenderService>> =
    Lazy::new(|| Arc::new(ContentRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ContentRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for ContentRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for ContentRenderService {
    fn render_slots(&self, slots: &[SectionSlot]) -> RenderedDocument {
        let mut pass = RenderPass::new(self);
        for (index, slot) in slots.iter().enumerate() {
            match slot {
                Ok(section) => pass.section(index, section),
                Err(error) => pass.placeholder(index, error),
            }
        }
        let document = pass.finish();

        counter!(METRIC_RENDER_BLOCKS_TOTAL).increment(document.len() as u64);
        counter!(METRIC_RENDER_PLACEHOLDERS_TOTAL).increment(document.placeholder_count() as u64);
        counter!(METRIC_RENDER_SKIPPED_TOTAL).increment(document.skipped.len() as u64);
        debug!(
            target = "folio::application::render",
            sections = slots.len(),
            blocks = document.len(),
            skipped = document.skipped.len(),
            "rendered document"
        );

        document
    }

    fn to_html(&self, document: &RenderedDocument) -> String {
        let raw = html::write_document(document);
        html::encode_carriage_returns(self.sanitizer.clean(&raw).to_string())
    }
}

/// State for one document: anchors and code ordinals are per document.
struct RenderPass<'a> {
    service: &'a ContentRenderService,
    slugger: AnchorSlugger,
    code_blocks: usize,
    document: RenderedDocument,
}

impl<'a> RenderPass<'a> {
    fn new(service: &'a ContentRenderService) -> Self {
        Self {
            service,
            slugger: AnchorSlugger::new(),
            code_blocks: 0,
            document: RenderedDocument::default(),
        }
    }

    fn section(&mut self, index: usize, section: &ContentSection) {
        let block = match section {
            ContentSection::Header(heading) => RenderedBlock::Heading {
                level: heading.level,
                weight: VisualWeight::for_level(heading.level),
                anchor: self.slugger.anchor_or_position(&heading.content, index + 1),
                text: heading.content.clone(),
            },
            ContentSection::Paragraph(paragraph) => RenderedBlock::Paragraph {
                inlines: parse_inline(&paragraph.content),
            },
            ContentSection::List(list) if list.items.is_empty() => {
                return self.skip(index, section.kind(), SkipReason::Empty);
            }
            ContentSection::List(list) => RenderedBlock::List {
                style: if list.ordered {
                    ListStyle::Ordered
                } else {
                    ListStyle::Unordered
                },
                items: list.items.iter().map(|item| parse_inline(item)).collect(),
            },
            ContentSection::Code(code) => {
                self.code_blocks += 1;
                RenderedBlock::Code(self.service.render_code(self.code_blocks, code))
            }
            ContentSection::Links(links) if links.items.is_empty() => {
                return self.skip(index, section.kind(), SkipReason::Empty);
            }
            ContentSection::Links(links) => RenderedBlock::Links {
                items: links.items.clone(),
            },
            ContentSection::Unrecognized { kind } => {
                debug!(
                    target = "folio::application::render",
                    index,
                    kind = %kind,
                    "skipping section of unknown kind"
                );
                return self.skip(index, kind, SkipReason::UnknownKind);
            }
        };

        self.document.blocks.push(block);
    }

    fn placeholder(&mut self, index: usize, error: &SectionError) {
        warn!(
            target = "folio::application::render",
            index,
            kind = error.kind.as_deref().unwrap_or("untyped"),
            reason = %error.reason,
            "section failed to decode; rendering placeholder"
        );
        self.document.blocks.push(RenderedBlock::Placeholder {
            index,
            kind: error.kind.clone(),
            reason: error.reason.clone(),
        });
    }

    fn skip(&mut self, index: usize, kind: &str, reason: SkipReason) {
        self.document.skipped.push(SkippedSection {
            index,
            kind: kind.to_string(),
            reason,
        });
    }

    fn finish(self) -> RenderedDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sections::HeadingLevel;

    #[test]
    fn anchors_are_unique_per_document() {
        let service = render_service();
        let document = service.render(&[
            ContentSection::heading(HeadingLevel::TWO, "Setup"),
            ContentSection::heading(HeadingLevel::THREE, "Setup"),
            ContentSection::heading(HeadingLevel::THREE, "***"),
        ]);

        let anchors: Vec<String> = document
            .outline()
            .into_iter()
            .map(|entry| entry.anchor)
            .collect();
        assert_eq!(anchors, ["setup", "setup-2", "section-3"]);

        let again = service.render(&[ContentSection::heading(HeadingLevel::ONE, "Setup")]);
        assert_eq!(again.outline()[0].anchor, "setup");
    }

    #[test]
    fn generated_suffixes_do_not_collide_with_literal_ones() {
        let service = render_service();
        let document = service.render(&[
            ContentSection::heading(HeadingLevel::TWO, "Setup"),
            ContentSection::heading(HeadingLevel::TWO, "Setup"),
            ContentSection::heading(HeadingLevel::TWO, "Setup 2"),
        ]);

        let anchors: Vec<String> = document
            .outline()
            .into_iter()
            .map(|entry| entry.anchor)
            .collect();
        assert_eq!(anchors, ["setup", "setup-2", "setup-2-2"]);

        let html = service.to_html(&document);
        assert_eq!(html.matches("id=\"setup-2\"").count(), 1);
    }

    #[test]
    fn sanitised_copy_payload_keeps_carriage_returns() {
        let service = render_service();
        let document = service.render(&[ContentSection::code("a\r\nb", "bash", None)]);
        let html = service.to_html(&document);

        assert!(!html.contains('\r'));
        assert!(html.contains("data-copy-text=\"a&#13;\nb\""));
    }

    #[test]
    fn code_blocks_are_numbered_in_order() {
        let document = render_service().render(&[
            ContentSection::code("ls", "bash", None),
            ContentSection::paragraph("between"),
            ContentSection::code("pwd", "bash", None),
        ]);

        let ids: Vec<&str> = document
            .code_blocks()
            .map(|code| code.dom_id.as_str())
            .collect();
        assert_eq!(ids, ["code-block-1", "code-block-2"]);
    }

    #[test]
    fn tsx_is_highlighted_with_prefixed_classes() {
        let document = render_service().render(&[ContentSection::code(
            "export default function Page() {}",
            "tsx",
            Some("app/page.tsx"),
        )]);
        let code = document.code_blocks().next().expect("code block");

        assert!(code.highlighted_html.contains("syntax-"));
        assert!(code.highlighted_html.contains("data-language=\"tsx\""));
    }

    #[test]
    fn sanitised_html_keeps_structure() {
        let service = render_service();
        let document = service.render(&[
            ContentSection::heading(HeadingLevel::ONE, "Intro"),
            ContentSection::paragraph("**bold** <script>alert(1)</script>"),
            ContentSection::links([("Docs", "https://nextjs.org/docs")]),
        ]);
        let html = service.to_html(&document);

        assert!(html.contains("<h1 id=\"intro\" class=\"content-heading content-heading--largest\">Intro</h1>"));
        assert!(html.contains("<strong>bold</strong> &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }
}
