use std::fmt::Write as _;

use crate::application::render::types::{
    ListStyle, RenderedBlock, RenderedCode, RenderedDocument,
};
use crate::domain::inline::InlineNode;
use crate::domain::sections::LinkItem;

/// Serialise a document to an HTML fragment. All text is escaped here;
/// the only markup comes from the writer itself and the highlighter.
pub(crate) fn write_document(document: &RenderedDocument) -> String {
    let mut out = String::with_capacity(document.len() * 96);
    for block in &document.blocks {
        write_block(&mut out, block);
        out.push('\n');
    }
    out
}

fn write_block(out: &mut String, block: &RenderedBlock) {
    match block {
        RenderedBlock::Heading {
            level,
            weight,
            anchor,
            text,
        } => {
            let _ = write!(
                out,
                "<h{level} id=\"{}\" class=\"content-heading {}\">{}</h{level}>",
                escape_attribute(anchor),
                weight.css_class(),
                escape_text(text)
            );
        }
        RenderedBlock::Paragraph { inlines } => {
            out.push_str("<p class=\"content-paragraph\">");
            write_inlines(out, inlines);
            out.push_str("</p>");
        }
        RenderedBlock::List { style, items } => {
            let (tag, modifier) = match style {
                ListStyle::Ordered => ("ol", "ordered"),
                ListStyle::Unordered => ("ul", "unordered"),
            };
            let _ = write!(out, "<{tag} class=\"content-list content-list--{modifier}\">");
            for item in items {
                out.push_str("<li>");
                write_inlines(out, item);
                out.push_str("</li>");
            }
            let _ = write!(out, "</{tag}>");
        }
        RenderedBlock::Code(code) => write_code(out, code),
        RenderedBlock::Links { items } => write_links(out, items),
        RenderedBlock::Placeholder {
            index,
            kind,
            reason,
        } => {
            let _ = write!(
                out,
                "<div class=\"content-placeholder\" role=\"alert\" data-section-index=\"{index}\">\
                 <strong>Section #{index} could not be displayed</strong> \
                 <span class=\"content-placeholder__reason\">({}) {}</span></div>",
                escape_text(kind.as_deref().unwrap_or("untyped")),
                escape_text(reason)
            );
        }
    }
}

fn write_code(out: &mut String, code: &RenderedCode) {
    let _ = write!(
        out,
        "<figure class=\"code-block\" id=\"{}\" data-language=\"{}\">",
        escape_attribute(&code.dom_id),
        escape_attribute(&code.language)
    );
    if let Some(caption) = &code.caption {
        let _ = write!(
            out,
            "<figcaption class=\"code-block__caption\">\
             <span class=\"code-block__filename\">{}</span>\
             <span class=\"code-block__language\">{}</span></figcaption>",
            escape_text(&caption.filename),
            escape_text(&caption.language)
        );
    }
    let _ = write!(
        out,
        "<button type=\"button\" class=\"code-block__copy\" data-role=\"code-copy-button\" \
         aria-label=\"Copy code\" data-copy-text=\"{}\">Copy</button>",
        escape_attribute(code.copy.as_str())
    );
    out.push_str(&code.highlighted_html);
    out.push_str("</figure>");
}

fn write_links(out: &mut String, items: &[LinkItem]) {
    out.push_str("<ol class=\"content-links\">");
    for item in items {
        let _ = write!(
            out,
            "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>",
            escape_attribute(&item.url),
            escape_text(&item.text)
        );
    }
    out.push_str("</ol>");
}

fn write_inlines(out: &mut String, nodes: &[InlineNode]) {
    for node in nodes {
        match node {
            InlineNode::Text(text) => out.push_str(&escape_text(text)),
            InlineNode::Strong(children) => {
                out.push_str("<strong>");
                write_inlines(out, children);
                out.push_str("</strong>");
            }
            InlineNode::Emphasis(children) => {
                out.push_str("<em>");
                write_inlines(out, children);
                out.push_str("</em>");
            }
        }
    }
}

pub(crate) fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Attribute escaping that keeps whitespace, so copy payloads survive intact.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// The sanitiser re-serialises `&#13;` as a raw CR, which HTML parsers fold
/// into LF. Put the reference back so copy payloads keep their line endings.
pub(crate) fn encode_carriage_returns(html: String) -> String {
    if html.contains('\r') {
        html.replace('\r', "&#13;")
    } else {
        html
    }
}
