use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;

/// Whitelist for rendered content fragments. Anything the HTML writer or the
/// highlighter does not emit is stripped; `javascript:` and other
/// non-whitelisted URL schemes are removed from links.
pub(crate) fn build_content_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = base_builder();

    builder.add_tag_attributes("button", &["type", "data-copy-text"]);
    builder.add_tag_attributes("figure", &["data-language"]);
    builder.link_rel(Some("noopener noreferrer"));

    builder
}

fn base_builder() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "button",
        "code",
        "div",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "li",
        "ol",
        "p",
        "pre",
        "span",
        "strong",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from([
        "class",
        "id",
        "role",
        "aria-label",
        "data-role",
        "data-section-index",
    ]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes("code", &["data-language", "class"]);
    builder.add_tag_attributes("pre", &["class", "data-language"]);

    // Replaces ammonia's defaults rather than extending them.
    builder.url_schemes(HashSet::from(["http", "https", "mailto"]));

    builder
}

#[cfg(test)]
mod tests {
    use super::build_content_sanitizer;

    #[test]
    fn keeps_copy_button_and_payload() {
        let html = build_content_sanitizer()
            .clean(
                "<figure class=\"code-block\"><button type=\"button\" data-role=\"code-copy-button\" \
                 data-copy-text=\"npm run dev\">Copy</button></figure>",
            )
            .to_string();

        assert!(html.contains("data-copy-text=\"npm run dev\""));
        assert!(html.contains("data-role=\"code-copy-button\""));
    }

    #[test]
    fn external_links_get_rel_and_keep_target() {
        let html = build_content_sanitizer()
            .clean("<a href=\"https://nextjs.org/docs\" target=\"_blank\">Docs</a>")
            .to_string();

        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn ftp_links_are_not_whitelisted() {
        let html = build_content_sanitizer()
            .clean("<a href=\"ftp://example.com/file\">file</a>")
            .to_string();

        assert!(!html.contains("ftp:"));
    }

    #[test]
    fn script_urls_and_tags_are_removed() {
        let html = build_content_sanitizer()
            .clean("<a href=\"javascript:alert(1)\">x</a><script>alert(1)</script><img src=x>")
            .to_string();

        assert!(!html.contains("javascript:"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("<img"));
    }
}
