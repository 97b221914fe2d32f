use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use super::html::{escape_attribute, escape_text};
use crate::application::render::types::RenderError;

/// Highlight `code` into a classed `<pre>` block. Unknown languages use the
/// plain-text syntax rather than failing.
pub(crate) fn highlight_code(
    language: &str,
    code: &str,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
) -> Result<String, RenderError> {
    let syntax =
        find_syntax(syntax_set, language).unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut code_with_newline = code.to_string();
    if !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, *class_style);

    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlighting {
                language: language.to_string(),
                message: err.to_string(),
            })?;
    }

    Ok(wrap_pre(language, &generator.finalize()))
}

/// Escaped, unhighlighted rendition used when highlighting fails.
pub(crate) fn plain_code(language: &str, code: &str) -> String {
    wrap_pre(language, &escape_text(code))
}

fn wrap_pre(language: &str, body: &str) -> String {
    let class_token = language_class(language);
    format!(
        "<pre class=\"syntax-highlight syntax-lang-{class_token}\" data-language=\"{}\">\
         <code class=\"language-{class_token} syntax-code\">{body}</code></pre>",
        escape_attribute(language)
    )
}

fn language_class(language: &str) -> String {
    let token: String = language
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if token.is_empty() {
        "text".to_string()
    } else {
        token
    }
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.trim().to_ascii_lowercase();
    if lowercase.is_empty() {
        return None;
    }
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(&lowercase))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}
