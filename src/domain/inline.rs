//! Inline emphasis for paragraph and list text.
//!
//! Only `**strong**`, `*emphasis*` and the escapes `\*` / `\\` are
//! interpreted. Everything else is text, including anything that looks like
//! HTML, and is escaped by whichever writer renders the nodes. Delimiters that
//! never find a partner are kept as literal asterisks.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", content = "value", rename_all = "snake_case")]
pub enum InlineNode {
    Text(String),
    Strong(Vec<InlineNode>),
    Emphasis(Vec<InlineNode>),
}

impl InlineNode {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Concatenate the visible text of `nodes`, dropping emphasis.
pub fn plain_text(nodes: &[InlineNode]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[InlineNode], out: &mut String) {
    for node in nodes {
        match node {
            InlineNode::Text(text) => out.push_str(text),
            InlineNode::Strong(children) | InlineNode::Emphasis(children) => {
                collect_text(children, out)
            }
        }
    }
}

pub fn parse_inline(input: &str) -> Vec<InlineNode> {
    let mut stack = FrameStack::new();

    for token in tokenize(input) {
        match token {
            Token::Text(text) => stack.push_text(&text),
            Token::Run(run) => stack.apply_run(run),
        }
    }

    stack.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Single,
    Double,
}

impl Marker {
    fn width(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }

    fn literal(self) -> &'static str {
        match self {
            Self::Single => "*",
            Self::Double => "**",
        }
    }

    fn wrap(self, children: Vec<InlineNode>) -> InlineNode {
        match self {
            Self::Single => InlineNode::Emphasis(children),
            Self::Double => InlineNode::Strong(children),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Run {
    count: usize,
    can_open: bool,
    can_close: bool,
}

#[derive(Debug)]
enum Token {
    Text(String),
    Run(Run),
}

fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut index = 0;

    while index < chars.len() {
        match chars[index] {
            '\\' if matches!(chars.get(index + 1), Some('*' | '\\')) => {
                text.push(chars[index + 1]);
                index += 2;
            }
            '*' => {
                let start = index;
                while chars.get(index) == Some(&'*') {
                    index += 1;
                }
                let before = start.checked_sub(1).map(|at| chars[at]);
                let after = chars.get(index).copied();

                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(Token::Run(Run {
                    count: index - start,
                    can_open: after.is_some_and(|ch| !ch.is_whitespace()),
                    can_close: before.is_some_and(|ch| !ch.is_whitespace()),
                }));
            }
            other => {
                text.push(other);
                index += 1;
            }
        }
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

struct Frame {
    marker: Option<Marker>,
    children: Vec<InlineNode>,
}

struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    fn new() -> Self {
        Self {
            frames: vec![Frame {
                marker: None,
                children: Vec::new(),
            }],
        }
    }

    fn top(&mut self) -> &mut Vec<InlineNode> {
        let last = self.frames.len() - 1;
        &mut self.frames[last].children
    }

    fn push_text(&mut self, text: &str) {
        push_text(self.top(), text);
    }

    fn apply_run(&mut self, run: Run) {
        let mut remaining = run.count;

        if run.can_close {
            while remaining > 0 {
                let Some(position) = self.closable(remaining) else {
                    break;
                };
                remaining -= self.close(position);
            }
        }

        if run.can_open {
            while remaining > 0 {
                let marker = if remaining >= 2 {
                    Marker::Double
                } else {
                    Marker::Single
                };
                self.frames.push(Frame {
                    marker: Some(marker),
                    children: Vec::new(),
                });
                remaining -= marker.width();
            }
        }

        if remaining > 0 {
            self.push_text(&"*".repeat(remaining));
        }
    }

    /// Index of the nearest open frame a run of `available` stars can close.
    fn closable(&self, available: usize) -> Option<usize> {
        self.frames
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, frame)| frame.marker.is_some_and(|m| m.width() <= available))
            .map(|(position, _)| position)
    }

    /// Close the frame at `position`, dissolving anything opened after it.
    fn close(&mut self, position: usize) -> usize {
        while self.frames.len() > position + 1 {
            self.dissolve_top();
        }

        let Some(Frame {
            marker: Some(marker),
            children,
        }) = self.frames.pop()
        else {
            return 0;
        };

        let parent = self.top();
        if children.is_empty() {
            push_text(parent, marker.literal());
            push_text(parent, marker.literal());
        } else {
            parent.push(marker.wrap(children));
        }
        marker.width()
    }

    fn dissolve_top(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let parent = self.top();
        if let Some(marker) = frame.marker {
            push_text(parent, marker.literal());
        }
        for child in frame.children {
            match child {
                InlineNode::Text(text) => push_text(parent, &text),
                other => parent.push(other),
            }
        }
    }

    fn finish(mut self) -> Vec<InlineNode> {
        while self.frames.len() > 1 {
            self.dissolve_top();
        }
        self.frames.pop().map(|root| root.children).unwrap_or_default()
    }
}

fn push_text(nodes: &mut Vec<InlineNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(InlineNode::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(InlineNode::text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong(children: Vec<InlineNode>) -> InlineNode {
        InlineNode::Strong(children)
    }

    fn em(children: Vec<InlineNode>) -> InlineNode {
        InlineNode::Emphasis(children)
    }

    fn text(value: &str) -> InlineNode {
        InlineNode::text(value)
    }

    #[test]
    fn plain_text_is_a_single_node() {
        assert_eq!(parse_inline("just words"), vec![text("just words")]);
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn strong_prefix_from_catalog_items() {
        assert_eq!(
            parse_inline("**Use TypeScript** - Better development experience"),
            vec![
                strong(vec![text("Use TypeScript")]),
                text(" - Better development experience"),
            ]
        );
    }

    #[test]
    fn emphasis_nests_inside_strong() {
        assert_eq!(
            parse_inline("**a *b* c**"),
            vec![strong(vec![text("a "), em(vec![text("b")]), text(" c")])]
        );
    }

    #[test]
    fn triple_run_closes_inner_then_outer() {
        assert_eq!(
            parse_inline("**bold *and italic***"),
            vec![strong(vec![text("bold "), em(vec![text("and italic")])])]
        );
    }

    #[test]
    fn unclosed_markers_stay_literal() {
        assert_eq!(parse_inline("**never closed"), vec![text("**never closed")]);
        assert_eq!(
            parse_inline("*open **strong**"),
            vec![text("*open "), strong(vec![text("strong")])]
        );
    }

    #[test]
    fn spaced_asterisks_are_arithmetic_not_emphasis() {
        assert_eq!(parse_inline("2 * 3 * 4"), vec![text("2 * 3 * 4")]);
    }

    #[test]
    fn escapes_produce_literal_characters() {
        assert_eq!(
            parse_inline(r"\*not em\* and \\ slash"),
            vec![text(r"*not em* and \ slash")]
        );
        assert_eq!(parse_inline(r"a \n b"), vec![text(r"a \n b")]);
    }

    #[test]
    fn markup_is_carried_as_text() {
        assert_eq!(
            parse_inline("<img src=x onerror=alert(1)> *hi*"),
            vec![text("<img src=x onerror=alert(1)> "), em(vec![text("hi")])]
        );
    }

    #[test]
    fn plain_text_strips_emphasis() {
        let nodes = parse_inline("✅ **Test your code** - *always*");
        assert_eq!(plain_text(&nodes), "✅ Test your code - always");
    }
}
