//! Anchor slugs for headings.
//!
//! Slugs are ASCII, lowercase and hyphen-separated (`slug` crate). Headings
//! that produce nothing usable, such as punctuation-only titles, fall back to a
//! positional anchor so every heading in a document stays linkable.

use std::collections::{HashMap, HashSet};

use slug::slugify;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("`{input}` has no characters a slug can keep")]
    Unrepresentable { input: String },
}

/// Derive a base slug from human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Hands out document-unique anchors in heading order.
///
/// Repeats receive the next free suffix (`setup`, `setup-2`, `setup-3`). A
/// suffix never reuses an anchor another heading already holds.
#[derive(Default, Debug)]
pub struct AnchorSlugger {
    issued: HashSet<String>,
    next_suffix: HashMap<String, usize>,
}

impl AnchorSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor for `heading`; unusable headings become `section-<position>`.
    pub fn anchor_or_position(&mut self, heading: &str, position: usize) -> String {
        let base = derive_slug(heading).unwrap_or_else(|_| format!("section-{position}"));
        self.claim(base)
    }

    fn claim(&mut self, base: String) -> String {
        if self.issued.insert(base.clone()) {
            return base;
        }

        let next = self.next_suffix.entry(base.clone()).or_insert(2);
        loop {
            let candidate = format!("{base}-{next}");
            *next += 1;
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_lowercases_and_hyphenates() {
        assert_eq!(
            derive_slug("Getting Started with Next.js 14").as_deref(),
            Ok("getting-started-with-next-js-14")
        );
    }

    #[test]
    fn derive_slug_rejects_blank_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn anchor_slugger_suffixes_repeats() {
        let mut slugger = AnchorSlugger::new();

        assert_eq!(slugger.anchor_or_position("Overview", 1), "overview");
        assert_eq!(slugger.anchor_or_position("Overview", 2), "overview-2");
        assert_eq!(slugger.anchor_or_position("overview", 3), "overview-3");
    }

    #[test]
    fn suffixes_skip_anchors_taken_by_other_headings() {
        let mut slugger = AnchorSlugger::new();
        let anchors: Vec<String> = ["Setup", "Setup", "Setup 2"]
            .iter()
            .enumerate()
            .map(|(position, heading)| slugger.anchor_or_position(heading, position + 1))
            .collect();
        assert_eq!(anchors, ["setup", "setup-2", "setup-2-2"]);

        let mut slugger = AnchorSlugger::new();
        assert_eq!(slugger.anchor_or_position("Setup 2", 1), "setup-2");
        assert_eq!(slugger.anchor_or_position("Setup", 2), "setup");
        assert_eq!(slugger.anchor_or_position("Setup", 3), "setup-3");
    }

    #[test]
    fn punctuation_headings_fall_back_to_position() {
        let mut slugger = AnchorSlugger::new();

        assert_eq!(slugger.anchor_or_position("?!", 4), "section-4");
        assert_eq!(slugger.anchor_or_position("Section 4", 9), "section-4-2");
        assert_eq!(slugger.anchor_or_position("Section 4 2", 10), "section-4-2-2");
    }
}
