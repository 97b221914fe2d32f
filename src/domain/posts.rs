mod data;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use time::{Date, format_description::FormatItem, macros::format_description};

use crate::domain::error::DomainError;
use crate::domain::sections::{SectionSlot, decode_sections};

pub type PostId = u32;

pub const RELATED_POSTS_LIMIT: usize = 3;
pub const ALL_CATEGORIES: &str = "All";
pub const RELATED_EXCERPT_CHARS: usize = 100;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
pub const ISO_DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: PostId,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    #[serde(deserialize_with = "iso_date")]
    pub date: Date,
    pub read_time: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub content: PostContent,
}

impl BlogPost {
    pub fn shares_tag_with(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }

    pub fn human_date(&self) -> String {
        format_human_date(self.date)
    }
}

/// Post body: one decode result per section, in document order.
#[derive(Debug, Clone, Default)]
pub struct PostContent {
    pub sections: Vec<SectionSlot>,
}

impl<'de> Deserialize<'de> for PostContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawContent {
            #[serde(default = "empty_sections")]
            sections: Value,
        }

        let raw = RawContent::deserialize(deserializer)?;
        let sections = decode_sections(&raw.sections).map_err(serde::de::Error::custom)?;
        Ok(Self { sections })
    }
}

fn empty_sections() -> Value {
    Value::Array(Vec::new())
}

fn iso_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Date::parse(&raw, ISO_DATE_FORMAT).map_err(serde::de::Error::custom)
}

pub fn format_human_date(date: Date) -> String {
    date.format(HUMAN_DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Other posts sharing at least one tag with `tags`, in catalog order, capped at `limit`.
pub fn related_posts<'a>(
    posts: &'a [BlogPost],
    current: PostId,
    tags: &[String],
    limit: usize,
) -> Vec<&'a BlogPost> {
    posts
        .iter()
        .filter(|post| post.id != current)
        .filter(|post| post.shares_tag_with(tags))
        .take(limit)
        .collect()
}

/// Listing filter: free-text search plus an optional category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl PostQuery {
    pub fn matches(&self, post: &BlogPost) -> bool {
        self.matches_search(post) && self.matches_category(post)
    }

    fn matches_search(&self, post: &BlogPost) -> bool {
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();

        post.title.to_lowercase().contains(&needle)
            || post.excerpt.to_lowercase().contains(&needle)
            || post
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }

    fn matches_category(&self, post: &BlogPost) -> bool {
        match self.category.as_deref().map(str::trim) {
            None | Some("") | Some(ALL_CATEGORIES) => true,
            Some(category) => post.category == category,
        }
    }
}

pub fn filter_posts<'a>(posts: &'a [BlogPost], query: &PostQuery) -> Vec<&'a BlogPost> {
    posts.iter().filter(|post| query.matches(post)).collect()
}

/// Split into `(featured, regular)`, each keeping its input order.
pub fn partition_featured<'a>(
    posts: Vec<&'a BlogPost>,
) -> (Vec<&'a BlogPost>, Vec<&'a BlogPost>) {
    posts.into_iter().partition(|post| post.featured)
}

/// `All`, then each category in order of first appearance.
pub fn categories(posts: &[BlogPost]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(
            posts
                .iter()
                .filter(|post| seen.insert(post.category.as_str()))
                .map(|post| post.category.clone()),
        )
        .collect()
}

pub fn excerpt_preview(text: &str, max_chars: usize) -> String {
    let mut preview: String = text.chars().take(max_chars).collect();
    preview.push_str("...");
    preview
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not valid post JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("post id {id} appears more than once in the catalog")]
    DuplicateId { id: PostId },
}

/// The full, ordered set of posts.
#[derive(Debug, Clone)]
pub struct Catalog {
    posts: Vec<BlogPost>,
}

impl Catalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(data::BUNDLED_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let posts: Vec<BlogPost> = serde_json::from_str(json)?;
        Self::from_posts(posts)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_posts(posts: Vec<BlogPost>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::with_capacity(posts.len());
        if let Some(duplicate) = posts.iter().find(|post| !ids.insert(post.id)) {
            return Err(CatalogError::DuplicateId { id: duplicate.id });
        }
        Ok(Self { posts })
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn find(&self, id: PostId) -> Option<&BlogPost> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn get(&self, id: PostId) -> Result<&BlogPost, DomainError> {
        self.find(id).ok_or_else(|| DomainError::not_found("post", id))
    }

    pub fn related(&self, post: &BlogPost, limit: usize) -> Vec<&BlogPost> {
        related_posts(&self.posts, post.id, &post.tags, limit)
    }

    pub fn filter(&self, query: &PostQuery) -> Vec<&BlogPost> {
        filter_posts(&self.posts, query)
    }

    pub fn categories(&self) -> Vec<String> {
        categories(&self.posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn post(id: PostId, category: &str, tags: &[&str]) -> BlogPost {
        BlogPost {
            id,
            title: format!("Post {id}"),
            excerpt: format!("Excerpt for post {id}"),
            author: "Author".into(),
            date: date!(2024 - 01 - 15),
            read_time: "5 min read".into(),
            category: category.into(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            image: None,
            featured: false,
            content: PostContent::default(),
        }
    }

    fn ids(posts: &[&BlogPost]) -> Vec<PostId> {
        posts.iter().map(|post| post.id).collect()
    }

    #[test]
    fn related_excludes_current_and_requires_overlap() {
        let posts = vec![
            post(1, "Web", &["React", "Next.js"]),
            post(2, "CSS", &["CSS"]),
            post(3, "Web", &["React"]),
            post(4, "Web", &["Next.js", "React"]),
        ];
        let tags = posts[0].tags.clone();

        assert_eq!(ids(&related_posts(&posts, 1, &tags, 3)), vec![3, 4]);
    }

    #[test]
    fn related_truncates_in_catalog_order() {
        let posts: Vec<BlogPost> = (1..=6).map(|id| post(id, "Web", &["Rust"])).collect();
        let tags = vec!["Rust".to_string()];

        assert_eq!(ids(&related_posts(&posts, 2, &tags, 3)), vec![1, 3, 4]);
    }

    #[test]
    fn related_is_empty_without_shared_tags() {
        let posts = vec![post(1, "Web", &["A"]), post(2, "Web", &["B"])];
        let tags = vec!["A".to_string()];

        assert!(related_posts(&posts, 1, &tags, 3).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_title_excerpt_and_tags() {
        let mut tagged = post(1, "Web", &["TypeScript"]);
        tagged.title = "Unrelated".into();
        let posts = vec![tagged, post(2, "Web", &[])];

        let by_tag = PostQuery {
            search: Some("typescript".into()),
            category: None,
        };
        assert_eq!(ids(&filter_posts(&posts, &by_tag)), vec![1]);

        let by_excerpt = PostQuery {
            search: Some("EXCERPT FOR POST 2".into()),
            category: None,
        };
        assert_eq!(ids(&filter_posts(&posts, &by_excerpt)), vec![2]);
    }

    #[test]
    fn all_category_matches_everything() {
        let posts = vec![post(1, "CSS", &[]), post(2, "React", &[])];
        let all = PostQuery {
            search: Some("  ".into()),
            category: Some(ALL_CATEGORIES.into()),
        };
        let css = PostQuery {
            search: None,
            category: Some("CSS".into()),
        };

        assert_eq!(ids(&filter_posts(&posts, &all)), vec![1, 2]);
        assert_eq!(ids(&filter_posts(&posts, &css)), vec![1]);
    }

    #[test]
    fn partition_keeps_order_within_each_half() {
        let mut posts: Vec<BlogPost> = (1..=4).map(|id| post(id, "Web", &[])).collect();
        posts[0].featured = true;
        posts[2].featured = true;

        let (featured, regular) = partition_featured(posts.iter().collect());
        assert_eq!(ids(&featured), vec![1, 3]);
        assert_eq!(ids(&regular), vec![2, 4]);
    }

    #[test]
    fn categories_start_with_all_and_dedupe() {
        let posts = vec![
            post(1, "Web", &[]),
            post(2, "CSS", &[]),
            post(3, "Web", &[]),
        ];
        assert_eq!(categories(&posts), vec!["All", "Web", "CSS"]);
    }

    #[test]
    fn excerpt_preview_counts_characters_not_bytes() {
        assert_eq!(excerpt_preview("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn human_date_matches_blog_format() {
        assert_eq!(format_human_date(date!(2024 - 01 - 05)), "January 5, 2024");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::from_posts(vec![post(7, "Web", &[]), post(7, "CSS", &[])])
            .expect_err("duplicate");
        assert!(matches!(err, CatalogError::DuplicateId { id: 7 }));
    }

    #[test]
    fn bundled_catalog_parses() {
        let catalog = Catalog::bundled().expect("bundled catalog");
        assert_eq!(catalog.len(), 6);

        let first = catalog.get(1).expect("post 1");
        assert_eq!(first.human_date(), "January 15, 2024");
        assert!(first.content.sections.iter().all(Result::is_ok));
        assert_eq!(ids(&catalog.related(first, RELATED_POSTS_LIMIT)), vec![4, 6]);
        assert!(matches!(
            catalog.get(99),
            Err(DomainError::NotFound { entity: "post", .. })
        ));
    }

    #[test]
    fn malformed_sections_are_kept_as_errors() {
        let json = r#"[{
            "id": 1, "title": "t", "excerpt": "e", "author": "a",
            "date": "2024-02-01", "readTime": "1 min read", "category": "Web",
            "content": {"sections": [{"type": "paragraph", "content": "ok"}, {"type": "header", "level": 9, "content": "x"}]}
        }]"#;
        let catalog = Catalog::from_json(json).expect("catalog");
        let sections = &catalog.posts()[0].content.sections;

        assert!(sections[0].is_ok());
        assert_eq!(sections[1].as_ref().map_err(|err| err.index), Err(1));
    }

    #[test]
    fn non_array_sections_fail_the_catalog() {
        let json = r#"[{
            "id": 1, "title": "t", "excerpt": "e", "author": "a",
            "date": "2024-02-01", "readTime": "1 min read", "category": "Web",
            "content": {"sections": "nope"}
        }]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::Parse(_))
        ));
    }
}
