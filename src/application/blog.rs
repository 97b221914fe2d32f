//! Read-side use cases for the blog: listings, post pages and code lookups.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::application::error::AppError;
use crate::application::render::{RenderService, RenderedCode, RenderedDocument};
use crate::domain::error::DomainError;
use crate::domain::posts::{
    ALL_CATEGORIES, BlogPost, Catalog, PostId, PostQuery, RELATED_EXCERPT_CHARS,
    excerpt_preview, partition_featured,
};

/// Card data for listings and related-post strips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub featured: bool,
}

impl From<&BlogPost> for PostSummary {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            date: post.human_date(),
            read_time: post.read_time.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            image: post.image.clone(),
            featured: post.featured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedPost {
    pub id: PostId,
    pub title: String,
    pub category: String,
    pub preview: String,
}

impl From<&BlogPost> for RelatedPost {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            category: post.category.clone(),
            preview: excerpt_preview(&post.excerpt, RELATED_EXCERPT_CHARS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostSummary,
    pub document: RenderedDocument,
    pub html: String,
    pub related: Vec<RelatedPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub search: String,
    pub active_category: String,
    pub categories: Vec<String>,
    pub featured: Vec<PostSummary>,
    pub regular: Vec<PostSummary>,
}

impl Listing {
    pub fn total(&self) -> usize {
        self.featured.len() + self.regular.len()
    }
}

pub struct BlogService {
    catalog: Arc<Catalog>,
    renderer: Arc<dyn RenderService>,
    related_limit: usize,
}

impl BlogService {
    pub fn new(
        catalog: Arc<Catalog>,
        renderer: Arc<dyn RenderService>,
        related_limit: usize,
    ) -> Self {
        Self {
            catalog,
            renderer,
            related_limit,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn renderer(&self) -> &dyn RenderService {
        self.renderer.as_ref()
    }

    pub fn render_post(&self, id: PostId) -> Result<RenderedDocument, AppError> {
        let post = self.catalog.get(id)?;
        Ok(self.renderer.render_slots(&post.content.sections))
    }

    pub fn post_detail(&self, id: PostId) -> Result<PostDetail, AppError> {
        let post = self.catalog.get(id)?;
        let document = self.renderer.render_slots(&post.content.sections);
        let html = self.renderer.to_html(&document);
        let related = self.related_for(post);

        debug!(
            target = "folio::application::blog",
            post_id = id,
            blocks = document.len(),
            related = related.len(),
            "built post detail"
        );

        Ok(PostDetail {
            post: PostSummary::from(post),
            document,
            html,
            related,
        })
    }

    pub fn related(&self, id: PostId) -> Result<Vec<RelatedPost>, AppError> {
        let post = self.catalog.get(id)?;
        Ok(self.related_for(post))
    }

    fn related_for(&self, post: &BlogPost) -> Vec<RelatedPost> {
        self.catalog
            .related(post, self.related_limit)
            .into_iter()
            .map(RelatedPost::from)
            .collect()
    }

    pub fn listing(&self, query: &PostQuery) -> Listing {
        let (featured, regular) = partition_featured(self.catalog.filter(query));

        Listing {
            search: query.search.clone().unwrap_or_default(),
            active_category: query
                .category
                .clone()
                .filter(|category| !category.trim().is_empty())
                .unwrap_or_else(|| ALL_CATEGORIES.to_string()),
            categories: self.catalog.categories(),
            featured: featured.into_iter().map(PostSummary::from).collect(),
            regular: regular.into_iter().map(PostSummary::from).collect(),
        }
    }

    /// The `ordinal`-th (1-based) code block of a post.
    pub fn code_block(&self, id: PostId, ordinal: usize) -> Result<RenderedCode, AppError> {
        let document = self.render_post(id)?;
        ordinal
            .checked_sub(1)
            .and_then(|index| document.code_blocks().nth(index).cloned())
            .ok_or_else(|| {
                AppError::from(DomainError::not_found(
                    "code block",
                    format!("{id}#{ordinal}"),
                ))
            })
    }
}
