use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::blog::{Listing, PostDetail, PostSummary, RelatedPost};
use crate::application::error::{ErrorReport, HttpError};
use crate::domain::posts::PostId;

const SITE_TITLE: &str = "Folio";
const SITE_DESCRIPTION: &str = "Notes on web development, programming and design.";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(links: SiteLinks) -> Response {
    let view = LayoutContext::new(
        links,
        PageMetaView::titled("Page Not Found"),
        ErrorPageView::not_found(links),
    );
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// How pages link to each other: through the preview server, or as files
/// sitting next to each other in an exported directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteLinks {
    Served,
    Exported,
}

impl SiteLinks {
    pub fn index(self) -> &'static str {
        match self {
            Self::Served => "/blog",
            Self::Exported => "index.html",
        }
    }

    pub fn post(self, id: PostId) -> String {
        match self {
            Self::Served => format!("/blog/{id}"),
            Self::Exported => format!("{id}.html"),
        }
    }

    pub fn stylesheet(self) -> &'static str {
        match self {
            Self::Served => "/static/code.css",
            Self::Exported => "code.css",
        }
    }

    /// Exported sites have no server to filter for them.
    pub fn supports_filters(self) -> bool {
        matches!(self, Self::Served)
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

impl PageMetaView {
    pub fn site() -> Self {
        Self {
            title: SITE_TITLE.to_string(),
            description: SITE_DESCRIPTION.to_string(),
        }
    }

    pub fn titled(title: &str) -> Self {
        Self {
            title: format!("{title} | {SITE_TITLE}"),
            description: SITE_DESCRIPTION.to_string(),
        }
    }

    pub fn with_description(self, description: String) -> Self {
        Self {
            description,
            ..self
        }
    }
}

pub struct LayoutContext<T> {
    pub site_title: &'static str,
    pub home_href: &'static str,
    pub stylesheet_href: &'static str,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(links: SiteLinks, meta: PageMetaView, content: T) -> Self {
        Self {
            site_title: SITE_TITLE,
            home_href: links.index(),
            stylesheet_href: links.stylesheet(),
            meta,
            content,
        }
    }
}

pub struct PostCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl PostCard {
    fn from_summary(links: SiteLinks, summary: &PostSummary) -> Self {
        Self {
            href: links.post(summary.id),
            title: summary.title.clone(),
            excerpt: summary.excerpt.clone(),
            author: summary.author.clone(),
            date: summary.date.clone(),
            read_time: summary.read_time.clone(),
            category: summary.category.clone(),
            tags: summary.tags.clone(),
        }
    }
}

pub struct CategoryChip {
    pub name: String,
    pub active: bool,
}

pub struct BlogIndexContext {
    pub action: &'static str,
    pub filters: bool,
    pub search: String,
    pub categories: Vec<CategoryChip>,
    pub featured: Vec<PostCard>,
    pub regular: Vec<PostCard>,
    pub total: usize,
}

impl BlogIndexContext {
    pub fn from_listing(links: SiteLinks, listing: &Listing) -> Self {
        let cards = |posts: &[PostSummary]| -> Vec<PostCard> {
            posts
                .iter()
                .map(|summary| PostCard::from_summary(links, summary))
                .collect()
        };

        Self {
            action: links.index(),
            filters: links.supports_filters(),
            search: listing.search.clone(),
            categories: listing
                .categories
                .iter()
                .map(|name| CategoryChip {
                    name: name.clone(),
                    active: *name == listing.active_category,
                })
                .collect(),
            featured: cards(&listing.featured),
            regular: cards(&listing.regular),
            total: listing.total(),
        }
    }
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub view: LayoutContext<BlogIndexContext>,
}

impl BlogTemplate {
    pub fn new(links: SiteLinks, listing: &Listing) -> Self {
        Self {
            view: LayoutContext::new(
                links,
                PageMetaView::site(),
                BlogIndexContext::from_listing(links, listing),
            ),
        }
    }
}

pub struct OutlineLink {
    pub anchor: String,
    pub text: String,
    pub depth: u8,
}

pub struct RelatedCard {
    pub href: String,
    pub title: String,
    pub category: String,
    pub preview: String,
}

impl RelatedCard {
    fn new(links: SiteLinks, related: &RelatedPost) -> Self {
        Self {
            href: links.post(related.id),
            title: related.title.clone(),
            category: related.category.clone(),
            preview: related.preview.clone(),
        }
    }
}

pub struct PostPageContext {
    pub title: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
    pub tags: Vec<String>,
    pub body_html: String,
    pub outline: Vec<OutlineLink>,
    pub related: Vec<RelatedCard>,
    pub has_code: bool,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostPageContext>,
}

impl PostTemplate {
    pub fn new(links: SiteLinks, detail: &PostDetail) -> Self {
        let post = &detail.post;
        let content = PostPageContext {
            title: post.title.clone(),
            author: post.author.clone(),
            date: post.date.clone(),
            read_time: post.read_time.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            body_html: detail.html.clone(),
            outline: detail
                .document
                .outline()
                .into_iter()
                .map(|entry| OutlineLink {
                    anchor: entry.anchor,
                    text: entry.text,
                    depth: entry.level.get(),
                })
                .collect(),
            related: detail
                .related
                .iter()
                .map(|related| RelatedCard::new(links, related))
                .collect(),
            has_code: detail.document.code_blocks().next().is_some(),
        };
        let meta = PageMetaView::titled(&post.title).with_description(post.excerpt.clone());

        Self {
            view: LayoutContext::new(links, meta, content),
        }
    }
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub action_href: &'static str,
    pub action_label: &'static str,
}

impl ErrorPageView {
    pub fn not_found(links: SiteLinks) -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The post you are looking for does not exist or has been moved.".to_string(),
            action_href: links.index(),
            action_label: "Back to blog",
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::blog::BlogService;
    use crate::application::render::render_service;
    use crate::domain::posts::{Catalog, PostQuery};

    fn service() -> BlogService {
        let catalog = Arc::new(Catalog::bundled().expect("bundled catalog"));
        BlogService::new(catalog, render_service(), 3)
    }

    #[test]
    fn exported_links_are_relative() {
        assert_eq!(SiteLinks::Exported.post(4), "4.html");
        assert_eq!(SiteLinks::Exported.stylesheet(), "code.css");
        assert_eq!(SiteLinks::Served.post(4), "/blog/4");
        assert!(!SiteLinks::Exported.supports_filters());
    }

    #[test]
    fn post_page_embeds_sanitized_body_and_related_cards() {
        let detail = service().post_detail(1).expect("post 1");
        let html = PostTemplate::new(SiteLinks::Served, &detail)
            .render()
            .expect("template renders");

        assert!(html.contains(&detail.html));
        assert!(html.contains("href=\"/blog/4\""));
        assert!(html.contains("data-role=\"code-copy-button\""));
        assert!(html.contains("/static/code.css"));
    }

    #[test]
    fn blog_index_marks_the_active_category() {
        let listing = service().listing(&PostQuery {
            search: None,
            category: Some("CSS".to_string()),
        });
        let context = BlogIndexContext::from_listing(SiteLinks::Served, &listing);

        let active: Vec<&str> = context
            .categories
            .iter()
            .filter(|chip| chip.active)
            .map(|chip| chip.name.as_str())
            .collect();
        assert_eq!(active, vec!["CSS"]);
        assert_eq!(context.total, 1);
    }

    #[test]
    fn not_found_page_carries_a_report() {
        let response = render_not_found_response(SiteLinks::Served);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }
}
