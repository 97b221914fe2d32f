use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::{
    application::blog::BlogService,
    domain::posts::{PostId, PostQuery},
    infra::assets::serve_code_css,
    presentation::views::{
        BlogTemplate, PostTemplate, SiteLinks, render_not_found_response,
        render_template_response,
    },
};

use super::middleware::{log_responses, set_request_context};

const COPY_TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Clone)]
pub struct HttpState {
    pub blog: Arc<BlogService>,
}

impl HttpState {
    pub fn new(blog: Arc<BlogService>) -> Self {
        Self { blog }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/blog", get(blog_index))
        .route("/blog/{id}", get(post_detail))
        .route("/blog/{id}/document.json", get(post_document))
        .route("/blog/{id}/code/{block}", get(code_block_text))
        .route("/static/code.css", get(serve_code_css))
        .route("/healthz", get(health))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlogQuery {
    q: Option<String>,
    category: Option<String>,
}

impl From<BlogQuery> for PostQuery {
    fn from(query: BlogQuery) -> Self {
        PostQuery {
            search: query.q,
            category: query.category,
        }
    }
}

async fn root() -> Redirect {
    Redirect::to(SiteLinks::Served.index())
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn blog_index(State(state): State<HttpState>, Query(query): Query<BlogQuery>) -> Response {
    let listing = state.blog.listing(&PostQuery::from(query));
    render_template_response(BlogTemplate::new(SiteLinks::Served, &listing), StatusCode::OK)
}

async fn post_detail(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_post_id(&id) else {
        return render_not_found_response(SiteLinks::Served);
    };

    match state.blog.post_detail(id) {
        Ok(detail) => render_template_response(
            PostTemplate::new(SiteLinks::Served, &detail),
            StatusCode::OK,
        ),
        Err(err) if err.is_not_found() => render_not_found_response(SiteLinks::Served),
        Err(err) => err.into_response(),
    }
}

async fn post_document(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_post_id(&id) else {
        return render_not_found_response(SiteLinks::Served);
    };

    match state.blog.render_post(id) {
        Ok(document) => Json(document).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Exact copy text of one code block, for clients that cannot read `data-copy-text`.
async fn code_block_text(
    State(state): State<HttpState>,
    Path((id, block)): Path<(String, String)>,
) -> Response {
    let (Some(id), Ok(block)) = (parse_post_id(&id), block.parse::<usize>()) else {
        return render_not_found_response(SiteLinks::Served);
    };

    match state.blog.code_block(id, block) {
        Ok(code) => {
            let mut response = code.copy.into_inner().into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(COPY_TEXT_CONTENT_TYPE),
            );
            response
        }
        Err(err) => err.into_response(),
    }
}

async fn fallback_router() -> Response {
    render_not_found_response(SiteLinks::Served)
}

fn parse_post_id(raw: &str) -> Option<PostId> {
    raw.parse().ok()
}
