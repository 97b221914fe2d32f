//! Embedded static assets.

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};

/// Syntax-highlighting theme generated by the build script for the `syntax-` class prefix.
pub const CODE_THEME_CSS: &str = include_str!(env!("CODE_THEME_CSS_FILE"));

const CSS_CONTENT_TYPE: &str = "text/css; charset=utf-8";
const ASSET_CACHE_CONTROL: &str = "public, max-age=3600";

/// Serve the embedded code theme stylesheet.
pub async fn serve_code_css() -> Response {
    let mut response = CODE_THEME_CSS.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(CSS_CONTENT_TYPE),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(ASSET_CACHE_CONTROL),
    );
    response
}
