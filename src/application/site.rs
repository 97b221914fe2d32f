//! Static export of the blog: one HTML file per post plus the listing page.

use std::{fs, path::Path};

use askama::Template;
use tracing::info;

use crate::{
    application::{blog::BlogService, error::AppError},
    domain::posts::PostQuery,
    infra::{assets::CODE_THEME_CSS, error::InfraError},
    presentation::views::{BlogTemplate, PostTemplate, SiteLinks},
};

const INDEX_FILE: &str = "index.html";
const STYLESHEET_FILE: &str = "code.css";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub posts: usize,
    pub placeholders: usize,
}

/// Write the whole blog into `dir`, creating it when missing. Existing files are overwritten.
pub fn export_site(blog: &BlogService, dir: &Path) -> Result<ExportSummary, AppError> {
    fs::create_dir_all(dir).map_err(io_error)?;

    let listing = blog.listing(&PostQuery::default());
    let index = BlogTemplate::new(SiteLinks::Exported, &listing)
        .render()
        .map_err(template_error)?;
    fs::write(dir.join(INDEX_FILE), index).map_err(io_error)?;
    fs::write(dir.join(STYLESHEET_FILE), CODE_THEME_CSS).map_err(io_error)?;

    let mut summary = ExportSummary {
        posts: 0,
        placeholders: 0,
    };
    for post in blog.catalog().posts() {
        let detail = blog.post_detail(post.id)?;
        let page = PostTemplate::new(SiteLinks::Exported, &detail)
            .render()
            .map_err(template_error)?;
        fs::write(dir.join(SiteLinks::Exported.post(post.id)), page).map_err(io_error)?;

        summary.posts += 1;
        summary.placeholders += detail.document.placeholder_count();
    }

    info!(
        target = "folio::export",
        dir = %dir.display(),
        posts = summary.posts,
        placeholders = summary.placeholders,
        "site exported"
    );
    Ok(summary)
}

fn io_error(err: std::io::Error) -> AppError {
    AppError::from(InfraError::Io(err))
}

fn template_error(err: askama::Error) -> AppError {
    AppError::unexpected(format!("failed to render page: {err}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::render::render_service;
    use crate::domain::posts::Catalog;

    #[test]
    fn writes_index_stylesheet_and_every_post() {
        let catalog = Arc::new(Catalog::bundled().expect("bundled catalog"));
        let blog = BlogService::new(catalog, render_service(), 3);
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("site");

        let summary = export_site(&blog, &target).expect("export succeeds");

        assert_eq!(summary.posts, 6);
        assert!(target.join("index.html").is_file());
        assert!(target.join("code.css").is_file());
        for id in 1..=6 {
            assert!(target.join(format!("{id}.html")).is_file());
        }

        let index = fs::read_to_string(target.join("index.html")).expect("read index");
        assert!(index.contains("href=\"1.html\""));
        assert!(!index.contains("<form"));
    }
}
