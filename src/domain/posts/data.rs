/// Catalog shipped with the binary; `content.catalog_path` replaces it at runtime.
pub(super) const BUNDLED_CATALOG: &str = include_str!("../../../content/posts.json");
