//! Content model: sections, inline emphasis, posts and the catalog.

pub mod error;
pub mod inline;
pub mod posts;
pub mod sections;
pub mod slug;
