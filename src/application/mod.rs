//! Application services: rendering, blog use cases, static export and the clipboard channel.

pub mod blog;
pub mod clipboard;
pub mod error;
pub mod render;
pub mod site;
