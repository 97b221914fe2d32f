//! Section rendering.
//!
//! The pipeline is pure: decoded sections go in, a [`RenderedDocument`] comes
//! out, and HTML is derived from that document on demand. Section-level
//! failures surface as placeholder blocks instead of errors.

mod service;
mod types;

pub use service::{
    ContentRenderService, METRIC_RENDER_BLOCKS_TOTAL, METRIC_RENDER_PLACEHOLDERS_TOTAL,
    METRIC_RENDER_SKIPPED_TOTAL, render_service,
};
pub use types::{
    CodeCaption, ListStyle, OutlineEntry, RenderError, RenderService, RenderedBlock,
    RenderedCode, RenderedDocument, SkipReason, SkippedSection, VisualWeight,
};
