use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::clipboard::METRIC_CLIPBOARD_COPY_TOTAL;
use crate::application::render::{
    METRIC_RENDER_BLOCKS_TOTAL, METRIC_RENDER_PLACEHOLDERS_TOTAL, METRIC_RENDER_SKIPPED_TOTAL,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;
use super::http::{METRIC_HTTP_REQUEST_MS, METRIC_HTTP_RESPONSES_TOTAL};

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    // Diagnostics go to stderr so `render` output on stdout stays clean.
    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_RENDER_BLOCKS_TOTAL,
            Unit::Count,
            "Total number of content blocks rendered."
        );
        describe_counter!(
            METRIC_RENDER_PLACEHOLDERS_TOTAL,
            Unit::Count,
            "Total number of malformed sections replaced by a placeholder."
        );
        describe_counter!(
            METRIC_RENDER_SKIPPED_TOTAL,
            Unit::Count,
            "Total number of sections skipped because they were empty or of an unknown kind."
        );
        describe_counter!(
            METRIC_CLIPBOARD_COPY_TOTAL,
            Unit::Count,
            "Total number of clipboard copy attempts, labelled by outcome."
        );
        describe_counter!(
            METRIC_HTTP_RESPONSES_TOTAL,
            Unit::Count,
            "Total number of HTTP responses, labelled by status class."
        );
        describe_histogram!(
            METRIC_HTTP_REQUEST_MS,
            Unit::Milliseconds,
            "HTTP request latency in milliseconds."
        );
    });
}
