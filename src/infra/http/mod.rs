mod middleware;
mod public;

pub use middleware::RequestContext;
pub use public::{HttpState, build_router};

pub const METRIC_HTTP_RESPONSES_TOTAL: &str = "folio_http_responses_total";
pub const METRIC_HTTP_REQUEST_MS: &str = "folio_http_request_ms";
