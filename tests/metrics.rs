use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use folio::application::blog::BlogService;
use folio::application::clipboard::{ClipboardPayload, MemoryClipboard, spawn_copy};
use folio::application::render::{RenderService, render_service};
use folio::domain::posts::Catalog;
use folio::domain::sections::decode_sections;
use folio::infra::http::{HttpState, build_router};
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn pipeline_emits_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let sections = json!([
        {"type": "paragraph", "content": "ok"},
        {"type": "header", "level": 9, "content": "broken"},
        {"type": "carousel"}
    ]);
    let slots = decode_sections(&sections).expect("array of sections");
    let document = render_service().render_slots(&slots);
    assert_eq!(document.placeholder_count(), 1);

    let clipboard = Arc::new(MemoryClipboard::new());
    let outcome = spawn_copy(clipboard.clone(), ClipboardPayload::new("cargo test"))
        .outcome()
        .await;
    assert!(outcome.is_copied());
    assert_eq!(clipboard.last().as_deref(), Some("cargo test"));

    let catalog = Arc::new(Catalog::bundled().expect("bundled catalog"));
    let blog = Arc::new(BlogService::new(catalog, render_service(), 3));
    let response = build_router(HttpState::new(blog))
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let counters: HashMap<String, u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => Some((composite_key.key().name().to_string(), count)),
            _ => None,
        })
        .fold(HashMap::new(), |mut acc, (name, count)| {
            *acc.entry(name).or_default() += count;
            acc
        });

    for metric in [
        "folio_render_blocks_total",
        "folio_render_placeholders_total",
        "folio_render_skipped_total",
        "folio_clipboard_copy_total",
        "folio_http_responses_total",
    ] {
        assert!(counters.contains_key(metric), "missing metric: {metric}");
    }
    assert_eq!(counters["folio_render_placeholders_total"], 1);
    assert_eq!(counters["folio_render_skipped_total"], 1);
    assert_eq!(counters["folio_clipboard_copy_total"], 1);
}
