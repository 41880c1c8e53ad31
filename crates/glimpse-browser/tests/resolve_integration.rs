//! End-to-end resolution through `resolve_page_info` with mock drivers

use std::sync::Arc;
use std::time::Duration;

use glimpse_browser::mock::{MockFailure, MockLiveDriver, MockSnapshotDriver};
use glimpse_browser::{
    resolve_page_info, BackendAdapter, GlimpseError, LiveAdapter, Rect, ResolveRequest, ScrollPos,
    SnapshotAdapter,
};
use glimpse_core::BoundingBox;
use serde_json::json;

fn bbox(left: f64, top: f64, right: f64, bottom: f64) -> BoundingBox {
    BoundingBox {
        width: right - left,
        height: bottom - top,
        top,
        right,
        bottom,
        left,
    }
}

fn live_driver() -> MockLiveDriver {
    MockLiveDriver::new()
        .with_page_metadata(json!({
            "title": "Dashboard",
            "scrollPos": {"x": 0, "y": 300},
            "screenWidth": 1440,
            "screenHeight": 900
        }))
        .with_elements("#chart", vec![bbox(100.0, 200.0, 700.0, 600.0)])
        .with_elements(
            ".ad",
            vec![bbox(0.0, 0.0, 300.0, 250.0), bbox(0.0, 900.0, 300.0, 1150.0)],
        )
        .with_elements(".timestamp", vec![bbox(1200.0, 10.0, 1400.0, 30.0)])
}

fn live(driver: &MockLiveDriver) -> BackendAdapter {
    BackendAdapter::Live(LiveAdapter::new(Arc::new(driver.clone())))
}

const DUMP: &str = r#"<hierarchy rotation="0">
  <node class="android.widget.FrameLayout" bounds="[0,0][1080,1920]">
    <node resource-id="app:id/header" bounds="[10,20][110,220]"/>
    <node resource-id="app:id/clock" x="5" y="6" width="40" height="50"/>
    <node resource-id="app:id/ad" bounds="[0,1700][1080,1920]"/>
    <node resource-id="app:id/ad" bounds="[0,1500][1080,1600]"/>
  </node>
</hierarchy>"#;

fn snapshot(driver: &MockSnapshotDriver) -> BackendAdapter {
    BackendAdapter::Snapshot(SnapshotAdapter::new(Arc::new(driver.clone())))
}

#[tokio::test]
async fn test_single_literal_rect_issues_no_queries() {
    let driver = live_driver();
    let request = ResolveRequest::new().exclude(json!({"x0": 1, "y0": 2, "x1": 3, "y1": 4}));

    let info = resolve_page_info(&live(&driver), &request).await.unwrap();

    assert_eq!(info.exclude_rect, vec![Rect::new(1.0, 2.0, 3.0, 4.0)]);
    assert_eq!(driver.query_calls(), 0);
}

#[tokio::test]
async fn test_single_literal_rect_snapshot_fetches_nothing() {
    let driver = MockSnapshotDriver::new(DUMP);
    let request = ResolveRequest::new().exclude(json!({"x0": 1, "y0": 2, "x1": 3, "y1": 4}));

    let info = resolve_page_info(&snapshot(&driver), &request).await.unwrap();

    assert_eq!(info.exclude_rect, vec![Rect::new(1.0, 2.0, 3.0, 4.0)]);
    assert_eq!(driver.fetches(), 0);
}

#[tokio::test]
async fn test_live_literal_rects_precede_query_rects() {
    let driver = live_driver();
    let request = ResolveRequest::new().target("#chart").exclude(json!([
        ".timestamp",
        {"x0": 0, "y0": 0, "x1": 10, "y1": 10},
        ".ad",
        {"x0": 20, "y0": 20, "x1": 30, "y1": 30}
    ]));

    let info = resolve_page_info(&live(&driver), &request).await.unwrap();

    assert_eq!(info.title, "Dashboard");
    assert_eq!(info.scroll_pos, ScrollPos { x: 0, y: 300 });
    assert_eq!(info.screen_width, 1440);
    assert_eq!(info.screen_height, 900);
    assert_eq!(info.elem_bounding, Some(Rect::new(100.0, 200.0, 700.0, 600.0)));
    assert_eq!(
        info.exclude_rect,
        vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(20.0, 20.0, 30.0, 30.0),
            Rect::new(1200.0, 10.0, 1400.0, 30.0),
            Rect::new(0.0, 0.0, 300.0, 250.0),
            Rect::new(0.0, 900.0, 300.0, 1150.0),
        ]
    );
}

#[tokio::test]
async fn test_live_zero_match_queries_tolerated() {
    let driver = live_driver().with_failure(".gone", MockFailure::NoSuchElement);
    let request = ResolveRequest::new().exclude(json!([".missing", ".gone", ".timestamp"]));

    let info = resolve_page_info(&live(&driver), &request).await.unwrap();

    assert_eq!(info.exclude_rect, vec![Rect::new(1200.0, 10.0, 1400.0, 30.0)]);
}

#[tokio::test]
async fn test_live_driver_failure_propagates() {
    let driver = live_driver().with_failure(".flaky", MockFailure::Driver("target closed".into()));
    let request = ResolveRequest::new().exclude(json!([".ad", ".flaky"]));

    let err = resolve_page_info(&live(&driver), &request).await.unwrap_err();

    assert!(matches!(err, GlimpseError::DriverFailure(msg) if msg == "target closed"));
}

#[tokio::test]
async fn test_live_without_target_has_no_elem_bounding() {
    let driver = live_driver();

    let info = resolve_page_info(&live(&driver), &ResolveRequest::new()).await.unwrap();

    assert!(info.elem_bounding.is_none());
    assert!(info.exclude_rect.is_empty());
    assert_eq!(driver.script_calls(), 1);
    assert_eq!(driver.query_calls(), 0);
}

#[tokio::test]
async fn test_live_bounds_derive_missing_dimensions() {
    let driver = MockLiveDriver::new().with_elements(
        "#box",
        vec![BoundingBox {
            top: 10.0,
            left: 5.0,
            right: 25.0,
            bottom: 30.0,
            width: 0.0,
            height: 0.0,
        }],
    );

    let info = resolve_page_info(&live(&driver), &ResolveRequest::new().target("#box"))
        .await
        .unwrap();

    assert_eq!(info.elem_bounding, Some(Rect::new(5.0, 10.0, 25.0, 30.0)));
}

#[tokio::test]
async fn test_snapshot_resolution() {
    let driver = MockSnapshotDriver::new(DUMP);
    let request = ResolveRequest::new()
        .target("//node[@resource-id='app:id/header']")
        .exclude(json!([
            "//node[@resource-id='app:id/ad']",
            {"x0": 0, "y0": 0, "x1": 1080, "y1": 63},
            "//node[@resource-id='app:id/clock']",
            "//node[@resource-id='app:id/none']"
        ]));

    let info = resolve_page_info(&snapshot(&driver), &request).await.unwrap();

    assert_eq!(info.title, "");
    assert_eq!(info.scroll_pos, ScrollPos::default());
    assert_eq!(info.screen_width, 0);
    assert_eq!(info.elem_bounding, Some(Rect::new(10.0, 20.0, 110.0, 220.0)));
    assert_eq!(
        info.exclude_rect,
        vec![
            Rect::new(0.0, 0.0, 1080.0, 63.0),
            Rect::new(0.0, 1700.0, 1080.0, 1920.0),
            Rect::new(0.0, 1500.0, 1080.0, 1600.0),
            Rect::new(5.0, 6.0, 45.0, 56.0),
        ]
    );
}

#[tokio::test]
async fn test_snapshot_missing_target_fails() {
    let driver = MockSnapshotDriver::new(DUMP);
    let request = ResolveRequest::new().target("//node[@resource-id='app:id/footer']");

    let err = resolve_page_info(&snapshot(&driver), &request).await.unwrap_err();

    assert!(matches!(err, GlimpseError::ElementNotFound(_)));
}

#[tokio::test]
async fn test_snapshot_malformed_target_bounds_fail() {
    let driver = MockSnapshotDriver::new(r#"<hierarchy><node text="x" bounds="[1,2][3]"/></hierarchy>"#);
    let request = ResolveRequest::new().target("//node[@text='x']");

    let err = resolve_page_info(&snapshot(&driver), &request).await.unwrap_err();

    assert!(matches!(err, GlimpseError::MalformedBounds(_)));
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let request = ResolveRequest::new()
        .target("#chart")
        .exclude(json!([".ad", {"x0": 0, "y0": 0, "x1": 5, "y1": 5}]));
    let driver = live_driver();
    let adapter = live(&driver);

    let first = resolve_page_info(&adapter, &request).await.unwrap();
    let second = resolve_page_info(&adapter, &request).await.unwrap();
    assert_eq!(first, second);

    let snapshot_request = ResolveRequest::new().exclude("//node[@resource-id='app:id/ad']");
    let adapter = snapshot(&MockSnapshotDriver::new(DUMP));
    let first = resolve_page_info(&adapter, &snapshot_request).await.unwrap();
    let second = resolve_page_info(&adapter, &snapshot_request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_live_query_order_survives_out_of_order_completion() {
    let driver = MockLiveDriver::new()
        .with_elements(".slow", vec![bbox(1.0, 0.0, 2.0, 1.0)])
        .with_elements(".fast", vec![bbox(2.0, 0.0, 3.0, 1.0)])
        .with_delay(".slow", Duration::from_millis(50))
        .with_delay(".fast", Duration::from_millis(1));
    let request = ResolveRequest::new().exclude(json!([".slow", ".fast"]));

    let info = resolve_page_info(&live(&driver), &request).await.unwrap();

    assert_eq!(
        info.exclude_rect,
        vec![Rect::new(1.0, 0.0, 2.0, 1.0), Rect::new(2.0, 0.0, 3.0, 1.0)]
    );
}

#[tokio::test]
async fn test_snapshot_query_order_survives_out_of_order_completion() {
    let driver = MockSnapshotDriver::new(DUMP)
        .with_fetch_delays(vec![Duration::from_millis(50), Duration::from_millis(1)]);
    let request = ResolveRequest::new().exclude(json!([
        "//node[@resource-id='app:id/clock']",
        "//node[@resource-id='app:id/header']"
    ]));

    let info = resolve_page_info(&snapshot(&driver), &request).await.unwrap();

    assert_eq!(
        info.exclude_rect,
        vec![Rect::new(5.0, 6.0, 45.0, 56.0), Rect::new(10.0, 20.0, 110.0, 220.0)]
    );
    assert_eq!(driver.fetches(), 2);
}
