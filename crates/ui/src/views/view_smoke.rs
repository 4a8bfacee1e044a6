use super::test_harness::{ViewKind, setup_view_harness};

async fn render_settled(view: ViewKind) -> String {
    let mut harness = setup_view_harness(view);
    harness.rebuild();
    for _ in 0..4 {
        harness.drive_async().await;
    }
    harness.render()
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_lists_starter_gestures() {
    let html = render_settled(ViewKind::Home).await;
    for name in ["Hello", "Thank You", "Please", "Love"] {
        assert!(html.contains(name), "missing {name} in {html}");
    }
    assert!(html.contains("25 pts"), "missing points in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn practice_view_starts_with_camera_off() {
    let html = render_settled(ViewKind::Practice("hello".into())).await;
    assert!(html.contains("Learning: Hello"), "missing title in {html}");
    assert!(html.contains("Camera not active"), "missing camera state in {html}");
    assert!(html.contains("Start Camera"), "missing camera button in {html}");
    assert!(html.contains("Raise your dominant hand to shoulder height"));
    assert!(!html.contains("Detection Progress"));
}

#[tokio::test(flavor = "current_thread")]
async fn practice_view_reports_unknown_gesture() {
    let html = render_settled(ViewKind::Practice("wave".into())).await;
    assert!(html.contains("not in the catalog"), "missing not-found message in {html}");
}
