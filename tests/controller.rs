use chrono::{TimeZone, Utc};
use serde_json::json;

use comment_stream::channel::RecordingChannel;
use comment_stream::config::{DisplayConfig, Timezone};
use comment_stream::event::Inbound;
use comment_stream::format::{DisplayIndex, PlainFormatter};
use comment_stream::replies::ReplyState;
use comment_stream::view::{RecordingView, ViewOp};
use comment_stream::youtube::CommentRecord;
use comment_stream::SessionController;

type Controller = SessionController<RecordingView, RecordingChannel>;

fn controller() -> Controller {
    SessionController::new(
        DisplayConfig {
            timezone: Timezone::Utc,
            show_images: false,
            wrap_width: 80,
        },
        Box::new(PlainFormatter),
        RecordingView::default(),
        RecordingChannel::default(),
    )
}

fn raw(id: &str, secs: i64) -> serde_json::Value {
    let ts = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
    json!({"id": id, "publishedAt": ts.to_rfc3339(), "textDisplay": format!("text {id}")})
}

fn record(id: &str, secs: i64) -> CommentRecord {
    CommentRecord::from_value(raw(id, secs)).unwrap()
}

fn select_video(c: &mut Controller, comment_count: &str) {
    c.handle(
        serde_json::from_value(json!({
            "type": "videoSelected",
            "id": "vid",
            "snippet": {"title": "t", "publishedAt": "2023-01-01T00:00:00Z", "channelId": "UC1"},
            "statistics": {"commentCount": comment_count}
        }))
        .unwrap(),
    );
}

fn batch(c: &mut Controller, reset: bool, ids: &[&str]) {
    c.handle(Inbound::TopLevelBatch {
        reset,
        items: ids
            .iter()
            .enumerate()
            .map(|(i, id)| raw(id, i as i64))
            .collect(),
    });
}

fn toggle(c: &mut Controller, parent_id: &str) {
    c.handle(Inbound::ToggleReplies {
        parent_id: parent_id.into(),
    });
}

fn deliver(c: &mut Controller, parent_id: &str, replies: Vec<serde_json::Value>) {
    c.handle(Inbound::RepliesFetched {
        parent_id: parent_id.into(),
        replies,
    });
}

#[test]
fn two_batches_of_a_large_video_report_forty_percent() {
    let mut c = controller();
    select_video(&mut c, "1250");
    assert_eq!(c.video().unwrap().expected_total, 1000);

    let first: Vec<String> = (0..150).map(|i| format!("a{i}")).collect();
    let second: Vec<String> = (0..250).map(|i| format!("b{i}")).collect();
    batch(&mut c, true, &first.iter().map(String::as_str).collect::<Vec<_>>());
    batch(&mut c, false, &second.iter().map(String::as_str).collect::<Vec<_>>());

    assert_eq!(c.view().last_progress().unwrap().percentage, "40%");
    let listed = c.view().listed();
    assert_eq!(listed.len(), 400);
    assert_eq!(listed[399].index, DisplayIndex::Numbered(400));
}

#[test]
fn double_toggle_from_expanded_does_not_refetch() {
    let mut c = controller();
    batch(&mut c, true, &["p"]);
    toggle(&mut c, "p");
    deliver(&mut c, "p", vec![raw("r1", 1), raw("r2", 2)]);
    let before = c.view().last_panel("p").unwrap().to_vec();

    toggle(&mut c, "p");
    toggle(&mut c, "p");

    assert_eq!(c.reply_state("p"), ReplyState::Expanded);
    assert_eq!(c.remote().count_for("p"), 1);
    assert_eq!(c.view().last_panel("p").unwrap(), before.as_slice());
    assert_eq!(c.view().panel_visible("p"), Some(true));
}

#[test]
fn reset_sends_cached_parents_back_to_not_fetched() {
    let mut c = controller();
    batch(&mut c, true, &["p"]);
    toggle(&mut c, "p");
    deliver(&mut c, "p", vec![raw("r1", 1)]);
    assert_eq!(c.reply_state("p"), ReplyState::Expanded);

    batch(&mut c, true, &["p"]);
    assert_eq!(c.reply_state("p"), ReplyState::NotFetched);

    toggle(&mut c, "p");
    assert_eq!(c.remote().count_for("p"), 2);
    assert_eq!(c.reply_state("p"), ReplyState::Loading);
}

#[test]
fn late_delivery_from_previous_pass_is_ignored() {
    let mut c = controller();
    batch(&mut c, true, &["p"]);
    toggle(&mut c, "p");
    batch(&mut c, true, &["p"]);
    deliver(&mut c, "p", vec![raw("old", 1)]);

    assert_eq!(c.reply_state("p"), ReplyState::NotFetched);
    assert!(c.view().last_panel("p").is_none());
}

#[test]
fn distinct_parents_complete_independently() {
    let mut c = controller();
    batch(&mut c, true, &["p1", "p2"]);
    toggle(&mut c, "p1");
    toggle(&mut c, "p2");
    deliver(&mut c, "p2", vec![raw("b", 1)]);
    assert_eq!(c.reply_state("p1"), ReplyState::Loading);
    assert_eq!(c.reply_state("p2"), ReplyState::Expanded);
    deliver(&mut c, "p1", vec![raw("a", 1)]);
    assert_eq!(c.reply_state("p1"), ReplyState::Expanded);
}

#[test]
fn only_the_first_reply_pair_is_checked() {
    let mut c = controller();
    toggle(&mut c, "p");
    deliver(&mut c, "p", vec![raw("A", 3), raw("B", 5), raw("C", 1)]);
    let ids: Vec<_> = c
        .view()
        .last_panel("p")
        .unwrap()
        .iter()
        .map(|f| f.comment_id.clone())
        .collect();
    assert_eq!(ids, ["A", "B", "C"]);
}

#[test]
fn deep_link_forces_cached_collapsed_panel_open() {
    let mut c = controller();
    batch(&mut c, true, &["P1"]);
    toggle(&mut c, "P1");
    deliver(&mut c, "P1", vec![raw("R1", 1), raw("R2", 2)]);
    toggle(&mut c, "P1");
    assert_eq!(c.reply_state("P1"), ReplyState::Collapsed);

    c.resolve_deep_link(&record("P1", 0), Some(&record("R2", 2)));

    assert_eq!(c.reply_state("P1"), ReplyState::Expanded);
    assert_eq!(c.view().panel_visible("P1"), Some(true));
    assert_eq!(c.remote().count_for("P1"), 1);
    let panel = c.view().last_panel("P1").unwrap();
    let highlighted: Vec<_> = panel
        .iter()
        .filter(|f| f.highlighted)
        .map(|f| f.comment_id.as_str())
        .collect();
    assert_eq!(highlighted, ["R2"]);
    assert!(matches!(
        c.view().ops.iter().rev().find(|op| matches!(op, ViewOp::Linked(_))),
        Some(ViewOp::Linked(fragment))
            if fragment.index == DisplayIndex::Unnumbered && !fragment.highlighted
    ));
}

#[test]
fn first_toggle_after_uncached_deep_link_fetches_instead_of_collapsing() {
    let mut c = controller();
    c.handle(Inbound::DeepLink {
        parent: raw("P1", 0),
        reply: Some(raw("R2", 2)),
    });
    assert_eq!(c.view().panel_visible("P1"), Some(true));
    let pinned = c.view().last_panel("P1").unwrap();
    assert_eq!(pinned.len(), 1);
    assert!(pinned[0].highlighted);
    assert_eq!(pinned[0].index, DisplayIndex::Unnumbered);

    toggle(&mut c, "P1");
    assert_eq!(c.reply_state("P1"), ReplyState::Loading);
    assert_eq!(c.view().panel_visible("P1"), Some(true));

    deliver(&mut c, "P1", vec![raw("R1", 1), raw("R2", 2)]);
    let panel = c.view().last_panel("P1").unwrap();
    assert_eq!(panel.len(), 2);
    assert!(panel[1].highlighted);
    assert_eq!(panel[1].index, DisplayIndex::Numbered(2));
    assert_eq!(c.reply_state("P1"), ReplyState::Expanded);
}

#[test]
fn zero_comment_video_never_reports_progress() {
    let mut c = controller();
    select_video(&mut c, "0");
    batch(&mut c, true, &["a", "b"]);
    assert!(c.view().last_progress().is_none());
}

#[test]
fn load_pass_start_clears_deep_link() {
    let mut c = controller();
    c.resolve_deep_link(&record("P1", 0), None);
    assert!(c.deep_link().is_target("P1"));
    c.handle(Inbound::LoadPassStarting);
    assert!(c.deep_link().active().is_none());
    assert!(c
        .view()
        .ops
        .contains(&ViewOp::LoadStatus("Initializing...".into())));
}

#[test]
fn raw_analyses_are_reduced_before_charting() {
    let mut c = controller();
    c.handle(
        serde_json::from_value(json!({
            "type": "statsComputed",
            "analyses": [
                {"label": "POSITIVE", "score": 0.75},
                {"label": "negative", "score": 0.5},
                {"label": "positive", "score": 0.25},
                {"label": "mixed", "score": 0.5}
            ]
        }))
        .unwrap(),
    );
    let Some(ViewOp::Chart(scores)) = c.view().ops.last() else {
        panic!("expected a chart, got {:?}", c.view().ops);
    };
    assert_eq!(scores.positive, 0.5);
    assert_eq!(scores.negative, 0.25);
    assert!(scores.neutral.is_nan());
}
