use std::io::{self, Write};

use crate::format::DisplayIndex;
use crate::progress::LoadProgress;
use crate::stats::{percent_label, SentimentScores};

/// A formatted comment ready to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub comment_id: String,
    pub index: DisplayIndex,
    pub highlighted: bool,
    pub body: String,
}

/// The rendering surface. It paints what it is told and holds no comment
/// state of its own.
pub trait View {
    fn show_video(&mut self, header: &str);
    fn show_load_status(&mut self, text: &str);
    fn set_progress(&mut self, progress: &LoadProgress);
    fn clear_comments(&mut self);
    fn append_comments(&mut self, fragments: &[Fragment]);
    fn show_linked(&mut self, fragment: &Fragment);
    fn hide_linked(&mut self);
    fn set_reply_panel(&mut self, parent_id: &str, fragments: &[Fragment]);
    fn set_panel_visibility(&mut self, parent_id: &str, visible: bool);
    fn set_affordance_label(&mut self, parent_id: &str, label: &str);
    fn set_affordance_enabled(&mut self, parent_id: &str, enabled: bool);
    fn render_chart(&mut self, scores: &SentimentScores);
}

/// Writes every view operation as plain text lines.
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    fn line(&mut self, text: &str) {
        // A closed stdout leaves nothing to paint on.
        let _ = self.write_line(text);
    }

    fn fragment(&mut self, fragment: &Fragment) {
        if fragment.highlighted {
            self.line(">>> linked");
        }
        self.line(&fragment.body);
    }
}

impl<W: Write> View for TerminalView<W> {
    fn show_video(&mut self, header: &str) {
        self.line("== video ==");
        self.line(header);
    }

    fn show_load_status(&mut self, text: &str) {
        self.line(&format!("[load] {text}"));
    }

    fn set_progress(&mut self, progress: &LoadProgress) {
        self.line(&format!(
            "[load] {} {}",
            progress.percentage, progress.count_text
        ));
    }

    fn clear_comments(&mut self) {
        self.line("== comments (cleared) ==");
    }

    fn append_comments(&mut self, fragments: &[Fragment]) {
        for fragment in fragments {
            self.fragment(fragment);
        }
    }

    fn show_linked(&mut self, fragment: &Fragment) {
        self.line("== linked comment ==");
        self.fragment(fragment);
    }

    fn hide_linked(&mut self) {}

    fn set_reply_panel(&mut self, parent_id: &str, fragments: &[Fragment]) {
        self.line(&format!("-- replies to {parent_id} --"));
        for fragment in fragments {
            self.fragment(fragment);
        }
    }

    fn set_panel_visibility(&mut self, parent_id: &str, visible: bool) {
        let state = if visible { "shown" } else { "hidden" };
        self.line(&format!("-- replies to {parent_id} {state} --"));
    }

    fn set_affordance_label(&mut self, parent_id: &str, label: &str) {
        self.line(&format!("[{parent_id}] {label}"));
    }

    fn set_affordance_enabled(&mut self, _parent_id: &str, _enabled: bool) {}

    fn render_chart(&mut self, scores: &SentimentScores) {
        self.line("== sentiment ==");
        for (label, value) in scores.labelled() {
            self.line(&format!("{label:<9}{}", percent_label(value)));
        }
    }
}

/// One recorded call on a [`RecordingView`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOp {
    ShowVideo(String),
    LoadStatus(String),
    Progress(LoadProgress),
    ClearComments,
    Append(Vec<Fragment>),
    Linked(Fragment),
    HideLinked,
    ReplyPanel(String, Vec<Fragment>),
    PanelVisible(String, bool),
    AffordanceLabel(String, String),
    AffordanceEnabled(String, bool),
    Chart(SentimentScores),
}

/// Captures view calls in order, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub ops: Vec<ViewOp>,
}

impl RecordingView {
    pub fn last_label(&self, parent_id: &str) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            ViewOp::AffordanceLabel(id, label) if id == parent_id => Some(label.as_str()),
            _ => None,
        })
    }

    pub fn panel_visible(&self, parent_id: &str) -> Option<bool> {
        self.ops.iter().rev().find_map(|op| match op {
            ViewOp::PanelVisible(id, visible) if id == parent_id => Some(*visible),
            _ => None,
        })
    }

    pub fn last_panel(&self, parent_id: &str) -> Option<&[Fragment]> {
        self.ops.iter().rev().find_map(|op| match op {
            ViewOp::ReplyPanel(id, fragments) if id == parent_id => Some(fragments.as_slice()),
            _ => None,
        })
    }

    pub fn last_progress(&self) -> Option<&LoadProgress> {
        self.ops.iter().rev().find_map(|op| match op {
            ViewOp::Progress(progress) => Some(progress),
            _ => None,
        })
    }

    /// Every fragment appended to the comment list since the last clear.
    pub fn listed(&self) -> Vec<&Fragment> {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, ViewOp::ClearComments))
            .map_or(0, |pos| pos + 1);
        self.ops[start..]
            .iter()
            .filter_map(|op| match op {
                ViewOp::Append(fragments) => Some(fragments.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

impl View for RecordingView {
    fn show_video(&mut self, header: &str) {
        self.ops.push(ViewOp::ShowVideo(header.to_string()));
    }

    fn show_load_status(&mut self, text: &str) {
        self.ops.push(ViewOp::LoadStatus(text.to_string()));
    }

    fn set_progress(&mut self, progress: &LoadProgress) {
        self.ops.push(ViewOp::Progress(progress.clone()));
    }

    fn clear_comments(&mut self) {
        self.ops.push(ViewOp::ClearComments);
    }

    fn append_comments(&mut self, fragments: &[Fragment]) {
        self.ops.push(ViewOp::Append(fragments.to_vec()));
    }

    fn show_linked(&mut self, fragment: &Fragment) {
        self.ops.push(ViewOp::Linked(fragment.clone()));
    }

    fn hide_linked(&mut self) {
        self.ops.push(ViewOp::HideLinked);
    }

    fn set_reply_panel(&mut self, parent_id: &str, fragments: &[Fragment]) {
        self.ops
            .push(ViewOp::ReplyPanel(parent_id.to_string(), fragments.to_vec()));
    }

    fn set_panel_visibility(&mut self, parent_id: &str, visible: bool) {
        self.ops
            .push(ViewOp::PanelVisible(parent_id.to_string(), visible));
    }

    fn set_affordance_label(&mut self, parent_id: &str, label: &str) {
        self.ops.push(ViewOp::AffordanceLabel(
            parent_id.to_string(),
            label.to_string(),
        ));
    }

    fn set_affordance_enabled(&mut self, parent_id: &str, enabled: bool) {
        self.ops
            .push(ViewOp::AffordanceEnabled(parent_id.to_string(), enabled));
    }

    fn render_chart(&mut self, scores: &SentimentScores) {
        self.ops.push(ViewOp::Chart(*scores));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(id: &str, highlighted: bool) -> Fragment {
        Fragment {
            comment_id: id.into(),
            index: DisplayIndex::Numbered(1),
            highlighted,
            body: format!("body of {id}"),
        }
    }

    #[test]
    fn terminal_view_marks_highlighted_fragments() {
        let mut view = TerminalView::new(Vec::new());
        view.set_reply_panel("p", &[fragment("r1", false), fragment("r2", true)]);
        view.set_affordance_label("p", "▲ Hide 2 replies");
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(
            out,
            "-- replies to p --\nbody of r1\n>>> linked\nbody of r2\n[p] ▲ Hide 2 replies\n"
        );
    }

    #[test]
    fn terminal_view_chart_uses_percent_labels() {
        let mut view = TerminalView::new(Vec::new());
        view.render_chart(&SentimentScores {
            positive: 0.5,
            neutral: f64::NAN,
            negative: 0.25,
        });
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert!(out.contains("Positive 50.0%"));
        assert!(out.contains("Neutral  --"));
        assert!(out.contains("Negative 25.0%"));
    }

    #[test]
    fn recording_view_lists_since_last_clear() {
        let mut view = RecordingView::default();
        view.append_comments(&[fragment("a", false)]);
        view.clear_comments();
        view.append_comments(&[fragment("b", false), fragment("c", false)]);
        let ids: Vec<_> = view.listed().iter().map(|f| f.comment_id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
    }
}
