//! The session controller: reacts to inbound events and drives the view and
//! the remote channel.
//!
//! State is split by lifetime. [`LoadPass`] holds everything a re-sort
//! invalidates (numbered comments, fetched replies, expanded panels), while
//! configuration, the video context and the deep-link target belong to the
//! controller itself and survive a load-pass reset.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::channel::RemoteChannel;
use crate::config::DisplayConfig;
use crate::event::Inbound;
use crate::format::{CommentFormatter, DisplayIndex, FormatContext};
use crate::linked::DeepLinkResolver;
use crate::progress::{estimate_total, percentage};
use crate::replies::{ReplyCache, ReplyState, Toggle};
use crate::stats::SentimentScores;
use crate::thread::ThreadAccumulator;
use crate::view::{Fragment, View};
use crate::youtube::{parse_records, CommentRecord, RecordError, VideoMetadata};

pub const LOADING_LABEL: &str = "Loading...";
pub const INITIALIZING_LABEL: &str = "Initializing...";

pub fn hide_label(count: usize) -> String {
    format!("\u{25B2} Hide {count} replies")
}

pub fn show_label(count: usize) -> String {
    format!("\u{25BC} Show {count} replies")
}

/// Identity of the video whose comments are loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoContext {
    pub video_id: String,
    pub published_at: chrono::DateTime<chrono::Utc>,
    pub uploader_id: String,
    /// Denominator for load progress; see [`estimate_total`].
    pub expected_total: u64,
}

impl VideoContext {
    pub fn from_metadata(video: &VideoMetadata) -> Self {
        Self {
            video_id: video.id.clone(),
            published_at: video.snippet.published_at,
            uploader_id: video.snippet.channel_id.clone(),
            expected_total: estimate_total(video.statistics.comment_count),
        }
    }
}

/// State owned by a single load pass.
#[derive(Debug, Default)]
pub struct LoadPass {
    generation: u64,
    thread: ThreadAccumulator,
    replies: ReplyCache,
}

impl LoadPass {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn thread(&self) -> &ThreadAccumulator {
        &self.thread
    }

    pub fn replies(&self) -> &ReplyCache {
        &self.replies
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.thread.clear();
        self.replies.clear();
    }
}

pub struct SessionController<V: View, R: RemoteChannel> {
    display: DisplayConfig,
    formatter: Box<dyn CommentFormatter>,
    video: Option<VideoContext>,
    deep_link: DeepLinkResolver,
    pass: LoadPass,
    view: V,
    remote: R,
}

impl<V: View, R: RemoteChannel> SessionController<V, R> {
    pub fn new(
        display: DisplayConfig,
        formatter: Box<dyn CommentFormatter>,
        view: V,
        remote: R,
    ) -> Self {
        Self {
            display,
            formatter,
            video: None,
            deep_link: DeepLinkResolver::new(),
            pass: LoadPass::default(),
            view,
            remote,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn display_config(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn video(&self) -> Option<&VideoContext> {
        self.video.as_ref()
    }

    pub fn deep_link(&self) -> &DeepLinkResolver {
        &self.deep_link
    }

    pub fn load_pass(&self) -> &LoadPass {
        &self.pass
    }

    pub fn reply_state(&self, parent_id: &str) -> ReplyState {
        self.pass.replies.state(parent_id)
    }

    pub fn into_parts(self) -> (V, R) {
        (self.view, self.remote)
    }

    pub fn handle(&mut self, event: Inbound) {
        debug!(event = event.name(), "inbound event");
        match event {
            Inbound::TopLevelBatch { reset, items } => {
                let records = validated(items, "top-level comment");
                self.ingest_top_level(reset, records);
            }
            Inbound::RepliesFetched { parent_id, replies } => {
                let records = validated(replies, "reply");
                self.replies_fetched(&parent_id, records);
            }
            Inbound::StatsComputed(payload) => self.stats_computed(&payload.into_scores()),
            Inbound::VideoSelected(video) => self.display_video(&video),
            Inbound::LoadPassStarting => self.prepare_load_status(),
            Inbound::ToggleReplies { parent_id } => self.toggle_replies(&parent_id),
            Inbound::DeepLink { parent, reply } => {
                let parent = match CommentRecord::from_value(parent) {
                    Ok(parent) => parent,
                    Err(err) => {
                        warn!(error = %err, "dropping deep link with malformed parent");
                        return;
                    }
                };
                let reply = match reply.map(CommentRecord::from_value).transpose() {
                    Ok(reply) => reply,
                    Err(err) => {
                        warn!(error = %err, "dropping deep link with malformed reply");
                        return;
                    }
                };
                self.resolve_deep_link(&parent, reply.as_ref());
            }
            Inbound::ConfigurationChanged {
                timezone,
                show_images,
            } => {
                self.display.timezone = timezone;
                self.display.show_images = show_images;
                info!(?timezone, show_images, "display configuration changed");
            }
            Inbound::WindowResized { width, height } => {
                debug!(width, height, "window resized; nothing to relayout");
            }
        }
    }

    pub fn display_video(&mut self, video: &VideoMetadata) {
        let context = VideoContext::from_metadata(video);
        info!(
            video_id = %context.video_id,
            comment_count = video.statistics.comment_count,
            expected_total = context.expected_total,
            "displaying video"
        );
        self.video = Some(context);
        let header = self.formatter.format_title(video, &self.display);
        self.view.show_video(&header);
    }

    pub fn prepare_load_status(&mut self) {
        self.deep_link.clear();
        self.view.hide_linked();
        self.view.show_load_status(INITIALIZING_LABEL);
    }

    /// Invalidates every piece of per-load-pass state at once. Replies still
    /// in flight for the old pass are dropped when they arrive.
    pub fn reset_load_pass(&mut self) {
        let abandoned = self.pass.replies.in_flight();
        self.pass.reset();
        debug!(generation = self.pass.generation, abandoned, "load pass reset");
        self.view.clear_comments();
    }

    pub fn ingest_top_level(&mut self, reset: bool, items: Vec<CommentRecord>) {
        if reset {
            self.reset_load_pass();
        }

        let appended = self.pass.thread.ingest(items);
        let fragments: Vec<Fragment> = appended
            .iter()
            .map(|comment| {
                render(
                    self.formatter.as_ref(),
                    &self.display,
                    self.video.as_ref(),
                    &comment.record,
                    DisplayIndex::Numbered(comment.index),
                    false,
                    false,
                )
            })
            .collect();
        if !fragments.is_empty() {
            self.view.append_comments(&fragments);
        }
        self.update_load_status();
    }

    /// Pushes the current progress to the view. With no expected total the
    /// display is left alone.
    pub fn update_load_status(&mut self) {
        let total = self.video.as_ref().map_or(0, |video| video.expected_total);
        if let Some(progress) = percentage(self.pass.thread.count(), total) {
            self.view.set_progress(&progress);
        }
    }

    pub fn toggle_replies(&mut self, parent_id: &str) {
        match self.pass.replies.toggle(parent_id) {
            Toggle::Fetch => {
                self.view.set_affordance_enabled(parent_id, false);
                self.view.set_affordance_label(parent_id, LOADING_LABEL);
                debug!(
                    parent_id,
                    in_flight = self.pass.replies.in_flight(),
                    "requesting replies"
                );
                if let Err(err) = self.remote.request_replies(parent_id) {
                    warn!(parent_id, error = %err, "reply request failed");
                    self.pass.replies.abandon(parent_id);
                    self.view.set_affordance_label(parent_id, "\u{25BC} Show replies");
                    self.view.set_affordance_enabled(parent_id, true);
                }
            }
            Toggle::Pending => {
                debug!(parent_id, "replies already loading; ignoring toggle");
            }
            Toggle::Shown { count } => {
                self.view.set_panel_visibility(parent_id, true);
                self.view.set_affordance_label(parent_id, &hide_label(count));
            }
            Toggle::Hidden { count } => {
                self.view.set_panel_visibility(parent_id, false);
                self.view.set_affordance_label(parent_id, &show_label(count));
            }
        }
    }

    pub fn replies_fetched(&mut self, parent_id: &str, replies: Vec<CommentRecord>) {
        match self.pass.replies.store(parent_id, replies) {
            Ok(stored) => {
                debug!(parent_id, count = stored.len(), "replies stored");
            }
            Err(dropped) => {
                debug!(
                    parent_id,
                    count = dropped.len(),
                    generation = self.pass.generation,
                    "dropping replies not requested in this load pass"
                );
                return;
            }
        }
        self.populate_replies(parent_id);
    }

    fn populate_replies(&mut self, parent_id: &str) {
        let Some(replies) = self.pass.replies.replies(parent_id) else {
            return;
        };
        let fragments: Vec<Fragment> = replies
            .iter()
            .zip(1u64..)
            .map(|(reply, index)| {
                render(
                    self.formatter.as_ref(),
                    &self.display,
                    self.video.as_ref(),
                    reply,
                    DisplayIndex::Numbered(index),
                    true,
                    self.deep_link.is_target(&reply.id),
                )
            })
            .collect();
        let count = fragments.len();
        self.view.set_reply_panel(parent_id, &fragments);
        self.view.set_panel_visibility(parent_id, true);
        self.view.set_affordance_label(parent_id, &hide_label(count));
        self.view.set_affordance_enabled(parent_id, true);
    }

    /// Shows the linked parent on its own surface. A linked reply is pinned
    /// into the parent's reply panel and the panel is forced open; cached
    /// replies are re-rendered with the highlight instead of being fetched.
    pub fn resolve_deep_link(&mut self, parent: &CommentRecord, reply: Option<&CommentRecord>) {
        let targets_reply = self
            .deep_link
            .resolve(&parent.id, reply.map(|r| r.id.as_str()))
            .targets_reply();
        info!(
            parent_id = %parent.id,
            reply_id = reply.map(|r| r.id.as_str()),
            targets_reply,
            "deep link resolved"
        );

        let linked = render(
            self.formatter.as_ref(),
            &self.display,
            self.video.as_ref(),
            parent,
            DisplayIndex::Unnumbered,
            false,
            false,
        );
        self.view.show_linked(&linked);

        // A reply link naming the parent itself is a parent-only link.
        let Some(reply) = reply.filter(|_| targets_reply) else {
            return;
        };

        if self.pass.replies.force_expand(&parent.id).is_some() {
            self.populate_replies(&parent.id);
            return;
        }

        let pinned = render(
            self.formatter.as_ref(),
            &self.display,
            self.video.as_ref(),
            reply,
            DisplayIndex::Unnumbered,
            true,
            true,
        );
        self.view
            .set_reply_panel(&parent.id, std::slice::from_ref(&pinned));
        self.view.set_panel_visibility(&parent.id, true);
    }

    pub fn stats_computed(&mut self, scores: &SentimentScores) {
        if let Err(err) = scores.validate() {
            warn!(error = %err, "ignoring sentiment scores");
            return;
        }
        self.view.render_chart(scores);
    }
}

fn render(
    formatter: &dyn CommentFormatter,
    display: &DisplayConfig,
    video: Option<&VideoContext>,
    record: &CommentRecord,
    index: DisplayIndex,
    is_reply: bool,
    highlighted: bool,
) -> Fragment {
    let ctx = FormatContext {
        index,
        display,
        uploader_id: video.map(|v| v.uploader_id.as_str()),
        video_id: video.map(|v| v.video_id.as_str()),
        is_reply,
    };
    Fragment {
        comment_id: record.id.clone(),
        index,
        highlighted,
        body: formatter.format_comment(record, &ctx),
    }
}

fn validated(values: Vec<Value>, kind: &str) -> Vec<CommentRecord> {
    let (records, errors): (Vec<CommentRecord>, Vec<RecordError>) = parse_records(values);
    for err in &errors {
        warn!(kind, error = %err, "skipping malformed record");
    }
    records
}
