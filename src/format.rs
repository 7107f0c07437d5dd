use chrono::{DateTime, Local, Utc};

use crate::config::{DisplayConfig, Timezone};
use crate::progress::group_digits;
use crate::youtube::{CommentRecord, VideoMetadata, WATCH_URL};

/// Position label for a rendered comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayIndex {
    Numbered(u64),
    /// Deep-linked comments are shown without a number.
    Unnumbered,
}

pub struct FormatContext<'a> {
    pub index: DisplayIndex,
    pub display: &'a DisplayConfig,
    pub uploader_id: Option<&'a str>,
    pub video_id: Option<&'a str>,
    pub is_reply: bool,
}

/// Turns records into renderable text. Implementations hold no session state.
pub trait CommentFormatter {
    fn format_comment(&self, comment: &CommentRecord, ctx: &FormatContext<'_>) -> String;
    fn format_title(&self, video: &VideoMetadata, display: &DisplayConfig) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormatter;

pub fn format_timestamp(ts: &DateTime<Utc>, timezone: Timezone) -> String {
    match timezone {
        Timezone::Utc => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        Timezone::Local => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    }
}

fn plural(count: u64, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{} {word}s", group_digits(count))
    }
}

impl CommentFormatter for PlainFormatter {
    fn format_comment(&self, comment: &CommentRecord, ctx: &FormatContext<'_>) -> String {
        let mut header = String::new();
        if let DisplayIndex::Numbered(index) = ctx.index {
            header.push_str(&format!("#{index} "));
        }
        header.push_str(comment.author());
        if ctx.uploader_id.is_some() && comment.author_channel_id() == ctx.uploader_id {
            header.push_str(" [OP]");
        }
        header.push_str(" · ");
        header.push_str(&format_timestamp(&comment.published_at, ctx.display.timezone));
        let likes = comment.like_count();
        if likes > 0 {
            header.push_str(" · ");
            header.push_str(&plural(likes, "like"));
        }

        let indent = if ctx.is_reply { "    " } else { "" };
        let mut lines = vec![format!("{indent}{header}")];

        if ctx.display.show_images {
            if let Some(url) = comment.author_image_url() {
                lines.push(format!("{indent}  [avatar: {url}]"));
            }
        }

        let body_prefix = format!("{indent}  ");
        let options = textwrap::Options::new(ctx.display.wrap_width.max(20))
            .initial_indent(&body_prefix)
            .subsequent_indent(&body_prefix);
        let body = comment.text().trim();
        if body.is_empty() {
            lines.push(format!("{body_prefix}(no comment body)"));
        } else {
            lines.extend(textwrap::wrap(body, &options).into_iter().map(|l| l.into_owned()));
        }

        if !ctx.is_reply {
            let replies = comment.total_reply_count();
            if replies > 0 {
                lines.push(format!(
                    "  \u{25BC} Show {} replies ({})",
                    group_digits(replies),
                    comment.id
                ));
            }
        }

        if let (Some(video_id), DisplayIndex::Unnumbered) = (ctx.video_id, ctx.index) {
            lines.push(format!(
                "{indent}  {WATCH_URL}?v={video_id}&lc={}",
                comment.id
            ));
        }

        lines.join("\n")
    }

    fn format_title(&self, video: &VideoMetadata, display: &DisplayConfig) -> String {
        let title = if video.snippet.title.trim().is_empty() {
            "(untitled video)"
        } else {
            video.snippet.title.as_str()
        };
        let channel = if video.snippet.channel_title.trim().is_empty() {
            video.snippet.channel_id.as_str()
        } else {
            video.snippet.channel_title.as_str()
        };
        let stats = &video.statistics;
        format!(
            "{title}\n{channel} · {published}\n{views} · {likes} · {comments}\n{url}",
            published = format_timestamp(&video.snippet.published_at, display.timezone),
            views = plural(stats.view_count, "view"),
            likes = plural(stats.like_count, "like"),
            comments = plural(stats.comment_count, "comment"),
            url = video.watch_url(),
        )
    }
}
