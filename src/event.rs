use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Timezone;
use crate::stats::StatsPayload;
use crate::youtube::VideoMetadata;

/// Everything that can drive the controller: deliveries from the remote
/// channel and actions from the view.
///
/// Comment payloads stay raw JSON here and are validated by the controller,
/// so one malformed record does not discard its whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inbound {
    #[serde(rename_all = "camelCase")]
    TopLevelBatch {
        #[serde(default)]
        reset: bool,
        #[serde(default)]
        items: Vec<Value>,
    },
    #[serde(rename_all = "camelCase")]
    RepliesFetched {
        parent_id: String,
        #[serde(default)]
        replies: Vec<Value>,
    },
    StatsComputed(StatsPayload),
    VideoSelected(VideoMetadata),
    LoadPassStarting,
    #[serde(rename_all = "camelCase")]
    ToggleReplies { parent_id: String },
    DeepLink {
        parent: Value,
        #[serde(default)]
        reply: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    ConfigurationChanged {
        timezone: Timezone,
        show_images: bool,
    },
    WindowResized {
        #[serde(default)]
        width: u16,
        #[serde(default)]
        height: u16,
    },
}

impl Inbound {
    pub fn name(&self) -> &'static str {
        match self {
            Inbound::TopLevelBatch { .. } => "topLevelBatch",
            Inbound::RepliesFetched { .. } => "repliesFetched",
            Inbound::StatsComputed(_) => "statsComputed",
            Inbound::VideoSelected(_) => "videoSelected",
            Inbound::LoadPassStarting => "loadPassStarting",
            Inbound::ToggleReplies { .. } => "toggleReplies",
            Inbound::DeepLink { .. } => "deepLink",
            Inbound::ConfigurationChanged { .. } => "configurationChanged",
            Inbound::WindowResized { .. } => "windowResized",
        }
    }
}
