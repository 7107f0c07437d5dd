use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("remote channel is disconnected")]
    Disconnected,
    #[error("remote channel rejected the request: {0}")]
    Rejected(String),
}

/// Requests this crate sends to the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundRequest {
    #[serde(rename_all = "camelCase")]
    RequestReplies { parent_id: String },
}

/// Outgoing half of the transport. Sends are fire-and-forget; the answer
/// comes back later as an inbound event.
pub trait RemoteChannel {
    fn request_replies(&mut self, parent_id: &str) -> Result<(), ChannelError>;
}

impl RemoteChannel for Sender<OutboundRequest> {
    fn request_replies(&mut self, parent_id: &str) -> Result<(), ChannelError> {
        self.send(OutboundRequest::RequestReplies {
            parent_id: parent_id.to_string(),
        })
        .map_err(|_| ChannelError::Disconnected)
    }
}

/// Records requests instead of sending them. `fail_next` makes the next
/// send fail once.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    pub requests: Vec<String>,
    pub fail_next: bool,
}

impl RecordingChannel {
    pub fn count_for(&self, parent_id: &str) -> usize {
        self.requests.iter().filter(|id| *id == parent_id).count()
    }
}

impl RemoteChannel for RecordingChannel {
    fn request_replies(&mut self, parent_id: &str) -> Result<(), ChannelError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(ChannelError::Rejected(parent_id.to_string()));
        }
        self.requests.push(parent_id.to_string());
        Ok(())
    }
}
