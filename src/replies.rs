use std::collections::{HashMap, HashSet};

use crate::youtube::CommentRecord;

/// Visibility of one parent's reply panel within a load pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    NotFetched,
    Loading,
    Collapsed,
    Expanded,
}

/// What a toggle press resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Nothing cached yet; the caller must emit one fetch request.
    Fetch,
    /// A fetch is already outstanding for this parent.
    Pending,
    Shown { count: usize },
    Hidden { count: usize },
}

/// Restores ascending publish order when upstream delivered the replies
/// reversed. Only the first pair is inspected. Returns whether it reversed.
pub fn repair_order(replies: &mut [CommentRecord]) -> bool {
    if replies.len() >= 2 && replies[0].published_at > replies[1].published_at {
        replies.reverse();
        return true;
    }
    false
}

/// Per-parent reply store for one load pass.
///
/// Fetch state and panel visibility are tracked separately: `stored` says
/// what has been fetched, `displayed` what is currently expanded, and
/// `in_flight` which parents are waiting on the remote channel.
#[derive(Debug, Default)]
pub struct ReplyCache {
    stored: HashMap<String, Vec<CommentRecord>>,
    displayed: HashSet<String>,
    in_flight: HashSet<String>,
}

impl ReplyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, parent_id: &str) -> ReplyState {
        if self.stored.contains_key(parent_id) {
            if self.displayed.contains(parent_id) {
                ReplyState::Expanded
            } else {
                ReplyState::Collapsed
            }
        } else if self.in_flight.contains(parent_id) {
            ReplyState::Loading
        } else {
            ReplyState::NotFetched
        }
    }

    pub fn replies(&self, parent_id: &str) -> Option<&[CommentRecord]> {
        self.stored.get(parent_id).map(Vec::as_slice)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn toggle(&mut self, parent_id: &str) -> Toggle {
        if let Some(replies) = self.stored.get(parent_id) {
            let count = replies.len();
            if self.displayed.remove(parent_id) {
                Toggle::Hidden { count }
            } else {
                self.displayed.insert(parent_id.to_string());
                Toggle::Shown { count }
            }
        } else if self.in_flight.insert(parent_id.to_string()) {
            Toggle::Fetch
        } else {
            Toggle::Pending
        }
    }

    /// Forgets an outstanding request so the parent can be fetched again.
    pub fn abandon(&mut self, parent_id: &str) -> bool {
        self.in_flight.remove(parent_id)
    }

    /// Accepts a delivery only for a parent that is loading in this pass.
    /// Anything else (a stale parent from before a reset, or an unrequested
    /// delivery) is handed back to the caller untouched.
    pub fn store(
        &mut self,
        parent_id: &str,
        mut replies: Vec<CommentRecord>,
    ) -> Result<&[CommentRecord], Vec<CommentRecord>> {
        if !self.in_flight.remove(parent_id) {
            return Err(replies);
        }
        repair_order(&mut replies);
        self.displayed.insert(parent_id.to_string());
        let entry = self.stored.entry(parent_id.to_string()).or_default();
        *entry = replies;
        Ok(entry.as_slice())
    }

    /// Marks a cached parent expanded without fetching; `None` if nothing is
    /// cached for it.
    pub fn force_expand(&mut self, parent_id: &str) -> Option<&[CommentRecord]> {
        let replies = self.stored.get(parent_id)?;
        self.displayed.insert(parent_id.to_string());
        Some(replies.as_slice())
    }

    pub fn clear(&mut self) {
        self.stored.clear();
        self.displayed.clear();
        self.in_flight.clear();
    }
}
