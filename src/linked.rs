/// The comment a navigation link pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub parent_id: String,
    /// The reply id when a reply was linked, otherwise the parent id.
    pub target_id: String,
}

impl DeepLink {
    pub fn targets_reply(&self) -> bool {
        self.parent_id != self.target_id
    }
}

#[derive(Debug, Default)]
pub struct DeepLinkResolver {
    active: Option<DeepLink>,
}

impl DeepLinkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, parent_id: &str, reply_id: Option<&str>) -> &DeepLink {
        self.active.insert(DeepLink {
            parent_id: parent_id.to_string(),
            target_id: reply_id.unwrap_or(parent_id).to_string(),
        })
    }

    pub fn active(&self) -> Option<&DeepLink> {
        self.active.as_ref()
    }

    pub fn is_target(&self, id: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|link| link.target_id == id)
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}
