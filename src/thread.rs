use crate::youtube::CommentRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct NumberedComment {
    /// 1-based position within the current load pass.
    pub index: u64,
    pub record: CommentRecord,
}

/// Running store of top-level comments for one load pass.
#[derive(Debug, Default)]
pub struct ThreadAccumulator {
    count: u64,
    comments: Vec<NumberedComment>,
}

impl ThreadAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn comments(&self) -> &[NumberedComment] {
        &self.comments
    }

    /// Appends a batch in arrival order and returns the newly numbered slice.
    pub fn ingest(&mut self, items: Vec<CommentRecord>) -> &[NumberedComment] {
        let start = self.comments.len();
        self.comments.reserve(items.len());
        for record in items {
            self.count += 1;
            self.comments.push(NumberedComment {
                index: self.count,
                record,
            });
        }
        &self.comments[start..]
    }

    pub fn clear(&mut self) {
        self.count = 0;
        self.comments.clear();
    }
}
