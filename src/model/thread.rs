use super::{Comment, PageHead};
use serde::Serialize;

/// A thread reassembled from all of its pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    /// Signed offset from the thread traversal started at
    pub id: i64,

    /// Base address the pages were fetched from
    pub address: String,

    pub head: PageHead,

    /// All comments, ascending by id, with replies resolved
    pub contents: Vec<Comment>,
}

impl Thread {
    /// Returns the comment a reply refers to, if it was resolved
    pub fn reply_target(&self, comment: &Comment) -> Option<&Comment> {
        comment
            .reply_ref
            .and_then(|r| self.contents.get(r.index()))
    }

    /// Looks up a comment by its forum id
    pub fn comment(&self, id: u64) -> Option<&Comment> {
        self.contents
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &self.contents[i])
    }

    /// Number of replies whose target was found in this thread
    pub fn resolved_replies(&self) -> usize {
        self.contents
            .iter()
            .filter(|c| c.reply_ref.is_some())
            .count()
    }

    /// Number of replies citing an id this thread does not contain
    pub fn dangling_replies(&self) -> usize {
        self.contents.iter().filter(|c| c.is_dangling()).count()
    }
}
