use super::Comment;
use serde::{Deserialize, Serialize};

/// Links from a thread to its neighbours in the topic chain
///
/// Every page of the same thread reports the same head; the links point at
/// other threads, not at other pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageHead {
    /// Address of the previous (older) thread
    pub prev: Option<String>,

    /// Address of the next (newer) thread
    pub next: Option<String>,
}

impl PageHead {
    /// Creates a head from optional neighbour addresses
    pub fn new(prev: Option<&str>, next: Option<&str>) -> Self {
        Self {
            prev: prev.map(str::to_string),
            next: next.map(str::to_string),
        }
    }
}

/// One fetched pagination unit of a thread
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub head: PageHead,

    /// Comments on this page, ascending by id, no duplicates
    pub contents: Vec<Comment>,
}

impl Page {
    /// Creates a page, sorting and deduplicating its comments by id
    pub fn new(head: PageHead, mut contents: Vec<Comment>) -> Self {
        contents.sort_by_key(|c| c.id);
        contents.dedup_by_key(|c| c.id);
        Self { head, contents }
    }

    /// Returns true if the page lies past the end of its thread
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}
