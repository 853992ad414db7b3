use serde::{Deserialize, Serialize};

/// Position of a comment inside its thread's content sequence
///
/// Reply references never leave the thread they were resolved in, so an
/// index into `Thread::contents` is enough to identify the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentRef(pub usize);

impl CommentRef {
    /// Returns the index into the owning thread's contents
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single forum post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Forum-assigned number, unique within a thread (higher is later)
    pub id: u64,

    /// Timestamp exactly as rendered by the forum
    pub time: String,

    /// Body text with the reply citation stripped
    pub text: String,

    /// Id of the comment this one cites, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<u64>,

    /// Resolved position of the cited comment, set during merge
    #[serde(skip)]
    pub reply_ref: Option<CommentRef>,
}

impl Comment {
    /// Creates a comment without a reply citation
    pub fn new(id: u64, time: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            time: time.into(),
            text: text.into(),
            reply_id: None,
            reply_ref: None,
        }
    }

    /// Sets the id this comment replies to
    pub fn replying_to(mut self, reply_id: u64) -> Self {
        self.reply_id = Some(reply_id);
        self
    }

    /// Returns true if the comment cites another comment
    pub fn is_reply(&self) -> bool {
        self.reply_id.is_some()
    }

    /// Returns true if the comment cites an id that could not be resolved
    pub fn is_dangling(&self) -> bool {
        self.reply_id.is_some() && self.reply_ref.is_none()
    }
}
