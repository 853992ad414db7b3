//! Data model for pages, comments and reconstructed threads
//!
//! - `Comment`: one forum post, with its reply citation
//! - `Page`: one fetched pagination unit of a thread
//! - `Thread`: all pages of one thread merged into a single sequence

mod comment;
mod page;
mod thread;

pub use comment::{Comment, CommentRef};
pub use page::{Page, PageHead};
pub use thread::Thread;
