//! Output module for traversal results
//!
//! This module handles:
//! - Writing one JSON dump per assembled thread
//! - Summarizing a traversal on stdout and as markdown

mod dump;
mod markdown;
pub mod stats;

pub use dump::{write_thread_dumps, CommentRecord, ReplyRecord, ThreadRecord};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_summary, TraversalSummary};
