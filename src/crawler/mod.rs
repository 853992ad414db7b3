//! Thread assembly and topic traversal
//!
//! This module contains the core traversal logic, including:
//! - Assembling one thread from its concurrently fetched pages
//! - Following prev/next links across the threads of a topic
//! - Request pacing, retry and cancellation

mod assembler;
mod cancel;
pub mod limiter;
mod traverser;

#[cfg(test)]
pub(crate) mod testing;

pub use assembler::{build_thread, merge_pages, Assembler};
pub use cancel::CancelToken;
pub use traverser::{BranchFailure, Topic, Traverser};
