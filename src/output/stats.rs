//! Traversal statistics
//!
//! This module condenses a [`Topic`] into the figures reported at the end
//! of a run.

use crate::crawler::{BranchFailure, Topic};

/// Figures describing one finished traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalSummary {
    /// Address the traversal started at
    pub start_url: String,

    /// Number of assembled threads
    pub thread_count: usize,

    /// Number of comments across all threads
    pub comment_count: usize,

    /// Lowest and highest thread id, if any thread was assembled
    pub id_range: Option<(i64, i64)>,

    /// Replies whose target was found in the same thread
    pub resolved_replies: usize,

    /// Replies citing a comment the thread does not contain
    pub dangling_replies: usize,

    /// Per-thread `(id, address, comments)` in id order
    pub threads: Vec<(i64, String, usize)>,

    /// Branches that could not be assembled
    pub failures: Vec<BranchFailure>,
}

impl TraversalSummary {
    pub fn from_topic(start_url: &str, topic: &Topic) -> Self {
        let ids = topic.ids();
        let id_range = match (ids.first(), ids.last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        };

        Self {
            start_url: start_url.to_string(),
            thread_count: topic.threads.len(),
            comment_count: topic.comment_count(),
            id_range,
            resolved_replies: topic.threads.iter().map(|t| t.resolved_replies()).sum(),
            dangling_replies: topic.threads.iter().map(|t| t.dangling_replies()).sum(),
            threads: topic
                .threads
                .iter()
                .map(|t| (t.id, t.address.clone(), t.contents.len()))
                .collect(),
            failures: topic.failures.clone(),
        }
    }

    /// Percentage of citations that resolved within their thread
    pub fn resolution_rate(&self) -> f64 {
        let total = self.resolved_replies + self.dangling_replies;
        if total == 0 {
            return 0.0;
        }
        (self.resolved_replies as f64 / total as f64) * 100.0
    }
}

/// Prints a traversal summary to stdout
pub fn print_summary(summary: &TraversalSummary) {
    println!("=== Traversal Summary ===\n");

    println!("Overview:");
    println!("  Start: {}", summary.start_url);
    println!("  Threads assembled: {}", summary.thread_count);
    println!("  Comments: {}", summary.comment_count);
    if let Some((low, high)) = summary.id_range {
        println!("  Thread ids: {} ..= {}", low, high);
    }
    println!(
        "  Replies: {} resolved, {} dangling ({:.1}% resolved)",
        summary.resolved_replies,
        summary.dangling_replies,
        summary.resolution_rate()
    );
    println!();

    if !summary.failures.is_empty() {
        println!("Failed Threads ({}):", summary.failures.len());
        for failure in &summary.failures {
            println!("  {:>4}  {}: {}", failure.id, failure.address, failure.error);
        }
        println!();
    }
}
