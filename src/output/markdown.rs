//! Markdown summary generation
//!
//! This module renders a [`TraversalSummary`] as a human-readable report.

use crate::output::stats::TraversalSummary;
use crate::Result;
use std::fs;
use std::path::Path;

/// Writes the markdown summary to `output_path`, creating parent directories
pub fn generate_markdown_summary(summary: &TraversalSummary, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, format_markdown_summary(summary))?;

    tracing::info!("Summary written to {}", output_path.display());
    Ok(())
}

/// Formats a traversal summary as markdown
pub fn format_markdown_summary(summary: &TraversalSummary) -> String {
    let mut md = String::new();

    md.push_str("# Thread-Trail Summary\n\n");

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Start**: {}\n", summary.start_url));
    md.push_str(&format!("- **Threads**: {}\n", summary.thread_count));
    md.push_str(&format!("- **Comments**: {}\n", summary.comment_count));
    if let Some((low, high)) = summary.id_range {
        md.push_str(&format!("- **Thread Ids**: {} to {}\n", low, high));
    }
    md.push_str(&format!(
        "- **Replies**: {} resolved, {} dangling ({:.2}% resolved)\n\n",
        summary.resolved_replies,
        summary.dangling_replies,
        summary.resolution_rate()
    ));

    if !summary.threads.is_empty() {
        md.push_str("## Threads\n\n");
        md.push_str("| Id | Address | Comments |\n");
        md.push_str("|----|---------|----------|\n");
        for (id, address, comments) in &summary.threads {
            md.push_str(&format!("| {} | {} | {} |\n", id, address, comments));
        }
        md.push('\n');
    }

    if !summary.failures.is_empty() {
        md.push_str("## Failed Threads\n\n");
        for failure in &summary.failures {
            md.push_str(&format!(
                "- **{}** `{}`: {}\n",
                failure.id, failure.address, failure.error
            ));
        }
        md.push('\n');
    }

    md
}
