//! Per-thread JSON dumps
//!
//! Each thread is written to `{index}.json`, where `index` is its 1-based
//! position in the traversal result. Reply references are arena indices and
//! do not serialize on their own, so every comment carries a copy of the
//! comment it replies to.

use crate::model::{Comment, PageHead, Thread};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialized form of one thread
#[derive(Debug, Serialize)]
pub struct ThreadRecord<'a> {
    pub id: i64,
    pub address: &'a str,
    pub head: &'a PageHead,
    pub written_at: DateTime<Utc>,
    pub comments: Vec<CommentRecord<'a>>,
}

/// Serialized form of one comment with its reply target embedded
#[derive(Debug, Serialize)]
pub struct CommentRecord<'a> {
    pub id: u64,
    pub time: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyRecord<'a>>,
}

/// The cited comment, one level deep
#[derive(Debug, Serialize)]
pub struct ReplyRecord<'a> {
    pub id: u64,
    pub time: &'a str,
    pub text: &'a str,
}

impl<'a> ThreadRecord<'a> {
    pub fn new(thread: &'a Thread, written_at: DateTime<Utc>) -> Self {
        Self {
            id: thread.id,
            address: &thread.address,
            head: &thread.head,
            written_at,
            comments: thread
                .contents
                .iter()
                .map(|c| CommentRecord::new(thread, c))
                .collect(),
        }
    }
}

impl<'a> CommentRecord<'a> {
    fn new(thread: &'a Thread, comment: &'a Comment) -> Self {
        Self {
            id: comment.id,
            time: &comment.time,
            text: &comment.text,
            reply_id: comment.reply_id,
            reply: thread.reply_target(comment).map(|target| ReplyRecord {
                id: target.id,
                time: &target.time,
                text: &target.text,
            }),
        }
    }
}

/// Writes every thread to `dir/{index}.json`
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - The files written, in thread order
/// * `Err(TrailError)` - The directory or a file could not be written
pub fn write_thread_dumps(dir: &Path, threads: &[Thread]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let written_at = Utc::now();

    let mut paths = Vec::with_capacity(threads.len());
    for (position, thread) in threads.iter().enumerate() {
        let path = dir.join(format!("{}.json", position + 1));
        let json = serde_json::to_string_pretty(&ThreadRecord::new(thread, written_at))?;
        fs::write(&path, json)?;

        tracing::debug!("Wrote thread {} to {}", thread.id, path.display());
        paths.push(path);
    }

    tracing::info!("Wrote {} thread dumps to {}", paths.len(), dir.display());
    Ok(paths)
}
