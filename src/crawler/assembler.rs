//! Thread assembly
//!
//! A thread is spread over up to `max_pages` pages, page 0 holding the newest
//! comments. The assembler requests every page concurrently (staggered by
//! its delay schedule), drops pages past the end of the thread, checks that
//! all pages agree on the thread head, and folds the pages oldest-first into
//! one comment sequence with reply references resolved.

use crate::config::CrawlerConfig;
use crate::crawler::limiter::{pace, retry, DelaySchedule, LinearBackoff, RetryPolicy};
use crate::crawler::CancelToken;
use crate::model::{Comment, CommentRef, Page, PageHead, Thread};
use crate::source::PageSource;
use crate::TrailError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fetches and merges all pages of a single thread
#[derive(Debug)]
pub struct Assembler<S> {
    source: Arc<S>,
    max_pages: u32,
    schedule: Arc<dyn DelaySchedule>,
    retry: RetryPolicy,
    cancel: CancelToken,
}

impl<S: PageSource + 'static> Assembler<S> {
    /// Creates an assembler with the default pacing and retry policy
    pub fn new(source: Arc<S>, max_pages: u32) -> Self {
        Self::from_config(
            source,
            &CrawlerConfig {
                max_pages_per_thread: max_pages,
                ..CrawlerConfig::default()
            },
        )
    }

    /// Creates an assembler paced by a linear backoff of `page-delay-ms`
    pub fn from_config(source: Arc<S>, config: &CrawlerConfig) -> Self {
        Self {
            source,
            max_pages: config.max_pages_per_thread,
            schedule: Arc::new(LinearBackoff {
                step: config.page_delay(),
            }),
            retry: RetryPolicy::from_config(config),
            cancel: CancelToken::new(),
        }
    }

    /// Replaces the per-page delay schedule
    pub fn with_schedule(mut self, schedule: Arc<dyn DelaySchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Replaces the retry policy for transient page failures
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Uses `cancel` to abort in-flight page requests
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Assembles the thread at `base`
    ///
    /// # Returns
    ///
    /// * `Ok(Thread)` - All non-empty pages merged, replies resolved
    /// * `Err(TrailError::AllPagesFailed)` - No page could be fetched
    /// * `Err(TrailError::EmptyThread)` - Every fetched page was empty
    /// * `Err(TrailError::InconsistentHead)` - Pages disagree on prev/next
    /// * `Err(TrailError::Cancelled)` - The cancel token fired
    pub async fn assemble(&self, thread_id: i64, base: &str) -> Result<Thread, TrailError> {
        tracing::debug!(
            "Assembling thread {} from {} ({} pages)",
            thread_id,
            base,
            self.max_pages
        );
        let pages = self.fetch_all_pages(base).await?;
        build_thread(thread_id, base, pages)
    }

    /// Requests pages `0..max_pages` concurrently
    ///
    /// Failed pages are logged and left out. Results are keyed by page
    /// number, so completion order does not matter.
    async fn fetch_all_pages(&self, base: &str) -> Result<Vec<(u32, Page)>, TrailError> {
        let mut tasks = JoinSet::new();

        for number in 0..self.max_pages {
            let source = Arc::clone(&self.source);
            let schedule = Arc::clone(&self.schedule);
            let policy = self.retry;
            let cancel = self.cancel.clone();
            let base = base.to_string();

            tasks.spawn(async move {
                let what = crate::url::page_url(&base, number);
                let result = async {
                    pace(schedule.as_ref(), number, &cancel).await?;
                    retry(&policy, &cancel, &what, || source.fetch_page(&base, number)).await
                }
                .await;
                (number, result)
            });
        }

        let mut fetched = Vec::new();
        let mut last_error = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((number, Ok(page))) => fetched.push((number, page)),
                Ok((_, Err(TrailError::Cancelled))) => {
                    tasks.abort_all();
                    return Err(TrailError::Cancelled);
                }
                Ok((number, Err(e))) => {
                    tracing::warn!("Page {} of {} failed: {}", number, base, e);
                    last_error = Some(e.to_string());
                }
                Err(e) => {
                    tracing::warn!("Page task for {} did not finish: {}", base, e);
                    last_error = Some(e.to_string());
                }
            }
        }

        if fetched.is_empty() {
            return Err(TrailError::AllPagesFailed {
                address: base.to_string(),
                attempted: self.max_pages,
                last_error: last_error.unwrap_or_else(|| "no pages requested".to_string()),
            });
        }

        fetched.sort_by_key(|(number, _)| *number);
        Ok(fetched)
    }
}

/// Builds a thread from fetched `(page number, page)` pairs
///
/// Empty pages are dropped before the head check, since pages past the end
/// of a thread carry no meaningful head.
pub fn build_thread(
    thread_id: i64,
    address: &str,
    mut pages: Vec<(u32, Page)>,
) -> Result<Thread, TrailError> {
    pages.retain(|(number, page)| {
        if page.is_empty() {
            tracing::trace!("Dropping empty page {} of {}", number, address);
        }
        !page.is_empty()
    });
    pages.sort_by_key(|(number, _)| *number);

    let head = match pages.first() {
        Some((_, first)) => first.head.clone(),
        None => {
            return Err(TrailError::EmptyThread {
                address: address.to_string(),
            })
        }
    };

    if pages.iter().any(|(_, page)| page.head != head) {
        let mut heads: Vec<PageHead> = Vec::new();
        for (_, page) in &pages {
            if !heads.contains(&page.head) {
                heads.push(page.head.clone());
            }
        }
        return Err(TrailError::InconsistentHead {
            address: address.to_string(),
            heads,
        });
    }

    let contents = merge_pages(pages.into_iter().map(|(_, page)| page).collect());
    tracing::debug!(
        "Thread {} at {}: {} comments merged",
        thread_id,
        address,
        contents.len()
    );

    Ok(Thread {
        id: thread_id,
        address: address.to_string(),
        head,
        contents,
    })
}

/// Folds pages, given in ascending page number, into one comment sequence
///
/// Pages are appended from the highest page number down to page 0, which
/// yields ascending comment ids. Each appended comment can only resolve its
/// reply against comments already merged (itself included); a comment whose
/// id was already merged is dropped.
pub fn merge_pages(pages: Vec<Page>) -> Vec<Comment> {
    let mut merged: Vec<Comment> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();

    for page in pages.into_iter().rev() {
        for mut comment in page.contents {
            if positions.contains_key(&comment.id) {
                tracing::trace!("Skipping duplicate comment #{}", comment.id);
                continue;
            }

            positions.insert(comment.id, merged.len());
            comment.reply_ref = comment
                .reply_id
                .and_then(|cited| positions.get(&cited).copied())
                .map(CommentRef);
            merged.push(comment);
        }
    }

    merged
}
