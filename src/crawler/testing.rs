//! In-memory page source for assembler and traverser tests

use crate::model::{Comment, Page, PageHead};
use crate::source::PageSource;
use crate::{Result, TrailError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves scripted pages keyed by thread address and page number
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    threads: HashMap<String, Vec<Page>>,
    failing: HashMap<(String, u32), u16>,
    flaky: Mutex<HashMap<(String, u32), u32>>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a thread; `pages[0]` is page 0, anything past the end is empty
    pub(crate) fn with_thread(mut self, base: &str, pages: Vec<Page>) -> Self {
        self.threads.insert(base.to_string(), pages);
        self
    }

    /// Makes one page answer with an HTTP status error every time
    pub(crate) fn failing(mut self, base: &str, page: u32, status: u16) -> Self {
        self.failing.insert((base.to_string(), page), status);
        self
    }

    /// Makes one page answer 503 for its first `times` requests
    pub(crate) fn flaky(self, base: &str, page: u32, times: u32) -> Self {
        self.flaky
            .lock()
            .unwrap()
            .insert((base.to_string(), page), times);
        self
    }

    /// Number of requests made for pages of `base`
    pub(crate) fn requests_for(&self, base: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, _)| b == base)
            .count()
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn fetch_page(&self, base: &str, page: u32) -> Result<Page> {
        self.requests.lock().unwrap().push((base.to_string(), page));
        let key = (base.to_string(), page);
        let url = crate::url::page_url(base, page);

        if let Some(status) = self.failing.get(&key) {
            return Err(TrailError::Status {
                url,
                status: *status,
            });
        }

        if let Some(remaining) = self.flaky.lock().unwrap().get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TrailError::Status { url, status: 503 });
            }
        }

        match self.threads.get(base) {
            Some(pages) => Ok(pages.get(page as usize).cloned().unwrap_or_default()),
            None => Err(TrailError::Status { url, status: 404 }),
        }
    }
}

/// Builds a page from `(id, reply_id)` pairs
pub(crate) fn page(head: &PageHead, comments: &[(u64, Option<u64>)]) -> Page {
    let contents = comments
        .iter()
        .map(|&(id, reply_id)| Comment {
            id,
            time: format!("2024/01/01 00:{:02}", id % 60),
            text: format!("comment {}", id),
            reply_id,
            reply_ref: None,
        })
        .collect();
    Page::new(head.clone(), contents)
}

/// Builds a page of plain comments with ids in `ids`
pub(crate) fn plain_page(head: &PageHead, ids: std::ops::RangeInclusive<u64>) -> Page {
    let comments: Vec<(u64, Option<u64>)> = ids.map(|id| (id, None)).collect();
    page(head, &comments)
}
