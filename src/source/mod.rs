//! Page sources
//!
//! A page source turns `(thread base address, page number)` into a parsed
//! [`Page`]. The assembler only depends on the [`PageSource`] trait, so the
//! HTTP implementation can be swapped for an in-memory one in tests.

mod fetcher;
mod parser;

pub use fetcher::{build_http_client, fetch_document};
pub use parser::parse_page;

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::model::Page;
use crate::url::page_url;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Fetches and parses single pages of a thread
///
/// Page 0 is the newest page. A page number past the end of the thread is
/// expected to come back as an empty page rather than an error.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, base: &str, page: u32) -> Result<Page>;
}

/// Page source backed by HTTP requests against the live forum
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the user agent and crawler settings
    pub fn from_config(user_agent: &UserAgentConfig, crawler: &CrawlerConfig) -> Result<Self> {
        let client = build_http_client(user_agent, crawler.request_timeout())?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, base: &str, page: u32) -> Result<Page> {
        let url = page_url(base, page);
        let body = fetch_document(&self.client, &url).await?;
        let parsed = parse_page(&body, &url)?;
        tracing::debug!(
            "Parsed {}: {} comments, prev={:?}, next={:?}",
            url,
            parsed.contents.len(),
            parsed.head.prev,
            parsed.head.next
        );
        Ok(parsed)
    }
}
