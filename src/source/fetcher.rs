//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the page source:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for thread pages
//! - Error classification (timeouts, connection failures, status codes)
//!
//! Retrying is left to the caller; see `crawler::limiter::retry`.

use crate::config::UserAgentConfig;
use crate::TrailError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total timeout for a single request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use thread_trail::config::UserAgentConfig;
/// use thread_trail::source::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "ThreadTrail".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and returns its body
///
/// # Error Classification
///
/// | Condition | Error | Transient |
/// |-----------|-------|-----------|
/// | Timeout | `Timeout` | yes |
/// | Connection refused | `Http` | yes |
/// | HTTP 429 / 5xx | `Status` | yes |
/// | Other non-2xx | `Status` | no |
/// | Body read failure | `Http` | no |
pub async fn fetch_document(client: &Client, url: &str) -> Result<String, TrailError> {
    let response = client.get(url).send().await.map_err(|e| classify(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(TrailError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify(url, e))
}

fn classify(url: &str, error: reqwest::Error) -> TrailError {
    if error.is_timeout() {
        TrailError::Timeout {
            url: url.to_string(),
        }
    } else {
        TrailError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
