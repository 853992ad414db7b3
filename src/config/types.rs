use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Thread-Trail
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub topic: TopicConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Where the traversal starts
#[derive(Debug, Clone, Deserialize)]
pub struct TopicConfig {
    /// Address of the thread that gets id 0
    #[serde(rename = "start-url")]
    pub start_url: String,
}

/// Fetch pacing and limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of pages requested for every thread
    #[serde(rename = "max-pages-per-thread")]
    pub max_pages_per_thread: u32,

    /// Step of the linear backoff between page requests of one thread (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Fixed delay before expanding each sibling thread (milliseconds)
    #[serde(rename = "thread-delay-ms")]
    pub thread_delay_ms: u64,

    /// Extra attempts for a page after a transient failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on the number of threads discovered
    #[serde(rename = "max-threads")]
    pub max_threads: Option<u32>,

    /// Overall traversal deadline (seconds)
    #[serde(rename = "deadline-secs")]
    pub deadline_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages_per_thread: 20,
            page_delay_ms: 200,
            thread_delay_ms: 1000,
            max_retries: 2,
            retry_delay_ms: 2000,
            request_timeout_secs: 30,
            max_threads: None,
            deadline_secs: None,
        }
    }
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn thread_delay(&self) -> Duration {
        Duration::from_millis(self.thread_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one JSON file per thread
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Optional path of the markdown traversal summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}
