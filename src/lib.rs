//! Thread-Trail: a polite forum topic reconstructor
//!
//! This crate walks a chain of paginated forum threads linked by prev/next
//! pointers, fetches every page of every thread, and reassembles each thread
//! into a single deduplicated comment sequence with replies resolved.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod source;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Thread-Trail operations
#[derive(Debug, Error)]
pub enum TrailError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("Pages of {address} disagree on the thread head: {heads:?}")]
    InconsistentHead {
        address: String,
        heads: Vec<model::PageHead>,
    },

    #[error("All {attempted} page fetches failed for {address}: {last_error}")]
    AllPagesFailed {
        address: String,
        attempted: u32,
        last_error: String,
    },

    #[error("No comments found on any page of {address}")]
    EmptyThread { address: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::BranchState,
        to: state::BranchState,
    },

    #[error("Not a thread address: {0}")]
    InvalidAddress(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrailError {
    /// Returns true if retrying the same request may succeed
    ///
    /// Timeouts, connection failures, HTTP 429 and 5xx responses are
    /// transient. Everything else (404, malformed markup, structural
    /// disagreement) will fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Thread-Trail operations
pub type Result<T> = std::result::Result<T, TrailError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Assembler, Topic, Traverser};
pub use model::{Comment, CommentRef, Page, PageHead, Thread};
pub use source::{HttpPageSource, PageSource};
pub use state::BranchState;
