//! Configuration module for Thread-Trail
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use thread_trail::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trail.toml")).unwrap();
//! println!("Starting at: {}", config.topic.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, TopicConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_text, load_config, load_config_with_hash, parse_config,
};
pub use validation::{validate, validate_start_url};
