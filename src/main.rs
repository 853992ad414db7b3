//! Thread-Trail main entry point
//!
//! This is the command-line interface for the Thread-Trail topic reconstructor.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thread_trail::config::{load_config_with_hash, validate_start_url, Config};
use thread_trail::crawler::{Assembler, CancelToken, Topic, Traverser};
use thread_trail::output::{
    generate_markdown_summary, print_summary, write_thread_dumps, TraversalSummary,
};
use thread_trail::source::{HttpPageSource, PageSource};
use thread_trail::url::thread_base;
use tracing_subscriber::EnvFilter;

/// Thread-Trail: A polite forum topic reconstructor
///
/// Thread-Trail follows the prev/next links between the threads of a forum
/// topic, fetches every page of every thread, and writes each thread as one
/// merged comment sequence with replies resolved.
#[derive(Parser, Debug)]
#[command(name = "thread-trail")]
#[command(version)]
#[command(about = "A polite forum topic reconstructor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Thread to start from, overriding topic.start-url
    #[arg(long, env = "BASE_URL")]
    start_url: Option<String>,

    /// Directory for thread dumps, overriding output.output-dir
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Fetch and print a single page of the start thread and exit
    #[arg(long, value_name = "N", conflicts_with_all = ["thread_only", "dry_run"])]
    page: Option<u32>,

    /// Assemble only the start thread
    #[arg(long, conflicts_with_all = ["page", "dry_run"])]
    thread_only: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, conflicts_with_all = ["page", "thread_only"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Some(start_url) = &cli.start_url {
        validate_start_url(start_url)?;
        config.topic.start_url = start_url.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.output_dir = dir.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    let cancel = CancelToken::new();
    install_cancellation(&cancel, &config);

    let source = Arc::new(HttpPageSource::from_config(
        &config.user_agent,
        &config.crawler,
    )?);

    if let Some(page) = cli.page {
        handle_page(source.as_ref(), &config, page).await
    } else if cli.thread_only {
        handle_thread(source, &config, cancel).await
    } else {
        handle_traversal(source, &config, cancel).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("thread_trail=info,warn"),
            1 => EnvFilter::new("thread_trail=debug,info"),
            2 => EnvFilter::new("thread_trail=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels `cancel` on Ctrl-C or when the configured deadline passes
fn install_cancellation(cancel: &CancelToken, config: &Config) {
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling outstanding requests");
            on_signal.cancel();
        }
    });

    if let Some(deadline) = config.crawler.deadline() {
        tracing::info!("Traversal deadline: {:?}", deadline);
        let _timer = cancel.cancel_after(deadline);
    }
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Thread-Trail Dry Run ===\n");

    println!("Topic:");
    println!("  Start URL: {}", config.topic.start_url);
    println!("  Thread address: {}", thread_base(&config.topic.start_url)?);

    let crawler = &config.crawler;
    println!("\nCrawler Configuration:");
    println!("  Max pages per thread: {}", crawler.max_pages_per_thread);
    println!("  Page delay: {}ms", crawler.page_delay_ms);
    println!("  Thread delay: {}ms", crawler.thread_delay_ms);
    println!(
        "  Retries: {} (every {}ms)",
        crawler.max_retries, crawler.retry_delay_ms
    );
    println!("  Request timeout: {}s", crawler.request_timeout_secs);
    match crawler.max_threads {
        Some(limit) => println!("  Max threads: {}", limit),
        None => println!("  Max threads: unlimited"),
    }
    match crawler.deadline_secs {
        Some(secs) => println!("  Deadline: {}s", secs),
        None => println!("  Deadline: none"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Thread dumps: {}", config.output.output_dir);
    if let Some(path) = &config.output.summary_path {
        println!("  Summary: {}", path);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --page mode: prints one parsed page as JSON
async fn handle_page(source: &HttpPageSource, config: &Config, page: u32) -> anyhow::Result<()> {
    let base = thread_base(&config.topic.start_url)?;
    let parsed = source.fetch_page(&base, page).await?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

/// Handles the --thread-only mode: assembles and writes the start thread
async fn handle_thread(
    source: Arc<HttpPageSource>,
    config: &Config,
    cancel: CancelToken,
) -> anyhow::Result<()> {
    let base = thread_base(&config.topic.start_url)?;
    let assembler = Assembler::from_config(source, &config.crawler).with_cancel(cancel);

    let thread = assembler.assemble(0, &base).await?;
    tracing::info!("Assembled {} comments from {}", thread.contents.len(), base);

    finish(
        config,
        Topic {
            threads: vec![thread],
            failures: Vec::new(),
        },
    )
}

/// Handles the main traversal
async fn handle_traversal(
    source: Arc<HttpPageSource>,
    config: &Config,
    cancel: CancelToken,
) -> anyhow::Result<()> {
    let traverser = Traverser::from_config(source, &config.crawler, cancel);

    let topic = match traverser.traverse(&config.topic.start_url).await {
        Ok(topic) => topic,
        Err(e) => {
            tracing::error!("Traversal failed: {}", e);
            return Err(e.into());
        }
    };

    finish(config, topic)
}

/// Writes thread dumps and the summary
fn finish(config: &Config, topic: Topic) -> anyhow::Result<()> {
    write_thread_dumps(Path::new(&config.output.output_dir), &topic.threads)?;

    let summary = TraversalSummary::from_topic(&config.topic.start_url, &topic);
    print_summary(&summary);

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&summary, Path::new(path))?;
        println!("✓ Summary exported to: {}", path);
    }

    if !topic.is_complete() {
        tracing::warn!("{} threads could not be assembled", topic.failures.len());
    }
    Ok(())
}
