//! News-Harvest main entry point
//!
//! This is the command-line interface for the News-Harvest index crawler.
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use news_harvest::config::{load_or_default, Config, MAX_DELAY_MS};
use news_harvest::crawler::{Coordinator, ListOptions, PageCap};
use news_harvest::output::{write_json, ArticlesResponse, ErrorResponse, LinksResponse};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// News-Harvest: a pagination-aware news index crawler
///
/// News-Harvest walks a news site's index pages, collects canonical article
/// links in site order, and extracts structured article records.
#[derive(Parser, Debug)]
#[command(name = "news-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A pagination-aware news index crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List canonical article links from the news index
    Links {
        #[command(flatten)]
        crawl: CrawlArgs,

        /// Stop once this many links have been collected
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Crawl the index and parse a slice of the articles found
    Articles {
        #[command(flatten)]
        crawl: CrawlArgs,

        /// Number of leading links to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of articles to fetch
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fetch and parse a single article
    Article {
        /// Article URL
        url: String,
    },
}

/// Index traversal options shared by `links` and `articles`
#[derive(Args, Debug)]
struct CrawlArgs {
    /// First index page (defaults to the configured news section)
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Maximum index pages to visit
    #[arg(long, conflicts_with = "all_pages")]
    max_pages: Option<u32>,

    /// Follow next-page links until they run out
    #[arg(long)]
    all_pages: bool,

    /// Pause between requests in milliseconds (at most 60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_DELAY_MS))]
    delay_ms: Option<u64>,
}

impl CrawlArgs {
    fn start_url(&self, config: &Config) -> String {
        self.start_url
            .clone()
            .unwrap_or_else(|| config.site.start_url())
    }

    fn page_cap(&self, config: &Config) -> PageCap {
        if self.all_pages {
            return PageCap::Unbounded;
        }
        match self.max_pages {
            Some(max) => PageCap::from(Some(max)),
            None => config.crawler.page_cap(),
        }
    }

    fn delay(&self, config: &Config) -> Duration {
        self.delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.crawler.delay())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            let response = ErrorResponse::new(format!("{:#}", e));
            if let Err(io) = write_json(std::io::stdout().lock(), &response) {
                tracing::error!("Failed to write error response: {}", io);
            }
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_harvest=info,warn"),
            1 => EnvFilter::new("news_harvest=debug,info"),
            2 => EnvFilter::new("news_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, hash) =
        load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    match (&cli.config, hash) {
        (Some(path), Some(hash)) => {
            tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash)
        }
        _ => tracing::info!("Using built-in configuration for {}", config.site.base_url),
    }

    match cli.command {
        Command::Links { crawl, limit } => handle_links(config, &crawl, limit).await,
        Command::Articles {
            crawl,
            offset,
            limit,
        } => handle_articles(config, &crawl, offset, limit).await,
        Command::Article { url } => handle_article(config, &url).await,
    }
}

/// Handles the `links` command
async fn handle_links(config: Config, args: &CrawlArgs, limit: Option<usize>) -> anyhow::Result<()> {
    let start_url = args.start_url(&config);
    let options = ListOptions::new(args.page_cap(&config), args.delay(&config)).with_max_links(limit);

    tracing::info!("Listing links from {} ({:?})", start_url, options.page_cap);
    let coordinator = Coordinator::new(config)?;
    let links = coordinator
        .list_links_with(&start_url, &options)
        .await
        .with_context(|| format!("Failed to list links from {}", start_url))?;

    write_json(std::io::stdout().lock(), &LinksResponse::new(links))?;
    Ok(())
}

/// Handles the `articles` command
async fn handle_articles(
    config: Config,
    args: &CrawlArgs,
    offset: usize,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let start_url = args.start_url(&config);
    let page_cap = args.page_cap(&config);
    let delay = args.delay(&config);

    let coordinator = Coordinator::new(config)?;
    let outcome = coordinator
        .crawl_articles(&start_url, page_cap, offset, limit, delay)
        .await
        .context("Article crawl failed")?;

    tracing::info!(
        "Parsed {} article(s) of {} candidate(s)",
        outcome.articles.len(),
        outcome.total_candidates
    );
    write_json(std::io::stdout().lock(), &ArticlesResponse::new(outcome, offset))?;
    Ok(())
}

/// Handles the `article` command
async fn handle_article(config: Config, url: &str) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config)?;
    let article = coordinator
        .fetch_and_parse(url)
        .await
        .with_context(|| format!("Failed to fetch article {}", url))?;

    write_json(std::io::stdout().lock(), &article)?;
    Ok(())
}
