// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, on stderr)
// 2. Parse command-line arguments using clap
// 3. Build the HTTP fetcher and the crawler, then run the crawl
// 4. Exit with proper code (0 = the crawl ran to the end, 2 = it could not
//    run at all)
//
// A page that fails to load is part of a normal crawl: it shows up in the
// trace and in the "failed" count of the summary log, not in the exit code.
//
// The crawl trace goes to stdout; logs go to stderr so the two never mix.
// =============================================================================

mod cli;           // src/cli.rs - command-line parsing
mod crawl;         // src/crawl/ - the crawl engine

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use crawl::{ConsoleSink, CrawlReport, Crawler, HttpFetcher, JsonLinesSink};

#[tokio::main]
async fn main() {
    init_tracing();

    let outcome = run().await;
    if let Err(e) = &outcome {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
    }

    std::process::exit(exit_code(&outcome));
}

// RUST_LOG overrides the default of "sitecrawl=info"
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitecrawl=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Maps the outcome of a run to the process exit code:
//   Ok  -> 0, however many pages failed along the way
//   Err -> 2, the crawl never got going (bad seed, broken HTTP client, ...)
fn exit_code(outcome: &Result<CrawlReport>) -> i32 {
    match outcome {
        Ok(_) => 0,
        Err(_) => 2,
    }
}

async fn run() -> Result<CrawlReport> {
    let cli = Cli::parse();

    let fetcher = HttpFetcher::new(&cli.fetch_options()).context("setting up HTTP client")?;
    let mut crawler = Crawler::new(cli.crawl_config(), fetcher);

    // Every --exclude adds one more predicate after the scope check
    for pattern in cli.exclude.iter().cloned() {
        crawler = crawler.with_predicate(move |location| !location.contains(&pattern));
    }

    let report = if cli.json {
        crawler.run(&cli.seed, JsonLinesSink).await
    } else {
        crawler.run(&cli.seed, ConsoleSink).await
    }
    .with_context(|| format!("crawling {}", cli.seed))?;

    tracing::info!(
        pages = report.pages,
        failed = report.failed,
        "done crawling {}",
        report.seed
    );
    tracing::debug!(crawled = ?report.crawled, "pages crawled");

    Ok(report)
}
