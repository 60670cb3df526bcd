// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the Cli struct below *is* the interface, and
// clap generates the parser, --help and --version from it.
//
// Rust concepts:
// - Derive macros: Automatically generate code for our types
// - ValueEnum: lets clap parse "prefix"/"contains" straight into an enum
// =============================================================================

use clap::Parser;
use std::time::Duration;

use crate::crawl::{CrawlConfig, ExtractOptions, FetchOptions, LinkPattern, MalformedPolicy, ScopePolicy};

#[derive(Parser, Debug)]
#[command(
    name = "sitecrawl",
    version,
    about = "Crawl a website and trace every page, link and asset it references",
    long_about = "sitecrawl fetches a seed page, pulls out every src=\"...\" and href=\"...\" reference, \
                  and keeps following the in-scope ones until there is nothing new left to visit."
)]
pub struct Cli {
    /// Seed URL to start from (e.g., https://example.com)
    pub seed: String,

    /// How a link is compared with the seed to decide if it is in scope
    ///
    /// prefix   = the link must start with the seed
    /// contains = the link must contain the seed anywhere (query strings too)
    #[arg(long, value_enum)]
    pub scope: ScopePolicy,

    /// Maximum number of pages fetched at the same time (0 = no limit)
    #[arg(long, env = "SITECRAWL_MAX_WORKERS", default_value_t = 50)]
    pub max_workers: usize,

    /// Stop scanning a page at its first malformed link instead of skipping it
    #[arg(long)]
    pub fail_fast_links: bool,

    /// Accept any non-quote character in attribute values (default rejects whitespace)
    #[arg(long)]
    pub loose_links: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "SITECRAWL_TIMEOUT", default_value_t = 10)]
    pub timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, env = "SITECRAWL_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Skip any link containing this text (repeatable)
    ///
    /// Example: --exclude /logout --exclude .pdf
    #[arg(long, value_name = "SUBSTR")]
    pub exclude: Vec<String>,

    /// Output one JSON object per crawled page instead of the text trace
    ///
    /// This replaces the plain-text trace with JSON lines; it is opt-in
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        let extract = ExtractOptions {
            pattern: if self.loose_links {
                LinkPattern::Loose
            } else {
                LinkPattern::Strict
            },
            on_malformed: if self.fail_fast_links {
                MalformedPolicy::Abort
            } else {
                MalformedPolicy::Skip
            },
        };

        let mut config = CrawlConfig::new(self.scope);
        config.extract = extract;
        config.max_workers = (self.max_workers > 0).then_some(self.max_workers);
        config
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
        }
    }
}
