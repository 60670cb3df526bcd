// src/crawl/error.rs
// =============================================================================
// Errors that stop a crawl from starting or a Location from being queued.
//
// Errors that happen *inside* a Task (a page that can't be fetched, a
// malformed link) never show up here - they are turned into trace messages
// by the worker and the crawl carries on.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    /// The seed could not be parsed as an absolute URL
    #[error("invalid seed '{seed}': {source}")]
    InvalidSeed {
        seed: String,
        #[source]
        source: url::ParseError,
    },

    /// A Location was submitted after the crawl shut the queue down
    #[error("frontier is closed, cannot queue {0}")]
    FrontierClosed(String),

    /// The link pattern failed to compile
    #[error("invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The HTTP client could not be built (bad TLS setup, bad user agent...)
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A background task (dispatcher or trace collector) panicked
    #[error("crawl task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
