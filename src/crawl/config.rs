// src/crawl/config.rs
// =============================================================================
// Plain-data configuration for one crawl.
//
// The CLI (src/cli.rs) builds a CrawlConfig; the engine only ever reads it.
// Everything here is Clone so a Crawler can start as many runs as it likes
// from the same settings.
// =============================================================================

use clap::ValueEnum;

/// How the default scope predicate compares a Location with the seed.
///
/// The two behave very differently: `Contains` also accepts URLs on other
/// hosts that merely mention the seed somewhere (e.g. in a query string),
/// so there is no default: the caller picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopePolicy {
    /// Location must start with the seed string
    Prefix,
    /// Location must contain the seed string anywhere
    Contains,
}

impl ScopePolicy {
    /// Applies the policy to one candidate Location
    pub fn accepts(self, seed: &str, location: &str) -> bool {
        match self {
            ScopePolicy::Prefix => location.starts_with(seed),
            ScopePolicy::Contains => location.contains(seed),
        }
    }
}

/// Which characters an attribute value may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPattern {
    /// No quotes and no whitespace inside the value
    #[default]
    Strict,
    /// Anything except a quote
    Loose,
}

/// What the extractor does when a reference fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Report the bad reference and keep going with the rest of the page
    #[default]
    Skip,
    /// Report the bad reference and stop scanning the page
    Abort,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub pattern: LinkPattern,
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub scope: ScopePolicy,
    pub extract: ExtractOptions,
    /// Upper bound on concurrently running Tasks; None = unbounded
    pub max_workers: Option<usize>,
}

impl CrawlConfig {
    pub fn new(scope: ScopePolicy) -> Self {
        Self {
            scope,
            extract: ExtractOptions::default(),
            max_workers: Some(50),
        }
    }
}
