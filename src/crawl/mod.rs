// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Submodules, leaves first:
// - filter:   scope predicates + the visited set
// - extract:  finds src="..."/href="..." references and resolves them
// - counter:  completion counter (how much work is outstanding)
// - frontier: queue of Locations waiting for a worker
// - fetch:    the Fetcher trait and its reqwest implementation
// - trace:    per-Task message batches and where they get printed
// - worker:   one Task: fetch, extract, filter, enqueue
// - engine:   Crawler, the dispatch loop and the run lifecycle
// =============================================================================

mod config;
mod counter;
mod engine;
mod error;
mod extract;
mod fetch;
mod filter;
mod frontier;
mod trace;
mod worker;

pub use config::{CrawlConfig, ExtractOptions, LinkPattern, MalformedPolicy, ScopePolicy};
pub use engine::{CrawlReport, Crawler};
pub use fetch::{FetchOptions, HttpFetcher};
pub use trace::{ConsoleSink, JsonLinesSink};
