// src/crawl/engine.rs
// =============================================================================
// The crawl engine: wires the frontier, the workers and the trace together.
//
// How a run works:
// 1. Build a fresh Filter (scope predicate + any extra predicates)
// 2. Start the trace collector and the dispatch loop
// 3. Mark the seed (and its normalized spelling) visited and submit it
// 4. Wait for the completion counter to hit zero
// 5. Close the frontier, let the dispatcher and the collector wind down
//
// The dispatch loop pulls Locations off the queue and spawns one Task per
// Location. With a worker cap it first waits for a free permit, so a page
// full of links queues up instead of opening hundreds of connections.
// Submitting never blocks (the queue is unbounded), which means a Task
// holding a permit can always finish.
//
// Rust concepts:
// - Arc: shared ownership of the context across many tasks
// - Semaphore: a pool of N permits; a Task holds one while it runs
// - Generics: Crawler<F> works with any Fetcher
// =============================================================================

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use url::Url;

use super::config::CrawlConfig;
use super::error::CrawlError;
use super::extract::LinkExtractor;
use super::fetch::Fetcher;
use super::filter::Filter;
use super::frontier::Frontier;
use super::trace::{spawn_collector, MessageBatch, TraceSink};
use super::worker;

type SharedPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// State shared by every Task of one run
pub struct CrawlContext<F> {
    pub(crate) fetcher: F,
    pub(crate) filter: Filter,
    pub(crate) frontier: Frontier,
    pub(crate) extractor: LinkExtractor,
}

/// What a finished run looked like
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    /// Tasks that ran
    pub pages: usize,
    /// Tasks whose fetch or body read failed
    pub failed: usize,
    /// Location of every Task that ran, sorted
    pub crawled: Vec<String>,
}

pub struct Crawler<F: Fetcher> {
    config: CrawlConfig,
    fetcher: F,
    predicates: Vec<SharedPredicate>,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(config: CrawlConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            predicates: Vec::new(),
        }
    }

    /// Adds a scope predicate that runs after the seed predicate
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Crawls everything reachable from `seed` and returns once no work is
    /// left. Each call starts from an empty visited set.
    pub async fn run<S: TraceSink>(&self, seed: &str, sink: S) -> Result<CrawlReport, CrawlError> {
        // Only absolute seeds: relative ones have nothing to resolve against
        let seed_url = Url::parse(seed).map_err(|source| CrawlError::InvalidSeed {
            seed: seed.to_string(),
            source,
        })?;

        let extractor = LinkExtractor::new(self.config.extract)?;
        let (frontier, queue) = Frontier::new();
        let ctx = Arc::new(CrawlContext {
            fetcher: self.fetcher.clone(),
            filter: self.build_filter(seed),
            frontier,
            extractor,
        });

        tracing::info!(%seed, scope = ?self.config.scope, max_workers = ?self.config.max_workers, "starting crawl");

        let (trace_tx, trace_rx) = mpsc::unbounded_channel();
        let collector = spawn_collector(trace_rx, sink);
        let dispatcher = tokio::spawn(dispatch(
            ctx.clone(),
            queue,
            trace_tx,
            self.config.max_workers,
        ));

        // "http://ex.com" and "http://ex.com/" are the same page. Relative
        // links like href="/" resolve to the second spelling, so both count
        // as visited before the first Task starts
        ctx.filter.mark_visited(seed);
        if seed_url.as_str() != seed {
            ctx.filter.mark_visited(seed_url.as_str());
        }
        ctx.frontier.submit(seed.to_string())?;

        // Zero outstanding work means no Task is running and the queue is
        // empty, so nobody can submit anything any more
        ctx.frontier.wait_idle().await;
        ctx.frontier.close();

        // The dispatcher owns the last trace sender; once it and every Task
        // are gone the collector sees the channel close and returns
        dispatcher.await?;
        let totals = collector.await?;

        let mut crawled = totals.crawled;
        crawled.sort();

        let report = CrawlReport {
            seed: seed.to_string(),
            pages: totals.pages,
            failed: totals.failed,
            crawled,
        };
        tracing::info!(pages = report.pages, failed = report.failed, "crawl finished");
        Ok(report)
    }

    fn build_filter(&self, seed: &str) -> Filter {
        let mut filter = Filter::new();

        let scope = self.config.scope;
        let seed = seed.to_string();
        filter.add_predicate(move |location| scope.accepts(&seed, location));

        for predicate in &self.predicates {
            let predicate = predicate.clone();
            filter.add_predicate(move |location| predicate(location));
        }
        filter
    }
}

// Pulls Locations off the queue until the frontier is closed and drained
async fn dispatch<F: Fetcher>(
    ctx: Arc<CrawlContext<F>>,
    mut queue: UnboundedReceiver<String>,
    trace: UnboundedSender<MessageBatch>,
    max_workers: Option<usize>,
) {
    // No cap (None or 0) means no semaphore at all
    let pool = max_workers
        .filter(|&n| n > 0)
        .map(|n| Arc::new(Semaphore::new(n)));

    // recv() waits while the queue is empty and returns None once the
    // frontier is closed and everything queued has been taken
    while let Some(location) = queue.recv().await {
        // With a cap, wait here until a running Task gives its permit back.
        // Locations keep piling up in the queue meanwhile.
        let permit = match &pool {
            Some(pool) => match pool.clone().acquire_owned().await {
                Ok(permit) => Some(permit),
                // Only happens if the semaphore is closed, which we never do
                Err(_) => break,
            },
            None => None,
        };

        tracing::debug!(%location, "dispatching");

        // Each Task gets its own handle on the shared context and its own
        // sender for the trace channel
        let ctx = ctx.clone();
        let trace = trace.clone();
        tokio::spawn(async move {
            // Held for the whole Task, released when the Task ends
            let _permit = permit;
            worker::crawl(ctx, location, trace).await;
        });
    }
}
