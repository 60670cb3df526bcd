// src/crawl/trace.rs
// =============================================================================
// The crawl trace: what got visited, what was found, what went wrong.
//
// Each Task fills in its own MessageBatch and hands it over in one piece
// when it is done. The collector prints batches as they arrive, so lines
// from one Task always stay together, but the order *between* Tasks
// depends on which fetch finished first.
// =============================================================================

use serde::Serialize;
use std::io::Write;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// The ordered messages produced by a single Task.
#[derive(Debug, Clone, Serialize)]
pub struct MessageBatch {
    location: String,
    failed: bool,
    messages: Vec<String>,
}

impl MessageBatch {
    /// Starts a batch with the "Crawling page" line
    pub fn start(location: &str) -> Self {
        Self {
            location: location.to_string(),
            failed: false,
            messages: vec![format!("Crawling page: {location}")],
        }
    }

    pub fn discovered(&mut self, raw: &str) {
        let line = format!("\tDiscovered link {raw} on page {}", self.location);
        self.messages.push(line);
    }

    pub fn queued(&mut self, location: &str) {
        self.messages.push(format!("\t  Queued {location}"));
    }

    pub fn skipped(&mut self, location: &str) {
        self.messages
            .push(format!("\t  Skipped {location} (already visited or out of scope)"));
    }

    /// A fetch or body-read error: the page itself could not be crawled
    pub fn page_error(&mut self, error: impl std::fmt::Display) {
        self.failed = true;
        let line = format!("Error crawling {}: {error}", self.location);
        self.messages.push(line);
    }

    /// A problem with one reference on an otherwise readable page
    pub fn link_error(&mut self, raw: &str, error: impl std::fmt::Display) {
        let line = format!("\tError crawling {} on discovered link {raw}: {error}", self.location);
        self.messages.push(line);
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Where finished batches end up.
pub trait TraceSink: Send + 'static {
    fn emit(&mut self, batch: &MessageBatch);
}

/// Human-readable trace on stdout
pub struct ConsoleSink;

impl TraceSink for ConsoleSink {
    fn emit(&mut self, batch: &MessageBatch) {
        // Lock once so a batch is never split by another writer
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}\n", "=".repeat(55));
        for message in batch.messages() {
            let _ = writeln!(out, "{message}");
        }
    }
}

/// One JSON object per batch, one batch per line
pub struct JsonLinesSink;

impl TraceSink for JsonLinesSink {
    fn emit(&mut self, batch: &MessageBatch) {
        match serde_json::to_string(batch) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(error = %e, location = batch.location(), "failed to serialize batch"),
        }
    }
}

/// Totals gathered by the collector while draining the channel
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TraceTotals {
    pub pages: usize,
    pub failed: usize,
    /// Location of every batch received, in arrival order
    pub crawled: Vec<String>,
}

/// Spawns the collector. It runs until every sender of `batches` is gone.
pub fn spawn_collector<S: TraceSink>(
    mut batches: UnboundedReceiver<MessageBatch>,
    mut sink: S,
) -> JoinHandle<TraceTotals> {
    tokio::spawn(async move {
        let mut totals = TraceTotals::default();
        // recv() returns None once the dispatcher and every Task have
        // dropped their senders
        while let Some(batch) = batches.recv().await {
            totals.pages += 1;
            totals.crawled.push(batch.location().to_string());
            if batch.failed() {
                totals.failed += 1;
            }
            sink.emit(&batch);
        }
        totals
    })
}
