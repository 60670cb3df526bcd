// src/crawl/frontier.rs
// =============================================================================
// The frontier: Locations waiting to be handed to a worker.
//
// It is an unbounded channel plus the completion counter. The order inside
// `submit` matters:
//
//   1. count the new unit of work
//   2. push the Location onto the queue
//
// If we pushed first, the counter could briefly read zero while the
// Location is still in flight, and the crawl would shut the queue down
// under our feet.
//
// Closing the frontier drops the one and only sender. The dispatch loop
// then sees `None` from `recv()` once the queue is drained and exits.
// =============================================================================

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::counter::WorkCounter;
use super::error::CrawlError;

pub struct Frontier {
    queue: Mutex<Option<UnboundedSender<String>>>,
    pending: Arc<WorkCounter>,
}

impl Frontier {
    /// Creates the frontier and the receiving end for the dispatch loop
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let frontier = Self {
            queue: Mutex::new(Some(tx)),
            pending: Arc::new(WorkCounter::new()),
        };
        (frontier, rx)
    }

    /// Queues a Location for crawling.
    pub fn submit(&self, location: String) -> Result<(), CrawlError> {
        self.pending.increment();

        let queue = self.queue.lock();
        let sent = match queue.as_ref() {
            Some(tx) => tx.send(location).map_err(|e| e.0),
            None => Err(location),
        };
        drop(queue);

        sent.map_err(|location| {
            // Nothing was queued, so give the unit of work back
            self.pending.done();
            CrawlError::FrontierClosed(location)
        })
    }

    /// Stops accepting new Locations
    pub fn close(&self) {
        self.queue.lock().take();
    }

    pub fn counter(&self) -> Arc<WorkCounter> {
        self.pending.clone()
    }

    /// Blocks until every submitted Location has been fully processed
    pub async fn wait_idle(&self) {
        self.pending.wait_zero().await;
    }
}
