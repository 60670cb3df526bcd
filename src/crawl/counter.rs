// src/crawl/counter.rs
// =============================================================================
// The completion counter: how much crawl work is still outstanding.
//
// Every submitted Location counts as one unit from the moment it is
// submitted until its Task finishes. The crawl is over exactly when the
// count drops back to zero.
//
// Rust concepts:
// - AtomicUsize: a number many threads can change without a lock
// - Notify: lets an async task sleep until someone wakes it up
// - Drop: code that runs automatically when a value goes out of scope
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct WorkCounter {
    pending: AtomicUsize,
    zero: Notify,
}

impl WorkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks one unit of work finished, waking waiters if it was the last.
    pub fn done(&self) {
        let previous = self.pending.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "WorkCounter::done called more often than increment");
        if previous == 1 {
            self.zero.notify_waiters();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Waits until the count is zero. Returns immediately if it already is.
    pub async fn wait_zero(&self) {
        loop {
            let notified = self.zero.notified();
            tokio::pin!(notified);
            // Register before checking so a done() in between isn't missed
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Calls `done()` on the counter when dropped, so a Task releases its unit
/// of work however it ends.
pub struct WorkGuard {
    counter: Arc<WorkCounter>,
}

impl WorkGuard {
    pub fn new(counter: Arc<WorkCounter>) -> Self {
        Self { counter }
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.counter.done();
    }
}
