// src/crawl/worker.rs
// =============================================================================
// The crawl worker: everything one Task does for one Location.
//
// Steps (any failure jumps straight to the last one):
// 1. Start a MessageBatch with "Crawling page: <location>"
// 2. Fetch the page (transport error -> message, stop)
// 3. Read the body (read error -> message, stop)
// 4. Extract references; queue each in-scope, unvisited one
// 5. Hand the batch to the collector and release the unit of work
//
// Nothing is retried. A broken page ends its own Task and nothing else.
// =============================================================================

use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

use super::counter::WorkGuard;
use super::engine::CrawlContext;
use super::extract::Reference;
use super::fetch::Fetcher;
use super::trace::MessageBatch;

/// Runs one Task to completion.
pub async fn crawl<F: Fetcher>(
    ctx: Arc<CrawlContext<F>>,
    location: String,
    trace: UnboundedSender<MessageBatch>,
) {
    // Declared first so it drops last: the batch is handed over before the
    // counter goes down
    let _guard = WorkGuard::new(ctx.frontier.counter());

    let batch = visit(&ctx, &location).await;

    if trace.send(batch).is_err() {
        tracing::warn!(%location, "trace collector is gone, dropping batch");
    }
}

// Steps 1-4. Always returns a batch, even when the page couldn't be read
async fn visit<F: Fetcher>(ctx: &CrawlContext<F>, location: &str) -> MessageBatch {
    // Step 1: every batch opens with "Crawling page: ..."
    let mut batch = MessageBatch::start(location);

    // Steps 2 + 3: download the page and read the body as text.
    // Either failure ends this Task (and only this Task)
    let body = match ctx.fetcher.fetch(location).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(%location, error = %e, "fetch failed");
            batch.page_error(e);
            return batch;
        }
    };

    // Relative links on this page are resolved against its own URL
    let base = match Url::parse(location) {
        Ok(base) => base,
        Err(e) => {
            batch.page_error(e);
            return batch;
        }
    };

    // Step 4: walk the references in the order they appear in the markup
    for reference in ctx.extractor.extract(&base, &body) {
        match reference {
            Reference::Resolved { raw, location: target } => {
                // Report the link as written, then decide what to do with it
                batch.discovered(&raw);
                enqueue(ctx, &raw, target, &mut batch);
            }
            Reference::Malformed { raw, error } => {
                // With MalformedPolicy::Abort this is the last item we get
                tracing::debug!(page = %location, %raw, %error, "malformed reference");
                batch.link_error(&raw, error);
            }
        }
    }

    batch
}

// should_crawl + mark_visited act as one gate: only the Task whose insert
// succeeds goes on to submit
fn enqueue<F: Fetcher>(ctx: &CrawlContext<F>, raw: &str, target: String, batch: &mut MessageBatch) {
    // Out of scope, already visited, or another Task beat us to the insert
    if !(ctx.filter.should_crawl(&target) && ctx.filter.mark_visited(&target)) {
        batch.skipped(&target);
        return;
    }

    // submit() counts the work before queueing it, so the crawl can't end
    // while this Location is on its way into the queue
    match ctx.frontier.submit(target.clone()) {
        Ok(()) => batch.queued(&target),
        Err(e) => batch.link_error(raw, e),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why does crawl() take Arc<CrawlContext> but visit() takes &CrawlContext?
//    - crawl() runs inside tokio::spawn, which needs owned ('static) data
//    - visit() is only called from crawl(), so borrowing from the Arc is enough
//
// 2. Why return the batch instead of sending it from visit()?
//    - Every early return (fetch error, bad base URL) still hands back a
//      batch, so crawl() has exactly one place where it gets sent
//
// 3. What does `let _guard = ...` do?
//    - The guard lives until the end of crawl() and runs done() in its Drop
//    - Naming it `_guard` (not `_`) matters: `let _ = ...` drops immediately
// -----------------------------------------------------------------------------
