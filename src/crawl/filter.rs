// src/crawl/filter.rs
// =============================================================================
// The scope filter: decides whether a discovered Location gets queued.
//
// A Filter owns two things:
// 1. An ordered list of predicates (Location -> bool). They run left to
//    right and the first `false` wins.
// 2. The visited set - every Location already accepted for crawling.
//
// The visited set is the only mutable state shared between concurrently
// running Tasks, so it sits behind a reader/writer lock: many Tasks can
// ask "seen this?" at once, only one at a time can insert.
//
// Rust concepts:
// - Trait objects: Box<dyn Fn(&str) -> bool> lets us store any closure
// - RwLock: shared read access, exclusive write access
// =============================================================================

use parking_lot::RwLock;
use std::collections::HashSet;

/// A scope predicate. Send + Sync because Tasks on other threads call it.
pub type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
    visited: RwLock<HashSet<String>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate. Registration happens before crawling starts,
    /// hence `&mut self`.
    pub fn add_predicate<P>(&mut self, predicate: P)
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
    }

    /// True if every predicate accepts `location` and it hasn't been visited.
    ///
    /// A rejecting predicate returns early without touching the visited set.
    pub fn should_crawl(&self, location: &str) -> bool {
        if !self.predicates.iter().all(|predicate| predicate(location)) {
            return false;
        }
        !self.visited.read().contains(location)
    }

    /// Records `location` as visited.
    ///
    /// Returns true only for the caller that actually inserted it. Two Tasks
    /// can both see `should_crawl == true` for the same Location; whichever
    /// wins this insert is the one that queues it.
    pub fn mark_visited(&self, location: &str) -> bool {
        self.visited.write().insert(location.to_string())
    }

    /// Snapshot of the visited set, sorted so it is easy to compare
    #[cfg(test)]
    pub fn visited(&self) -> Vec<String> {
        let mut visited: Vec<String> = self.visited.read().iter().cloned().collect();
        visited.sort();
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_empty_filter_accepts_unvisited() {
        let filter = Filter::new();
        assert!(filter.should_crawl("http://ex.com"));
    }

    #[test]
    fn test_visited_location_is_rejected() {
        let filter = Filter::new();
        assert!(filter.mark_visited("http://ex.com/a"));
        assert!(!filter.should_crawl("http://ex.com/a"));
        assert!(filter.should_crawl("http://ex.com/b"));
    }

    #[test]
    fn test_mark_visited_only_once() {
        let filter = Filter::new();
        assert!(filter.mark_visited("http://ex.com"));
        assert!(!filter.mark_visited("http://ex.com"));
        assert_eq!(filter.visited(), vec!["http://ex.com".to_string()]);
    }

    #[test]
    fn test_predicates_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();

        let mut filter = Filter::new();
        filter.add_predicate(|loc| loc.starts_with("http://ex.com"));
        filter.add_predicate(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
            true
        });

        assert!(!filter.should_crawl("http://other.com"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(filter.should_crawl("http://ex.com/page"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_location_leaves_visited_set_alone() {
        let mut filter = Filter::new();
        filter.add_predicate(|_| false);
        assert!(!filter.should_crawl("http://ex.com"));
        assert!(filter.visited().is_empty());
    }

    #[test]
    fn test_concurrent_mark_visited_has_one_winner() {
        let filter = Filter::new();
        let winners = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    if filter.should_crawl("http://ex.com/x") && filter.mark_visited("http://ex.com/x") {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
