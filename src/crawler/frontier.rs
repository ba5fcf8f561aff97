//! Breadth-first crawl frontier
//!
//! The frontier owns the pending queue and the set of every URL ever
//! enqueued. Both are only touched through `Frontier`, which guarantees:
//! - a URL is enqueued at most once per run
//! - no more than `max_links` distinct URLs are ever enqueued
//! - links are dequeued in the order they were accepted

use crate::state::Link;
use std::collections::{HashSet, VecDeque};

/// FIFO queue of links plus the discovery set
#[derive(Debug)]
pub struct Frontier {
    /// Links waiting to be navigated
    queue: VecDeque<Link>,

    /// Every URL accepted so far (queued or already processed)
    seen: HashSet<String>,

    /// Discovery cap
    max_links: usize,
}

impl Frontier {
    /// Creates an empty frontier with the given discovery cap
    pub fn new(max_links: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            max_links,
        }
    }

    /// Enqueues seed URLs in order
    ///
    /// Duplicate seeds are enqueued once. Seeds beyond the cap are dropped
    /// with a warning (configuration validation normally prevents this).
    ///
    /// # Returns
    ///
    /// The number of seeds accepted
    pub fn seed<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.offer(urls.into_iter().map(|url| Link::seed(url)))
    }

    /// Offers newly discovered links
    ///
    /// Links whose URL was already accepted are ignored, the first writer
    /// wins. Acceptance stops as soon as the cap is reached.
    ///
    /// # Returns
    ///
    /// The number of links accepted
    pub fn offer<I>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = Link>,
    {
        let mut accepted = 0;

        for link in links {
            if self.is_full() {
                tracing::debug!(
                    "Discovery cap of {} reached, dropping {}",
                    self.max_links,
                    link.url()
                );
                break;
            }

            if self.seen.insert(link.url().to_string()) {
                self.queue.push_back(link);
                accepted += 1;
            }
        }

        accepted
    }

    /// Removes the next link to navigate
    pub fn dequeue(&mut self) -> Option<Link> {
        self.queue.pop_front()
    }

    /// Read-only view of the discovery set
    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn is_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns true once `max_links` distinct URLs have been accepted
    pub fn is_full(&self) -> bool {
        self.seen.len() >= self.max_links
    }

    pub fn max_links(&self) -> usize {
        self.max_links
    }
}
