//! A priority queue of pending infection attempts sorted by time
//!
//! Defines an `AttemptQueue` that stores [`InfectionAttempt`]s ordered by
//! `f64` time. The queue has methods for adding attempts, retrieving the
//! earliest attempt, and cancelling every attempt aimed at a given target.
//! Adding an attempt is *O*(log(*n*)); retrieval is amortized *O*(1);
//! cancellation is an indexed bulk-removal rather than a scan of the queue.
//!
//! The propagation engine drains this queue to run one epidemic: an empty
//! queue is the termination signal, not an error.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// A pending, time-stamped attempt by one infected person (`source`) to
/// infect a specific neighbor (`target`). Indices address the population
/// array shared with the adjacency relation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfectionAttempt {
    pub source: usize,
    pub target: usize,
    pub time: f64,
}

/// A priority queue of [`InfectionAttempt`]s ordered by time.
///
/// If two attempts are scheduled for the same time then the attempt that was
/// pushed first is placed earlier. The time and a monotonically increasing
/// id are stored in a binary heap of `Entry` objects; the attempt payload is
/// stored in a hash map by id, alongside a satellite index from target to
/// pending ids. Cancellation removes payloads from the hash map and leaves
/// the heap entries behind to be skipped when popped, so the relative order
/// of surviving attempts is untouched.
pub struct AttemptQueue {
    queue: BinaryHeap<Entry>,
    attempts: HashMap<u64, InfectionAttempt>,
    by_target: HashMap<usize, Vec<u64>>,
    attempt_counter: u64,
}

impl AttemptQueue {
    /// Create a new empty `AttemptQueue`
    #[must_use]
    pub fn new() -> AttemptQueue {
        AttemptQueue {
            queue: BinaryHeap::new(),
            attempts: HashMap::new(),
            by_target: HashMap::new(),
            attempt_counter: 0,
        }
    }

    /// Add an attempt by `source` on `target` at the specified absolute time
    pub fn push(&mut self, source: usize, target: usize, time: f64) {
        // Add attempt to queue, store payload, index by target, bump counter
        let id = self.attempt_counter;
        self.queue.push(Entry { time, id });
        self.attempts
            .insert(id, InfectionAttempt { source, target, time });
        self.by_target.entry(target).or_default().push(id);
        self.attempt_counter += 1;
    }

    /// Remove and return the earliest pending attempt
    ///
    /// Returns `None` when no attempts remain, which signals the end of a
    /// propagation run.
    pub fn pop_earliest(&mut self) -> Option<InfectionAttempt> {
        loop {
            // Pop from queue until we find an entry with a payload or the
            // queue is empty. Entries without payloads were cancelled.
            match self.queue.pop() {
                Some(entry) => {
                    if let Some(attempt) = self.attempts.remove(&entry.id) {
                        return Some(attempt);
                    }
                }
                None => {
                    return None;
                }
            }
        }
    }

    /// Cancel every pending attempt whose target is `target`, in a single
    /// pass over that target's handle list. Returns the number cancelled.
    ///
    /// Called when `target` has just been infected: all competing attempts on
    /// them are moot.
    pub fn cancel_targeting(&mut self, target: usize) -> usize {
        match self.by_target.remove(&target) {
            // Handles whose payload is already gone were popped earlier.
            Some(ids) => ids
                .into_iter()
                .filter(|id| self.attempts.remove(id).is_some())
                .count(),
            None => 0,
        }
    }

    /// The number of pending (uncancelled) attempts
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

impl Default for AttemptQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// A time and id object used to order attempts in the `AttemptQueue`
///
/// `Entry` objects are sorted in increasing order of time and then id
#[derive(PartialEq, Debug)]
struct Entry {
    time: f64,
    id: u64,
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Entry objects are ordered in increasing order by time and then id, so the
/// maximum of the (max-)heap is the earliest attempt
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        let time_ordering = self.time.partial_cmp(&other.time).unwrap().reverse();
        match time_ordering {
            // Break time ties in push order
            Ordering::Equal => self.id.cmp(&other.id).reverse(),
            _ => time_ordering,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::AttemptQueue;

    #[test]
    fn empty_queue() {
        let mut queue = AttemptQueue::new();
        assert!(queue.is_empty());
        assert!(queue.pop_earliest().is_none());
    }

    #[test]
    fn pops_in_time_order() {
        let mut queue = AttemptQueue::new();
        queue.push(0, 1, 1.0);
        queue.push(0, 3, 3.0);
        queue.push(0, 2, 2.0);
        assert_eq!(queue.len(), 3);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.time, 1.0);
        assert_eq!(attempt.target, 1);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.time, 2.0);
        assert_eq!(attempt.target, 2);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.time, 3.0);
        assert_eq!(attempt.target, 3);

        assert!(queue.pop_earliest().is_none());
    }

    #[test]
    fn same_time_pops_in_push_order() {
        let mut queue = AttemptQueue::new();
        queue.push(0, 1, 1.0);
        queue.push(2, 3, 1.0);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.source, 0);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.source, 2);

        assert!(queue.pop_earliest().is_none());
    }

    #[test]
    fn push_after_pop() {
        let mut queue = AttemptQueue::new();
        queue.push(0, 1, 1.0);
        queue.push(0, 2, 2.0);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.time, 1.0);

        queue.push(1, 3, 1.5);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.time, 1.5);
        assert_eq!(attempt.target, 3);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.time, 2.0);
    }

    #[test]
    fn cancel_targeting_removes_all_attempts_on_target() {
        let mut queue = AttemptQueue::new();
        queue.push(0, 9, 1.0);
        queue.push(1, 9, 2.0);
        queue.push(2, 5, 3.0);
        queue.push(3, 9, 4.0);

        assert_eq!(queue.cancel_targeting(9), 3);
        assert_eq!(queue.len(), 1);

        // No further pop ever returns an attempt on the cancelled target.
        while let Some(attempt) = queue.pop_earliest() {
            assert_ne!(attempt.target, 9);
        }
    }

    #[test]
    fn cancel_targeting_preserves_order_of_survivors() {
        let mut queue = AttemptQueue::new();
        queue.push(0, 1, 5.0);
        queue.push(0, 2, 3.0);
        queue.push(0, 1, 1.0);
        queue.push(0, 3, 4.0);

        queue.cancel_targeting(1);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.target, 2);
        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.target, 3);
        assert!(queue.pop_earliest().is_none());
    }

    #[test]
    fn cancel_unknown_target_is_a_no_op() {
        let mut queue = AttemptQueue::new();
        queue.push(0, 1, 1.0);
        assert_eq!(queue.cancel_targeting(7), 0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn cancel_after_pop_does_not_count_the_popped_attempt() {
        let mut queue = AttemptQueue::new();
        queue.push(0, 1, 1.0);
        queue.push(2, 1, 2.0);

        let attempt = queue.pop_earliest().unwrap();
        assert_eq!(attempt.time, 1.0);

        // Only the still-pending attempt on the target is cancelled.
        assert_eq!(queue.cancel_targeting(1), 1);
        assert!(queue.is_empty());
    }
}
