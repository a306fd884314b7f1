//! Blocking single-producer, multi-consumer (SPMC) shared log.
//!
//! This module provides an append-only, ordered container that one writer
//! fills and any number of readers follow. Unlike a queue, entries are never
//! removed: each reader keeps its own cursor and decides for itself how far
//! it has read.
//!
//! # Design
//! - **Writer**: Holds exclusive access while appending; publishes the new
//!   length and wakes every waiting reader after each append.
//! - **Readers**: Take shared access for reads, so they never block each
//!   other. A reader that is caught up parks in [`SharedLog::wait_past`]
//!   until the log grows past its cursor or production is marked finished.
//!
//! # Synchronization
//!
//! Two primitives cooperate:
//! - An `RwLock<Vec<T>>` guards the entries themselves (reader/writer
//!   exclusion, reader/reader concurrency).
//! - A `Mutex<RunState>` plus a `Condvar` carry the signaling state: the
//!   published entry count and the finished flag. Both growth and finish are
//!   published under this one mutex, so a waiter can never miss either event.
//!
//! Waiting never holds the entry lock; the writer is never delayed by a
//! parked reader.

use std::sync::{Condvar, Mutex, RwLock};

/// Signaling state observed at the moment a waiter woke up.
///
/// Returned by [`SharedLog::wait_past`] so the caller can tell which of the
/// two wake conditions held (both may hold at once).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    /// Number of entries published at the time of the wakeup.
    pub published: usize,
    /// Whether production has been marked finished.
    pub finished: bool,
}

/// Run-wide signaling state, guarded by the log's signal mutex.
///
/// `published` is monotonically non-decreasing while the run is active;
/// `finished` transitions false -> true exactly once and never back.
#[derive(Debug, Default)]
struct RunState {
    published: usize,
    finished: bool,
}

/// An append-only ordered log shared between one writer and many readers.
///
/// The single-producer guarantee is a usage contract, not a type-level one:
/// `append` takes `&self` so the log can sit behind an `Arc`, but exactly
/// one thread is expected to call it.
#[derive(Debug)]
pub struct SharedLog<T> {
    /// Entry storage. Writer-exclusive for `append`, reader-shared for all
    /// length/content reads.
    entries: RwLock<Vec<T>>,
    /// Signaling state published alongside every append and on finish.
    state: Mutex<RunState>,
    /// Woken (all waiters) on every append and on finish.
    grew: Condvar,
}

impl<T> Default for SharedLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedLog<T> {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            state: Mutex::new(RunState::default()),
            grew: Condvar::new(),
        }
    }

    /// Appends one entry and wakes every waiting reader.
    ///
    /// The entry is pushed under the write side of the entry lock, then the
    /// new length is published under the signal mutex, then all waiters are
    /// notified. One notification per append; appends are never batched.
    pub fn append(&self, item: T) {
        let published = {
            let mut entries = self.entries.write().unwrap();
            entries.push(item);
            entries.len()
        };
        {
            let mut state = self.state.lock().unwrap();
            debug_assert!(!state.finished, "append after mark_finished");
            state.published = published;
        }
        self.grew.notify_all();
    }

    /// Current entry count, read under shared access.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the log holds no entries yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Entry at `index`, read under shared access. `None` past the end.
    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.entries.read().unwrap().get(index).cloned()
    }

    /// Returns `(len, last entry)` read under a single shared guard.
    ///
    /// The pair is snapshot-consistent: the returned entry really was the
    /// newest one at the moment the length was read. `None` on an empty log.
    pub fn snapshot_latest(&self) -> Option<(usize, T)>
    where
        T: Clone,
    {
        let entries = self.entries.read().unwrap();
        entries.last().map(|item| (entries.len(), item.clone()))
    }

    /// Clones the full contents, read under a single shared guard.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries.read().unwrap().clone()
    }

    /// Consumes the log and returns its entries without cloning.
    pub fn into_entries(self) -> Vec<T> {
        self.entries.into_inner().unwrap()
    }

    /// Blocks until the log has grown past `seen` entries or production has
    /// finished, whichever comes first.
    ///
    /// The signal mutex is released while the thread is parked and the
    /// predicate is re-checked on every wakeup, so spurious wakeups are
    /// harmless. The returned [`Wake`] reports the state that ended the
    /// wait; `published` may lag the entry count by the one append currently
    /// in flight, never lead it.
    pub fn wait_past(&self, seen: usize) -> Wake {
        let mut state = self.state.lock().unwrap();
        while state.published <= seen && !state.finished {
            state = self.grew.wait(state).unwrap();
        }
        Wake {
            published: state.published,
            finished: state.finished,
        }
    }

    /// Marks production finished and wakes every waiting reader.
    ///
    /// Set under the same mutex that publishes growth, so a reader already
    /// parked in [`wait_past`](Self::wait_past) is guaranteed to observe it.
    /// Idempotent; the flag never reverts.
    pub fn mark_finished(&self) {
        let mut state = self.state.lock().unwrap();
        state.finished = true;
        drop(state);
        self.grew.notify_all();
    }

    /// Whether production has been marked finished.
    pub fn is_finished(&self) -> bool {
        self.state.lock().unwrap().finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn append_grows_the_log_in_order() {
        let log = SharedLog::new();
        assert!(log.is_empty());

        log.append("a");
        log.append("b");
        log.append("c");

        assert_eq!(log.len(), 3);
        assert_eq!(log.snapshot(), vec!["a", "b", "c"]);
        assert_eq!(log.get(1), Some("b"));
        assert_eq!(log.get(3), None);
    }

    #[test]
    fn snapshot_latest_pairs_length_with_newest_entry() {
        let log = SharedLog::new();
        assert_eq!(log.snapshot_latest(), None);

        log.append(10u32);
        assert_eq!(log.snapshot_latest(), Some((1, 10)));

        log.append(20);
        assert_eq!(log.snapshot_latest(), Some((2, 20)));
    }

    #[test]
    fn wait_past_returns_without_blocking_when_growth_already_visible() {
        let log = SharedLog::new();
        log.append(1u8);

        let wake = log.wait_past(0);
        assert_eq!(wake.published, 1);
        assert!(!wake.finished);
    }

    #[test]
    fn wait_past_wakes_on_append_from_another_thread() {
        let log = Arc::new(SharedLog::new());

        let writer = {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                // Give the waiter a moment to park first.
                thread::sleep(Duration::from_millis(20));
                log.append(7u32);
            })
        };

        let wake = log.wait_past(0);
        assert!(wake.published >= 1);
        writer.join().unwrap();
    }

    /// A waiter already parked when `mark_finished` fires must still wake
    /// and observe the finished flag (no missed-wakeup).
    #[test]
    fn finish_wakes_an_already_blocked_waiter() {
        let log = Arc::new(SharedLog::<u32>::new());
        let (tx, rx) = mpsc::channel();

        let waiter = {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                let wake = log.wait_past(0);
                tx.send(wake).unwrap();
            })
        };

        // Let the waiter park, then finish with no growth at all.
        thread::sleep(Duration::from_millis(20));
        log.mark_finished();

        let wake = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("waiter never woke after mark_finished");
        assert!(wake.finished);
        assert_eq!(wake.published, 0);
        waiter.join().unwrap();
    }

    #[test]
    fn mark_finished_is_idempotent_and_visible() {
        let log = SharedLog::<u8>::new();
        assert!(!log.is_finished());

        log.mark_finished();
        log.mark_finished();
        assert!(log.is_finished());

        let wake = log.wait_past(usize::MAX - 1);
        assert!(wake.finished);
    }

    /// Concurrent writer/reader consistency: entry `i` is appended at
    /// position `i`, so every snapshot must satisfy `item == len - 1`. A
    /// torn read of the (length, latest) pair would break the equality.
    #[test]
    fn snapshots_stay_consistent_under_a_live_writer() {
        const TOTAL: usize = 10_000;

        let log = Arc::new(SharedLog::new());
        let writer = {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for i in 0..TOTAL {
                    log.append(i);
                }
                log.mark_finished();
            })
        };

        let mut seen = 0usize;
        loop {
            let wake = log.wait_past(seen);
            if wake.published > seen {
                let (len, item) = log.snapshot_latest().expect("growth implies an entry");
                assert_eq!(item, len - 1, "length and latest entry out of sync");
                seen = len;
            } else if wake.finished {
                break;
            }
        }

        writer.join().unwrap();
        assert_eq!(log.len(), TOTAL);
    }
}
