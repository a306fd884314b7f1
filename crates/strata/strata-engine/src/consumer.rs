use std::fmt;
use std::sync::{Arc, Weak};

use strata_bus::SharedLog;

use crate::{EngineError, Worker};

/// The reading side of a run: follows the shared log from its own cursor and
/// reacts to the newest entry on every wakeup.
///
/// The cursor starts at the log length seen at construction time, so a
/// consumer attached mid-run follows the tail from there rather than
/// replaying earlier entries. Entries appended faster than the consumer
/// re-checks are skipped over: each wakeup reacts to the newest entry only.
#[derive(Debug)]
pub struct Consumer<T> {
    id: u32,
    cursor: usize,
    log: Arc<SharedLog<T>>,
    seen: Vec<T>,
}

impl<T> Consumer<T> {
    /// Builds a consumer from a non-owning log handle.
    ///
    /// # Errors
    /// [`EngineError::LogUnavailable`] if the handle no longer points at a
    /// live log. Nothing is waited on during the failure path.
    pub fn new(id: u32, log: Weak<SharedLog<T>>) -> Result<Self, EngineError> {
        let log = log.upgrade().ok_or(EngineError::LogUnavailable)?;
        let cursor = log.len();
        Ok(Self {
            id,
            cursor,
            log,
            seen: Vec::new(),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Log length this consumer has processed up to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Entries this consumer has reacted to, in observation order.
    pub fn observed(&self) -> &[T] {
        &self.seen
    }

    pub fn into_observed(self) -> Vec<T> {
        self.seen
    }
}

impl<T> Worker for Consumer<T>
where
    T: Clone + fmt::Debug + Send + Sync,
{
    /// Waits for growth past the cursor or for the finish flag. Growth wins
    /// when both hold, so pending entries are drained before exiting; the
    /// loop only ends once production is finished and nothing unseen
    /// remains.
    fn run(&mut self) {
        loop {
            let wake = self.log.wait_past(self.cursor);
            if wake.published > self.cursor {
                if let Some((len, item)) = self.log.snapshot_latest() {
                    tracing::trace!(consumer = self.id, ?item, "observed new entry");
                    self.seen.push(item);
                    self.cursor = len;
                }
            } else if wake.finished {
                break;
            }
        }
        tracing::debug!(consumer = self.id, observed = self.seen.len(), "consumer done");
    }
}
