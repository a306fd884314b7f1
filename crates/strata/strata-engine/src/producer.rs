use std::fmt;
use std::sync::{Arc, Weak};

use strata_bus::SharedLog;

use crate::{EngineError, Worker};

/// The writing side of a run: appends a fixed source sequence to the shared
/// log, `rounds` times over, then marks production finished.
#[derive(Debug)]
pub struct Producer<T> {
    source: Vec<T>,
    rounds: usize,
    log: Arc<SharedLog<T>>,
}

impl<T> Producer<T> {
    /// Builds a producer from a non-owning log handle.
    ///
    /// # Errors
    /// [`EngineError::LogUnavailable`] if the handle no longer points at a
    /// live log. Nothing is appended on the failure path.
    pub fn new(
        source: Vec<T>,
        rounds: usize,
        log: Weak<SharedLog<T>>,
    ) -> Result<Self, EngineError> {
        let log = log.upgrade().ok_or(EngineError::LogUnavailable)?;
        Ok(Self {
            source,
            rounds,
            log,
        })
    }
}

impl<T> Worker for Producer<T>
where
    T: Clone + fmt::Debug + Send + Sync,
{
    /// Appends every source element in order, once per round. Each append
    /// wakes all waiting consumers; the final append is followed by exactly
    /// one finish notification, covering consumers that are already parked
    /// and will never see further growth.
    fn run(&mut self) {
        for _ in 0..self.rounds {
            for item in &self.source {
                tracing::trace!(?item, "appending entry");
                self.log.append(item.clone());
            }
        }
        self.log.mark_finished();
        tracing::info!(
            appended = self.rounds * self.source.len(),
            "producer finished"
        );
    }
}
