use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use strata_bus::SharedLog;

use crate::{Consumer, EngineError, Producer, Worker};

/// Owns one run: builds the shared log and every worker, spawns them on OS
/// threads, and joins them all before returning.
///
/// All workers are constructed before any thread is spawned, so a
/// construction failure propagates with nothing in flight. A thread spawn
/// failure mid-launch drains instead of cancelling: the producer finishes on
/// its own and marks the log finished, every spawned thread is joined, and
/// the spawn error is returned afterwards.
pub struct Orchestrator<T> {
    source: Vec<T>,
    rounds: usize,
    consumers: usize,
}

/// What a finished run produced and who saw what.
#[derive(Debug)]
pub struct RunSummary<T> {
    /// Final log contents, in append order.
    pub entries: Vec<T>,
    /// One report per consumer, in id order.
    pub consumers: Vec<ConsumerReport<T>>,
}

#[derive(Debug)]
pub struct ConsumerReport<T> {
    pub id: u32,
    /// Entries the consumer reacted to, in observation order.
    pub observed: Vec<T>,
}

impl<T> Orchestrator<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(source: Vec<T>, rounds: usize, consumers: usize) -> Self {
        Self {
            source,
            rounds,
            consumers,
        }
    }

    /// Runs one producer and N consumers to completion.
    ///
    /// # Errors
    /// [`EngineError::LogUnavailable`] if a worker rejects its log handle
    /// (before anything is launched), or [`EngineError::Spawn`] if an OS
    /// thread could not be started (after draining the launched workers).
    pub fn run(self) -> Result<RunSummary<T>, EngineError> {
        let log = Arc::new(SharedLog::new());

        let producer = Producer::new(self.source, self.rounds, Arc::downgrade(&log))?;
        let consumers = (0..self.consumers)
            .map(|id| Consumer::new(id as u32, Arc::downgrade(&log)))
            .collect::<Result<Vec<_>, EngineError>>()?;

        tracing::debug!(
            consumers = self.consumers,
            rounds = self.rounds,
            "launching workers"
        );

        let producer_handle = spawn_worker("producer".to_owned(), producer)?;

        let mut consumer_handles = Vec::with_capacity(consumers.len());
        let mut spawn_error = None;
        for consumer in consumers {
            let name = format!("consumer-{}", consumer.id());
            match spawn_worker(name, consumer) {
                Ok(handle) => consumer_handles.push(handle),
                Err(err) => {
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        drop(join_worker(producer_handle));

        let reports = consumer_handles
            .into_iter()
            .map(|handle| {
                let consumer = join_worker(handle);
                ConsumerReport {
                    id: consumer.id(),
                    observed: consumer.into_observed(),
                }
            })
            .collect();

        if let Some(err) = spawn_error {
            return Err(err);
        }

        // All worker handles are gone after the joins, so this normally
        // recovers the storage without cloning.
        let entries = Arc::try_unwrap(log)
            .map(SharedLog::into_entries)
            .unwrap_or_else(|shared| shared.snapshot());

        Ok(RunSummary {
            entries,
            consumers: reports,
        })
    }
}

fn spawn_worker<W>(name: String, mut worker: W) -> Result<JoinHandle<W>, EngineError>
where
    W: Worker + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            worker.run();
            worker
        })
        .map_err(|source| EngineError::Spawn { name, source })
}

fn join_worker<W>(handle: JoinHandle<W>) -> W {
    match handle.join() {
        Ok(worker) => worker,
        // A panicking worker is a defect; surface it on the joining thread.
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
