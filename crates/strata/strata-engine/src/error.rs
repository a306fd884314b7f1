use std::io;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A worker was handed a log handle whose backing storage is gone.
    /// Caller bug, not a transient fault; the worker never starts.
    #[error("shared log is no longer alive")]
    LogUnavailable,

    #[error("failed to spawn worker thread '{name}'")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}
