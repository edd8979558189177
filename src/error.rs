//! Startup failure, the only error this crate's public surface produces
//! (spec §7: contract violations are assertions, not `Result`s).

use std::fmt;

/// Failure starting the runtime.
#[derive(Debug)]
pub enum StartError {
    /// The ASIO backend reported it could not start.
    AsioStartFailed,
    /// Spawning a worker OS thread failed.
    ThreadSpawnFailed(std::io::Error),
    /// `start` was called on a runtime that is already started.
    AlreadyStarted,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::AsioStartFailed => write!(f, "ASIO backend failed to start"),
            StartError::ThreadSpawnFailed(e) => write!(f, "failed to spawn worker thread: {e}"),
            StartError::AlreadyStarted => write!(f, "runtime is already started"),
        }
    }
}

impl std::error::Error for StartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartError::ThreadSpawnFailed(e) => Some(e),
            _ => None,
        }
    }
}
