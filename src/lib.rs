//! Multi-threaded work-stealing actor scheduler core.
//!
//! This crate owns the mechanics of running actors across a fixed pool of
//! worker threads: per-worker local run queues with cross-worker stealing,
//! a global inject queue for actors scheduled from outside a worker, a
//! two-phase quiescence protocol that detects when the whole system has
//! gone idle, and mute/unmute back-pressure bookkeeping for overloaded
//! actors. What an actor *is* and how its messages are actually run are
//! left to the [`ExecutionEngine`] the caller supplies; async I/O
//! liveness, CPU pinning, and cycle collection are likewise external
//! collaborators behind their own traits.
//!
//! Start here: build a [`Runtime`] with [`RuntimeBuilder`] (or the
//! shorthand [`Runtime::init`]), then call [`Runtime::start`].

mod actor;
mod affinity;
mod asio;
mod config;
mod cycle;
mod engine;
mod error;
mod msg;
mod mute;
mod quiescence;
mod runtime;
mod scheduler;
mod stealer;
mod worker;

pub use actor::{Actor, ActorRef};
pub use affinity::{CpuPinner, NoopPinner};
pub use asio::{AsioBackend, NoopAsio};
pub use config::RuntimeConfig;
pub use cycle::{CycleDetector, NoopCycleDetector};
pub use engine::{ExecutionEngine, WorkerId};
pub use error::StartError;
pub use runtime::{current_runtime, register_thread, unregister_thread, Runtime, RuntimeBuilder};
