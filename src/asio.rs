//! Asynchronous I/O liveness, as an external collaborator.
//!
//! The scheduler core never does I/O itself. What it needs from an ASIO
//! backend is a single fact: is there outstanding async work that could
//! still wake an actor, even though every worker is currently idle? If so,
//! the quiescence protocol must not declare the system terminated.

/// External collaborator reporting async I/O liveness.
pub trait AsioBackend: Send + Sync {
    /// Called once, before any worker starts running. `cpu_hint` carries a
    /// CPU index to pin the backend's own thread to, when the runtime was
    /// configured with `pinasio`.
    fn init(&self, cpu_hint: Option<usize>);

    /// Called when the runtime starts up. Returns `false` if the backend
    /// could not start, aborting `Runtime::start`.
    fn start(&self) -> bool;

    /// Called once the runtime has decided to shut down, and also by the
    /// quiescence protocol's first round. Returns `false` if noisy
    /// registrants remain (outstanding timers or sockets), in which case
    /// the backend keeps running and the round does not advance.
    fn stop(&self) -> bool;
}

/// An `AsioBackend` that never reports outstanding work and always starts
/// and stops successfully. Used by callers with no async I/O subsystem,
/// and by this crate's own tests.
#[derive(Debug, Default)]
pub struct NoopAsio;

impl AsioBackend for NoopAsio {
    fn init(&self, _cpu_hint: Option<usize>) {}
    fn start(&self) -> bool {
        true
    }
    fn stop(&self) -> bool {
        true
    }
}
