//! CPU affinity assignment, as an external collaborator.
//!
//! The scheduler core decides which CPU index a worker is associated with
//! (a plain hint assigned at `Runtime::init`); actually binding the calling
//! OS thread to that CPU is platform-specific and explicitly out of scope
//! (spec §1), so it's expressed here as a narrow trait instead.

/// External collaborator performing CPU affinity pinning.
pub trait CpuPinner: Send + Sync {
    /// Pin the calling thread to CPU `cpu`. Called from within the newly
    /// spawned worker thread itself, before it enters its dispatch loop,
    /// unless the runtime was configured with `nopin`.
    fn pin(&self, cpu: usize);
}

/// A `CpuPinner` that never pins. Used when the caller has no affinity
/// dependency (matching the teacher crate's own choice not to carry one),
/// and by this crate's tests.
#[derive(Debug, Default)]
pub struct NoopPinner;

impl CpuPinner for NoopPinner {
    fn pin(&self, _cpu: usize) {}
}
