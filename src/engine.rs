//! The execution engine boundary: the scheduler's only way to actually run
//! an actor.
//!
//! The engine is what the spec calls out as an external collaborator --
//! everything about *what an actor does* lives on the other side of this
//! trait. The core only needs to hand it an actor and a budget, and learn
//! whether to keep running it.

use crate::actor::ActorRef;

/// Identifies which worker is asking the engine to run something.
///
/// Cheap to copy; carried instead of a full scheduler reference so the
/// engine can't reach back into scheduler-internal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub usize);

/// External collaborator that actually executes actor code.
///
/// A real implementation runs the actor's message loop for up to `batch`
/// messages and reports whether it has more work to do. This core never
/// inspects actor internals -- it just dispatches through this trait.
pub trait ExecutionEngine: Send + Sync {
    /// Run `actor` on `worker` for up to `batch` messages.
    ///
    /// Returns `true` if the actor should be rescheduled (it still has
    /// pending work), `false` if it's done for now.
    fn run_actor(&self, worker: WorkerId, actor: &ActorRef, batch: u32) -> bool;

    /// Called once an actor transitions from muted back to runnable, before
    /// it is rescheduled. Lets the engine clear any muted-state bookkeeping
    /// of its own (e.g. an internal flag mirroring the atomic counter).
    fn unmute_actor(&self, actor: &ActorRef);
}
