//! The actor contract this core touches, and a pointer-identity handle for it.
//!
//! The scheduler never runs an actor itself -- that's the execution engine's
//! job (see [`crate::engine`]). All the core needs from an actor is the two
//! bits of state that drive muting and rescheduling decisions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Everything the scheduler core needs to know about an actor.
///
/// Implemented by whatever actor type the caller's execution engine defines.
/// `muted` tracks how many distinct (sender, receiver) muting relations
/// currently reference this actor as the sender; `is_unscheduled` lets the
/// unmute path skip actors that have since left the live set.
pub trait Actor: Send + Sync {
    /// Number of muting relations referencing this actor as a sender.
    fn muted(&self) -> &AtomicU64;

    /// True if this actor has been removed from the live set and must not
    /// be rescheduled even if it becomes eligible again (e.g. via unmute).
    fn is_unscheduled(&self) -> bool;
}

/// A reference-counted handle to an actor, compared and hashed by pointer
/// identity rather than by any notion of actor equality.
///
/// Mute-map sender sets and run queues both need this: two `ActorRef`s are
/// "the same actor" iff they point at the same allocation.
#[derive(Clone)]
pub struct ActorRef(pub Arc<dyn Actor>);

impl ActorRef {
    pub fn new(actor: Arc<dyn Actor>) -> Self {
        ActorRef(actor)
    }

    pub fn ptr_eq(a: &ActorRef, b: &ActorRef) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ActorRef {}

impl Hash for ActorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({:p})", Arc::as_ptr(&self.0))
    }
}
