//! Control messages workers exchange out-of-band from actor work.
//!
//! These never touch the run queues -- each worker has its own mailbox
//! (see [`crate::worker`]) that it drains between batches of actor work.

use crate::actor::ActorRef;

/// A quiescence-round token. Each full BLOCK/CNF/ACK round gets a fresh one
/// so a worker can tell a stale ACK from the current round apart.
pub type Token = u64;

/// Everything a worker can tell another worker (or itself).
#[derive(Debug, Clone)]
pub enum SchedMsg {
    /// Sent to the coordinator: "I have gone idle and found no work."
    Block,
    /// Sent to the coordinator: "I am no longer idle, abort any quiescence
    /// round in progress."
    Unblock,
    /// Broadcast by the coordinator: "confirm you are still blocked, with
    /// this round's token."
    Cnf(Token),
    /// Sent to the coordinator: "confirmed, as of this token."
    Ack(Token),
    /// Broadcast by the coordinator once quiescence is confirmed twice over:
    /// every worker should exit its loop.
    Terminate,
    /// Broadcast whenever an actor transitions out of the muted set: every
    /// worker should drop that actor from its local mute bookkeeping.
    UnmuteActor(ActorRef),
    /// Broadcast when the ASIO backend reports live (non-idle) work: blocks
    /// the coordinator from treating the system as quiescent even if every
    /// worker is idle.
    NoisyAsio,
    /// Broadcast when the ASIO backend reports idle: the complementary
    /// signal to `NoisyAsio`.
    UnnoisyAsio,
}
