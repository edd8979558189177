//! Back-pressure bookkeeping: which senders are muted against which
//! overloaded receivers, and the unmute drain that re-admits them.
//!
//! A `MuteMap` is private to its owning worker -- no other thread ever
//! locks another scheduler's map directly. Cross-scheduler propagation
//! happens entirely through the `UnmuteActor` broadcast (see
//! [`crate::scheduler::Scheduler::drain_mailbox`]), not through shared
//! access to this structure.

use crate::actor::ActorRef;
use crate::runtime::Runtime;
use crate::scheduler::Scheduler;

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::Ordering;

/// Per-scheduler map from an overloaded receiver to the senders currently
/// muted on its behalf.
#[derive(Default)]
pub(crate) struct MuteMap {
    entries: FxHashMap<ActorRef, FxHashSet<ActorRef>>,
}

impl MuteMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Register that `sender` is muted on behalf of `receiver`, on `sched`'s
/// mute map. `sender` and `receiver` must differ -- an actor cannot mute
/// itself.
pub(crate) fn mute(sched: &Scheduler, sender: ActorRef, receiver: ActorRef) {
    assert!(
        !ActorRef::ptr_eq(&sender, &receiver),
        "an actor cannot be muted against itself"
    );

    let mut map = sched.mute_map.lock();
    let set = map.entries.entry(receiver).or_default();
    if set.insert(sender.clone()) {
        sender.0.muted().fetch_add(1, Ordering::Relaxed);
    }
}

/// Drain and reschedule every sender muted against `receiver` on `sched`'s
/// own mute map, notifying the execution engine and, for each sender whose
/// `muted` count just reached zero, broadcasting `UnmuteActor(sender)` so
/// any other scheduler holding that same sender as a mute-map key runs
/// this same drain on its own map.
///
/// Returns true iff any actor was rescheduled onto `sched`'s local queue.
pub(crate) fn unmute_senders(sched: &Scheduler, runtime: &Runtime, receiver: &ActorRef) -> bool {
    let senders = {
        let mut map = sched.mute_map.lock();
        match map.entries.remove(receiver) {
            Some(set) => set,
            None => return false,
        }
    };

    let mut rescheduled = false;
    for sender in senders {
        let prev_count = sender.0.muted().fetch_sub(1, Ordering::Relaxed);
        if prev_count == 1 && !sender.0.is_unscheduled() {
            runtime.engine().unmute_actor(&sender);
            sched.local.push(sender.clone());
            rescheduled = true;
            runtime.start_global_unmute(sender, sched.id);
        }
    }

    rescheduled
}
