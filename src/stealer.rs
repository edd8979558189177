//! Work stealing: rotating victim selection and the BLOCK/UNBLOCK gating
//! that throttles how often an idle worker interrupts the coordinator.

use crate::actor::ActorRef;
use crate::msg::SchedMsg;
use crate::quiescence;
use crate::runtime::Runtime;
use crate::scheduler::Scheduler;
use crate::worker::{pop_inject, pop_local};

use crossbeam_deque::Steal;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

/// Wall-clock stand-in for the source's "~1,000,000 cycles" idle threshold
/// before a worker is willing to emit BLOCK (see DESIGN.md Open Question
/// 4: portable cycle counting isn't available without an extra dependency
/// the teacher doesn't carry).
const STEAL_IDLE_THRESHOLD: Duration = Duration::from_millis(2);

/// Advance `sched.last_victim` one slot backward (wrapping), skipping
/// `sched.id`. Returns `None` once the rotation has returned to `sched`'s
/// own index without finding a fresh candidate, resetting `last_victim` to
/// `sched.id` so the next call starts a new rotation (spec §4.4).
fn choose_victim(sched: &Scheduler, scheduler_count: usize) -> Option<usize> {
    if scheduler_count <= 1 {
        return None;
    }

    let mut idx = sched.last_victim.load(Ordering::Relaxed);
    idx = if idx == 0 { scheduler_count - 1 } else { idx - 1 };

    if idx == sched.id {
        sched.last_victim.store(sched.id, Ordering::Relaxed);
        return None;
    }

    sched.last_victim.store(idx, Ordering::Relaxed);
    Some(idx)
}

/// Try the inject queue, then `victim`'s local queue via its stealer
/// handle (never the owner -- stealing happens cross-thread).
fn steal_from(runtime: &Runtime, victim: usize) -> Option<ActorRef> {
    if let Some(actor) = pop_inject(runtime.inject()) {
        return Some(actor);
    }
    loop {
        match runtime.stealers()[victim].steal() {
            Steal::Success(actor) => return Some(actor),
            Steal::Empty => return None,
            Steal::Retry => continue,
        }
    }
}

/// Called by a worker with an empty hand. Loops trying victims, draining
/// its own mailbox, checking the quiescence protocol, and (once genuinely
/// idle for a while) gating a BLOCK/UNBLOCK pair to the coordinator, until
/// it finds work or the runtime decides to terminate this worker.
pub(crate) fn steal(sched: &Scheduler, runtime: &Runtime) -> Option<ActorRef> {
    let idle_since = Instant::now();
    let mut steal_attempts: u32 = 0;
    let mut sent_block = false;

    loop {
        let got = match choose_victim(sched, runtime.scheduler_count()) {
            Some(victim) => steal_from(runtime, victim),
            None => pop_inject(runtime.inject()),
        };

        if let Some(actor) = got {
            if sent_block {
                runtime.coordinator().send(SchedMsg::Unblock);
            }
            return Some(actor);
        }

        if sched.drain_mailbox(runtime) {
            if let Some(actor) = pop_local(sched) {
                if sent_block {
                    runtime.coordinator().send(SchedMsg::Unblock);
                }
                return Some(actor);
            }
        }

        if quiescence::quiescent(sched, runtime) {
            return None;
        }

        if !sent_block {
            steal_attempts += 1;
            if steal_attempts >= runtime.scheduler_count() as u32
                && !sched.asio_noisy.load(Ordering::Relaxed)
                && idle_since.elapsed() >= STEAL_IDLE_THRESHOLD
                && sched.mute_map.lock().is_empty()
            {
                runtime.coordinator().send(SchedMsg::Block);
                sent_block = true;
            }
        }
    }
}
