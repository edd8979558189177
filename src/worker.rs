//! The per-thread dispatch loop: drain mailbox, pop an actor, run a batch,
//! decide whether to reschedule, and fall back to stealing when idle.

use crate::actor::ActorRef;
use crate::engine::WorkerId;
use crate::runtime::Runtime;
use crate::scheduler::Scheduler;
use crate::stealer;

use crossbeam_deque::{Injector, Steal};

/// Maximum number of messages an actor is run for per scheduling slot.
pub const BATCH: u32 = 100;

/// Pop from the global inject queue, retrying on contention.
pub(crate) fn pop_inject(inject: &Injector<ActorRef>) -> Option<ActorRef> {
    loop {
        match inject.steal() {
            Steal::Success(actor) => return Some(actor),
            Steal::Empty => return None,
            Steal::Retry => continue,
        }
    }
}

/// Pop from `sched`'s own local queue. Owner-only.
pub(crate) fn pop_local(sched: &Scheduler) -> Option<ActorRef> {
    sched.local.pop()
}

/// Try the inject queue first, then `sched`'s own local queue -- this
/// ordering bounds inject-queue latency when external threads are
/// producing (spec §4.1).
pub(crate) fn pop_any(runtime: &Runtime, sched: &Scheduler) -> Option<ActorRef> {
    pop_inject(runtime.inject()).or_else(|| pop_local(sched))
}

/// The body of one worker OS thread. Runs until it observes `None` from
/// `steal()`, at which point its local queue is asserted empty and the
/// thread returns, ending the worker.
pub(crate) fn run(runtime: &Runtime, sched: &Scheduler) {
    crate::runtime::bind_current_worker(sched.id);

    if !runtime.config().nopin {
        runtime.pinner().pin(sched.cpu);
    }

    let worker_id = WorkerId(sched.id);
    let mut current = pop_any(runtime, sched);

    loop {
        if sched.drain_mailbox(runtime) && current.is_none() {
            current = pop_any(runtime, sched);
        }

        let actor = match current.take() {
            Some(actor) => actor,
            None => match stealer::steal(sched, runtime) {
                Some(actor) => actor,
                None => {
                    debug_assert!(
                        pop_local(sched).is_none(),
                        "worker terminating with a non-empty local queue"
                    );
                    break;
                }
            },
        };

        let reschedule = runtime.engine().run_actor(worker_id, &actor, BATCH);
        let follow_on = pop_any(runtime, sched);

        current = if reschedule {
            match follow_on {
                Some(next) => {
                    sched.local.push(actor);
                    Some(next)
                }
                None => Some(actor),
            }
        } else {
            follow_on
        };
    }
}
