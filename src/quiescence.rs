//! The two-phase CNF/ACK quiescence check, run by an idle worker between
//! steal attempts (spec §4.5).
//!
//! The protocol is a two-phase commit: the first CNF/ACK round establishes
//! "every worker believed itself blocked when asked." Only after ASIO is
//! actually stopped does a second round confirm nothing unblocked in the
//! meantime -- an UNBLOCK observed between rounds bumps that worker's
//! local `ack_token`, so any ACK still in flight for the old token is
//! silently dropped when it arrives.

use crate::msg::SchedMsg;
use crate::runtime::Runtime;
use crate::scheduler::Scheduler;

use std::sync::atomic::Ordering;

/// Called while `sched` is idle and has just failed to find work. Returns
/// true once this worker should exit its dispatch loop.
pub(crate) fn quiescent(sched: &Scheduler, runtime: &Runtime) -> bool {
    if sched.terminate.load(Ordering::SeqCst) {
        return true;
    }

    if sched.id == runtime.coordinator_id()
        && sched.ack_count.load(Ordering::SeqCst) == runtime.scheduler_count() as u32
    {
        if sched.asio_stopped.load(Ordering::SeqCst) {
            sched.ack_token.fetch_add(1, Ordering::SeqCst);
            sched.ack_count.store(0, Ordering::SeqCst);
            runtime.broadcast(SchedMsg::Terminate);
        } else if runtime.asio_stop() {
            sched.asio_stopped.store(true, Ordering::SeqCst);
            let token = sched.ack_token.fetch_add(1, Ordering::SeqCst) + 1;
            sched.ack_count.store(0, Ordering::SeqCst);
            runtime.broadcast(SchedMsg::Cnf(token));
        }
    }

    if runtime.config().noyield {
        std::hint::spin_loop();
    } else {
        std::thread::yield_now();
    }

    false
}
