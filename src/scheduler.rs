//! Per-worker scheduler state: local run queue, mailbox, the mute map, and
//! the atomics that drive the block/unblock/CNF/ACK quiescence protocol.
//!
//! One `Scheduler` exists per OS worker thread, allocated contiguously at
//! `Runtime::init` and never reallocated after. Fields split into two
//! camps: those touched only by the owning worker (the local queue's push
//! side, `mute_map`) and those any worker may touch (the mailbox send
//! side, the coordinator-facing atomics).

use crate::actor::ActorRef;
use crate::msg::{SchedMsg, Token};
use crate::mute::MuteMap;
use crate::runtime::Runtime;

use crossbeam_channel::{Receiver, Sender};
use crossbeam_deque::{Stealer, Worker};
use parking_lot::Mutex;

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

pub(crate) struct Scheduler {
    pub(crate) id: usize,
    pub(crate) cpu: usize,
    /// Owner pushes single-producer; thieves pop via `stealer()`. FIFO
    /// (`new_fifo`, not the teacher's `new_lifo`) per the spec's explicit
    /// FIFO-fairness requirement within one worker's local queue.
    pub(crate) local: Worker<ActorRef>,
    mailbox_tx: Sender<SchedMsg>,
    mailbox_rx: Receiver<SchedMsg>,
    pub(crate) block_count: AtomicU32,
    pub(crate) ack_token: AtomicU64,
    pub(crate) ack_count: AtomicU32,
    pub(crate) terminate: AtomicBool,
    pub(crate) asio_stopped: AtomicBool,
    pub(crate) asio_noisy: AtomicBool,
    pub(crate) last_victim: AtomicUsize,
    pub(crate) mute_map: Mutex<MuteMap>,
}

impl Scheduler {
    pub(crate) fn new(id: usize, cpu: usize) -> Self {
        let (mailbox_tx, mailbox_rx) = crossbeam_channel::unbounded();
        Scheduler {
            id,
            cpu,
            local: Worker::new_fifo(),
            mailbox_tx,
            mailbox_rx,
            block_count: AtomicU32::new(0),
            ack_token: AtomicU64::new(0),
            ack_count: AtomicU32::new(0),
            terminate: AtomicBool::new(false),
            asio_stopped: AtomicBool::new(false),
            asio_noisy: AtomicBool::new(false),
            last_victim: AtomicUsize::new(id),
            mute_map: Mutex::new(MuteMap::new()),
        }
    }

    pub(crate) fn stealer(&self) -> Stealer<ActorRef> {
        self.local.stealer()
    }

    /// Send a control message to this scheduler's mailbox. Any worker may
    /// call this; draining happens only on the owner.
    pub(crate) fn send(&self, msg: SchedMsg) {
        let _ = self.mailbox_tx.send(msg);
    }

    /// Pop and apply every pending control message. Returns true iff
    /// applying any message pushed a newly-unmuted actor onto this
    /// worker's own local queue (`run_queue_changed`, spec §4.2).
    pub(crate) fn drain_mailbox(&self, runtime: &Runtime) -> bool {
        let mut run_queue_changed = false;
        while let Ok(msg) = self.mailbox_rx.try_recv() {
            if self.apply(runtime, msg) {
                run_queue_changed = true;
            }
        }
        run_queue_changed
    }

    fn apply(&self, runtime: &Runtime, msg: SchedMsg) -> bool {
        match msg {
            SchedMsg::Block => {
                let count = self.block_count.fetch_add(1, Ordering::SeqCst) + 1;
                if runtime.detect_quiescence() && count == runtime.scheduler_count() as u32 {
                    let token = self.ack_token.load(Ordering::SeqCst);
                    runtime.broadcast(SchedMsg::Cnf(token));
                }
                false
            }
            SchedMsg::Unblock => {
                if self.asio_stopped.swap(false, Ordering::SeqCst) {
                    runtime.asio_start();
                }
                if self.block_count.load(Ordering::SeqCst) > 0 {
                    self.block_count.fetch_sub(1, Ordering::SeqCst);
                }
                self.ack_token.fetch_add(1, Ordering::SeqCst);
                self.ack_count.store(0, Ordering::SeqCst);
                false
            }
            SchedMsg::Cnf(token) => {
                runtime.coordinator().send(SchedMsg::Ack(token));
                false
            }
            SchedMsg::Ack(token) => {
                if token == self.ack_token.load(Ordering::SeqCst) {
                    self.ack_count.fetch_add(1, Ordering::SeqCst);
                }
                false
            }
            SchedMsg::Terminate => {
                self.terminate.store(true, Ordering::SeqCst);
                false
            }
            SchedMsg::UnmuteActor(receiver) => crate::mute::unmute_senders(self, runtime, &receiver),
            SchedMsg::NoisyAsio => {
                self.asio_noisy.store(true, Ordering::Relaxed);
                false
            }
            SchedMsg::UnnoisyAsio => {
                self.asio_noisy.store(false, Ordering::Relaxed);
                false
            }
        }
    }

    pub(crate) fn current_token(&self) -> Token {
        self.ack_token.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_scheduler_has_empty_queues() {
        let sched = Scheduler::new(0, 0);
        assert!(sched.local.pop().is_none());
        assert_eq!(sched.block_count.load(Ordering::SeqCst), 0);
        assert_eq!(sched.ack_token.load(Ordering::SeqCst), 0);
        assert!(sched.mute_map.lock().is_empty());
    }

    #[test]
    fn send_then_try_recv_round_trips() {
        let sched = Scheduler::new(0, 0);
        sched.send(SchedMsg::Terminate);
        let msg = sched.mailbox_rx.try_recv().expect("message should be queued");
        assert!(matches!(msg, SchedMsg::Terminate));
    }

    fn test_runtime(threads: usize) -> std::sync::Arc<Runtime> {
        use crate::asio::NoopAsio;
        use crate::config::RuntimeConfig;
        use crate::engine::test_support::CountingEngine;
        use crate::runtime::RuntimeBuilder;
        use std::sync::Arc;

        RuntimeBuilder::new(Arc::new(CountingEngine::default()))
            .config(RuntimeConfig {
                threads,
                ..Default::default()
            })
            .asio(Arc::new(NoopAsio))
            .build()
    }

    #[test]
    fn late_unblock_invalidates_stale_ack() {
        let runtime = test_runtime(1);
        let sched = &runtime.schedulers()[0];

        sched.apply(&runtime, SchedMsg::Ack(0));
        assert_eq!(sched.ack_count.load(Ordering::SeqCst), 1);

        // An UNBLOCK arrives before the round completes: bumps the token
        // and invalidates the in-flight ACK.
        sched.apply(&runtime, SchedMsg::Unblock);
        assert_eq!(sched.ack_token.load(Ordering::SeqCst), 1);
        assert_eq!(sched.ack_count.load(Ordering::SeqCst), 0);

        // An ACK for the old (now stale) token is silently dropped.
        sched.apply(&runtime, SchedMsg::Ack(0));
        assert_eq!(sched.ack_count.load(Ordering::SeqCst), 0);

        // An ACK for the current token counts.
        sched.apply(&runtime, SchedMsg::Ack(1));
        assert_eq!(sched.ack_count.load(Ordering::SeqCst), 1);
    }
}
