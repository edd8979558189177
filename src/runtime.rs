//! The runtime object: the scheduler array, the global inject queue, the
//! init/start/stop lifecycle, and the public scheduling surface.
//!
//! Spec §9 calls out that the source's global singletons (scheduler array,
//! inject queue, thread-local current-worker pointer) should become an
//! explicit object threaded through a context parameter rather than hidden
//! statics. `Runtime` is that object: everything it needs is either a
//! field or reachable through one, and the only thread-local state left is
//! the pair of slots that let a thread find its own worker index and its
//! enclosing `Runtime` without holding a reference end-to-end.

use crate::actor::ActorRef;
use crate::affinity::{CpuPinner, NoopPinner};
use crate::asio::{AsioBackend, NoopAsio};
use crate::config::RuntimeConfig;
use crate::cycle::CycleDetector;
use crate::engine::{ExecutionEngine, WorkerId};
use crate::error::StartError;
use crate::msg::SchedMsg;
use crate::mute;
use crate::scheduler::Scheduler;
use crate::worker;

use crossbeam_deque::{Injector, Stealer};
use parking_lot::Mutex;

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// The coordinator's worker index. All BLOCK/UNBLOCK/ACK traffic is
/// addressed here explicitly (spec §9: an explicit coordinator role
/// instead of an implicit "everything goes to index 0" convention); the
/// addressing itself is unchanged from the source.
const COORDINATOR: usize = 0;

thread_local! {
    /// Set for the lifetime of a worker OS thread to that worker's index;
    /// `None` everywhere else. Drives `Runtime::schedule`'s fast path.
    static CURRENT_WORKER: Cell<Option<usize>> = const { Cell::new(None) };
    /// Set by `register_thread` for non-worker threads that need to reach
    /// a `Runtime` without holding their own clone of the `Arc`.
    static CURRENT_RUNTIME: RefCell<Option<Arc<Runtime>>> = const { RefCell::new(None) };
}

pub(crate) fn bind_current_worker(id: usize) {
    CURRENT_WORKER.with(|c| c.set(Some(id)));
}

/// Register the calling (non-worker) thread so [`current_runtime`] can
/// find `runtime` from it. Must be paired with [`unregister_thread`];
/// calling it twice without an intervening `unregister_thread` is a
/// contract violation.
pub fn register_thread(runtime: &Arc<Runtime>) {
    CURRENT_RUNTIME.with(|c| {
        let mut slot = c.borrow_mut();
        assert!(
            slot.is_none(),
            "register_thread called twice without a matching unregister_thread"
        );
        *slot = Some(Arc::clone(runtime));
    });
}

/// Unregister the calling thread. Must be paired with a prior
/// [`register_thread`]; calling it without one is a contract violation.
pub fn unregister_thread() {
    CURRENT_RUNTIME.with(|c| {
        let mut slot = c.borrow_mut();
        assert!(
            slot.is_some(),
            "unregister_thread called without a matching register_thread"
        );
        *slot = None;
    });
}

/// The `Runtime` the calling thread registered via [`register_thread`], if
/// any.
pub fn current_runtime() -> Option<Arc<Runtime>> {
    CURRENT_RUNTIME.with(|c| c.borrow().clone())
}

/// Builds a [`Runtime`] from an execution engine and optional external
/// collaborators, defaulting the ones the caller doesn't supply to
/// no-ops.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    engine: Arc<dyn ExecutionEngine>,
    asio: Arc<dyn AsioBackend>,
    cycle_detector: Option<Arc<dyn CycleDetector>>,
    pinner: Arc<dyn CpuPinner>,
}

impl RuntimeBuilder {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        RuntimeBuilder {
            config: RuntimeConfig::default(),
            engine,
            asio: Arc::new(NoopAsio),
            cycle_detector: None,
            pinner: Arc::new(NoopPinner),
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn asio(mut self, asio: Arc<dyn AsioBackend>) -> Self {
        self.asio = asio;
        self
    }

    pub fn cycle_detector(mut self, cycle_detector: Arc<dyn CycleDetector>) -> Self {
        self.cycle_detector = Some(cycle_detector);
        self
    }

    pub fn pinner(mut self, pinner: Arc<dyn CpuPinner>) -> Self {
        self.pinner = pinner;
        self
    }

    pub fn build(self) -> Arc<Runtime> {
        Runtime::assemble(
            self.config,
            self.engine,
            self.asio,
            self.cycle_detector,
            self.pinner,
        )
    }
}

/// Top-level runtime object: the scheduler array, the global inject queue,
/// and the lifecycle/coordination state threaded through every worker.
pub struct Runtime {
    config: RuntimeConfig,
    engine: Arc<dyn ExecutionEngine>,
    asio: Arc<dyn AsioBackend>,
    cycle_detector: Option<Arc<dyn CycleDetector>>,
    pinner: Arc<dyn CpuPinner>,
    schedulers: Vec<Arc<Scheduler>>,
    stealers: Vec<Stealer<ActorRef>>,
    inject: Injector<ActorRef>,
    detect_quiescence: AtomicBool,
    handles: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl Runtime {
    /// Construct a `Runtime` with the given execution engine, ASIO
    /// backend, and optional cycle detector. Use [`RuntimeBuilder`]
    /// instead when a `CpuPinner` is also needed.
    pub fn init(
        config: RuntimeConfig,
        engine: Arc<dyn ExecutionEngine>,
        asio: Arc<dyn AsioBackend>,
        cycle_detector: Option<Arc<dyn CycleDetector>>,
    ) -> Arc<Runtime> {
        let mut builder = RuntimeBuilder::new(engine).config(config).asio(asio);
        if let Some(cd) = cycle_detector {
            builder = builder.cycle_detector(cd);
        }
        builder.build()
    }

    fn assemble(
        config: RuntimeConfig,
        engine: Arc<dyn ExecutionEngine>,
        asio: Arc<dyn AsioBackend>,
        cycle_detector: Option<Arc<dyn CycleDetector>>,
        pinner: Arc<dyn CpuPinner>,
    ) -> Arc<Self> {
        let threads = if config.threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            config.threads
        };

        let schedulers: Vec<Arc<Scheduler>> = (0..threads)
            .map(|id| Arc::new(Scheduler::new(id, id)))
            .collect();
        let stealers = schedulers.iter().map(|s| s.stealer()).collect();

        asio.init(if config.pinasio { Some(threads) } else { None });

        Arc::new(Runtime {
            config,
            engine,
            asio,
            cycle_detector,
            pinner,
            schedulers,
            stealers,
            inject: Injector::new(),
            detect_quiescence: AtomicBool::new(false),
            handles: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        })
    }

    /// Number of worker threads.
    pub fn cores(&self) -> usize {
        self.schedulers.len()
    }

    /// The worker index the calling thread is running as, if any.
    pub fn current_worker() -> Option<WorkerId> {
        CURRENT_WORKER.with(|c| c.get()).map(WorkerId)
    }

    pub(crate) fn scheduler_count(&self) -> usize {
        self.schedulers.len()
    }

    pub(crate) fn coordinator_id(&self) -> usize {
        COORDINATOR
    }

    pub(crate) fn coordinator(&self) -> &Arc<Scheduler> {
        &self.schedulers[COORDINATOR]
    }

    pub(crate) fn schedulers(&self) -> &[Arc<Scheduler>] {
        &self.schedulers
    }

    pub(crate) fn stealers(&self) -> &[Stealer<ActorRef>] {
        &self.stealers
    }

    pub(crate) fn inject(&self) -> &Injector<ActorRef> {
        &self.inject
    }

    pub(crate) fn engine(&self) -> &Arc<dyn ExecutionEngine> {
        &self.engine
    }

    pub(crate) fn pinner(&self) -> &Arc<dyn CpuPinner> {
        &self.pinner
    }

    pub(crate) fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub(crate) fn detect_quiescence(&self) -> bool {
        self.detect_quiescence.load(Ordering::SeqCst)
    }

    pub(crate) fn asio_start(&self) {
        self.asio.start();
    }

    pub(crate) fn asio_stop(&self) -> bool {
        self.asio.stop()
    }

    pub(crate) fn broadcast(&self, msg: SchedMsg) {
        for sched in &self.schedulers {
            sched.send(msg.clone());
        }
    }

    /// Start the runtime: start the ASIO backend, spawn one OS thread per
    /// worker, and, unless `library` is true, block until every worker
    /// has exited and then shut down.
    ///
    /// In library mode (`library = true`), quiescence auto-detection is
    /// disabled -- the caller is expected to drive the runtime's lifetime
    /// explicitly and call [`Runtime::stop`] when done.
    pub fn start(self: &Arc<Self>, library: bool) -> Result<(), StartError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(StartError::AlreadyStarted);
        }

        if !self.asio.start() {
            self.started.store(false, Ordering::SeqCst);
            return Err(StartError::AsioStartFailed);
        }

        self.detect_quiescence.store(!library, Ordering::SeqCst);

        {
            let mut handles = self.handles.lock();
            for sched in &self.schedulers {
                let runtime = Arc::clone(self);
                let sched = Arc::clone(sched);
                let handle = std::thread::Builder::new()
                    .name(format!("ember-sched-{}", sched.id))
                    .spawn(move || worker::run(&runtime, &sched))
                    .map_err(StartError::ThreadSpawnFailed)?;
                handles.push(handle);
            }
        }

        if !library {
            self.join();
            self.shutdown();
        }

        Ok(())
    }

    /// Force quiescence detection on, wait for every worker to quiesce and
    /// exit, then shut down. For callers that started the runtime in
    /// library mode.
    pub fn stop(&self) {
        self.detect_quiescence.store(true, Ordering::SeqCst);
        self.join();
        self.shutdown();
    }

    fn join(&self) {
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
    }

    fn shutdown(&self) {
        if let Some(cd) = &self.cycle_detector {
            cd.terminate(WorkerId(COORDINATOR));
        }
        self.asio.stop();
    }

    /// Schedule `actor`. From a worker thread, pushes to that worker's own
    /// local queue (single-producer fast path). Otherwise pushes to the
    /// global inject queue.
    pub fn schedule(&self, actor: ActorRef) {
        match CURRENT_WORKER.with(|c| c.get()) {
            Some(id) => self.schedulers[id].local.push(actor),
            None => self.inject.push(actor),
        }
    }

    /// Register that `sender` is muted against `receiver`, on the calling
    /// worker's mute map. Must be called from a worker thread executing
    /// `sender` -- the mute-map ownership invariant (spec §9) only holds
    /// when muting happens on the sender's own worker.
    pub fn mute(&self, sender: ActorRef, receiver: ActorRef) {
        let id = Self::current_worker()
            .expect("mute() called outside a worker thread")
            .0;
        mute::mute(&self.schedulers[id], sender, receiver);
    }

    /// Unmute every sender muted against `receiver` on the calling
    /// worker's mute map, rescheduling any that are now fully unmuted.
    /// Must be called from a worker thread, for the same reason as
    /// [`Runtime::mute`].
    pub fn unmute_senders(&self, receiver: &ActorRef) -> bool {
        let id = Self::current_worker()
            .expect("unmute_senders() called outside a worker thread")
            .0;
        mute::unmute_senders(&self.schedulers[id], self, receiver)
    }

    /// Notify every worker that `actor` just transitioned out of the muted
    /// set, so any scheduler holding `actor` as a mute-map key runs its own
    /// drain. `origin` is the worker that triggered this: every *other*
    /// scheduler is reached through the usual mailbox broadcast, but
    /// `origin` already has `self` on the call stack, so instead of
    /// round-tripping a message to its own mailbox (to be picked up only on
    /// its next drain), its drain runs inline, immediately.
    pub fn start_global_unmute(&self, actor: ActorRef, origin: usize) {
        for (id, sched) in self.schedulers.iter().enumerate() {
            if id != origin {
                sched.send(SchedMsg::UnmuteActor(actor.clone()));
            }
        }
        mute::unmute_senders(&self.schedulers[origin], self, &actor);
    }

    /// Broadcast notice that the ASIO backend observed outstanding
    /// external work, inhibiting quiescence.
    pub fn noisy_asio(&self) {
        self.broadcast(SchedMsg::NoisyAsio);
    }

    /// Broadcast notice that the ASIO backend has no outstanding external
    /// work.
    pub fn unnoisy_asio(&self) {
        self.broadcast(SchedMsg::UnnoisyAsio);
    }
}
