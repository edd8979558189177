//! Configuration recognized at `Runtime::init` / `Runtime::start` (spec §6).

/// Options recognized by [`crate::runtime::Runtime::init`] and
/// [`crate::runtime::Runtime::start`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads. `0` means "one per available CPU".
    pub threads: usize,
    /// If true, idle workers busy-spin instead of yielding to the OS while
    /// polling for quiescence.
    pub noyield: bool,
    /// If true, disable CPU affinity pinning entirely (`CpuPinner::pin` is
    /// never called).
    pub nopin: bool,
    /// If true, pin the ASIO backend's own thread to a dedicated CPU
    /// (forwarded to `AsioBackend::init`).
    pub pinasio: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            threads: 0,
            noyield: false,
            nopin: false,
            pinasio: false,
        }
    }
}
