//! Controller-thread affinity checks.
//!
//! All tree mutation, focus state and painting belong to a single
//! controller thread. Rather than fixing that thread at construction, a
//! [`ControllerThread`] binds to whichever thread first drives it (the first
//! queue drain or frame) and afterwards verifies every access comes from the
//! same thread.
//!
//! ```
//! use trellis_core::thread_check::ControllerThread;
//!
//! let controller = ControllerThread::new();
//! assert!(controller.bound_thread().is_none());
//!
//! controller.bind_or_assert("drain");
//! assert!(controller.is_controller_thread());
//! ```
//!
//! Checks are active in debug builds by default; use
//! [`set_thread_checks_enabled`] to change that.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Flag to enable/disable runtime thread checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable runtime thread checks.
///
/// By default checks run in debug builds and are skipped in release builds.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if runtime thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Lazily bound thread affinity for controller-owned state.
#[derive(Debug, Default)]
pub struct ControllerThread {
    thread_id: OnceLock<ThreadId>,
}

impl ControllerThread {
    /// Create an unbound tracker.
    pub const fn new() -> Self {
        Self {
            thread_id: OnceLock::new(),
        }
    }

    /// The thread this tracker is bound to, if any.
    #[inline]
    pub fn bound_thread(&self) -> Option<ThreadId> {
        self.thread_id.get().copied()
    }

    /// True when unbound or bound to the current thread.
    #[inline]
    pub fn is_controller_thread(&self) -> bool {
        match self.thread_id.get() {
            Some(&id) => std::thread::current().id() == id,
            None => true,
        }
    }

    /// Bind to the current thread on first use; on later calls verify the
    /// current thread is the bound one.
    ///
    /// # Panics
    ///
    /// Panics when checks are enabled and the caller is on another thread.
    pub fn bind_or_assert(&self, operation: &str) {
        let current = std::thread::current().id();
        let bound = *self.thread_id.get_or_init(|| current);
        if bound != current && are_thread_checks_enabled() {
            panic_wrong_thread(operation, bound);
        }
    }
}

#[cold]
#[inline(never)]
fn panic_wrong_thread(operation: &str, bound: ThreadId) -> ! {
    let current = std::thread::current();
    let current_name = current.name().unwrap_or("<unnamed>");
    let current_id = current.id();

    panic!(
        "\n\
        ══════════════════════════════════════════════════════════════════════\n\
        CONTROLLER THREAD VIOLATION\n\
        ══════════════════════════════════════════════════════════════════════\n\
        \n\
        {operation} must run on the controller thread.\n\
        \n\
        Controller thread: {bound:?}\n\
        Current thread: \"{current_name}\" (ID: {current_id:?})\n\
        \n\
        Other threads may only enqueue work through EventQueue::fire_*,\n\
        for example fire_input() for raw input or fire_runnable() for\n\
        arbitrary work.\n\
        ══════════════════════════════════════════════════════════════════════"
    )
}
