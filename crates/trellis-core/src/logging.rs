//! Logging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. Install a subscriber
//! in the host application to see output:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis::focus=debug,trellis::input=trace")
//!     .init();
//! ```
//!
//! The constants in [`targets`] name each subsystem so logs can be filtered
//! per concern; [`PerfSpan`] wraps frame phases for profiling.

/// Span names used for frame phases.
pub mod span_names {
    /// Queue drain.
    pub const PROCESS_EVENTS: &str = "trellis::process_events";
    /// Recursive paint of the displayed tree.
    pub const PROCESS_PAINT: &str = "trellis::process_paint";
    /// Recursive layout of a subtree.
    pub const PROCESS_LAYOUT: &str = "trellis::process_layout";
}

/// Target names for log filtering.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "trellis_core";
    /// Event queue target.
    pub const QUEUE: &str = "trellis::queue";
    /// Component tree target.
    pub const TREE: &str = "trellis::tree";
    /// Focus manager and input-root stack.
    pub const FOCUS: &str = "trellis::focus";
    /// Mouse and keyboard routing.
    pub const INPUT: &str = "trellis::input";
    /// Painting.
    pub const PAINT: &str = "trellis::paint";
    /// Root controller frame loop.
    pub const ROOT: &str = "trellis::root";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for measuring how long a frame phase takes.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
