//! Core systems for Trellis.
//!
//! This crate holds the platform-neutral pieces of the toolkit that do not
//! depend on the component tree itself:
//!
//! - **Geometry**: [`Rect`], the half-open integer box used for bounds and hit testing
//! - **Identifiers**: [`ComponentId`], the arena key naming a component
//! - **Input vocabulary**: [`MouseButton`], [`Key`], [`KeyLocation`], [`ScrollType`],
//!   [`Modifiers`] and [`RawInput`]
//! - **Event queue**: [`EventQueue`], the thread-safe coalescing priority queue,
//!   and the [`EventProcessor`] trait its drain dispatches to
//! - **Errors**: [`TrellisError`] and the fault-reporting [`ErrorHandler`]
//! - **Diagnostics**: tracing targets and controller-thread affinity checks

pub mod error;
pub mod event;
pub mod geometry;
pub mod id;
pub mod input;
pub mod logging;
pub mod queue;
pub mod thread_check;

pub use error::{ErrorHandler, TrellisError, TrellisResult, panic_message, report_fault};
pub use event::{
    AncestorEvent, AncestorEventKind, ComponentEvent, ComponentEventKind, FocusDirection,
    LayoutScope, Property, PropertyChangeEvent, QueuePriority, QueuedEvent, Runnable,
};
pub use geometry::Rect;
pub use id::ComponentId;
pub use input::{Key, KeyLocation, Modifiers, MouseButton, RawInput, ScrollType};
pub use logging::PerfSpan;
pub use queue::{DEFAULT_MAX_RETAINED_ITEMS, EventProcessor, EventQueue, QueueConfig};
pub use thread_check::ControllerThread;
