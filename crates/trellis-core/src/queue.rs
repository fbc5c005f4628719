//! The coalescing priority event queue.
//!
//! Every root controller owns one [`EventQueue`]. Any thread may enqueue;
//! only the controller thread drains. Items fall into three buckets
//! ([`QueuePriority`]) that are drained paint first, then layout, then
//! everything else, repeating until all three are empty.
//!
//! Paint and layout requests coalesce: however many repaints are requested
//! between two drains, one paint item is processed. Layout requests from a
//! single source coalesce to that source; requests from two distinct sources
//! widen to [`LayoutScope::Tree`].
//!
//! Every item is processed inside `catch_unwind`, so a panicking listener
//! costs only its own event. The fault is passed to the queue's
//! [`ErrorHandler`] or logged.
//!
//! # Example
//!
//! ```
//! use trellis_core::{ComponentId, EventProcessor, EventQueue, LayoutScope};
//! # use trellis_core::*;
//! #[derive(Default)]
//! struct CountPaints(usize);
//!
//! impl EventProcessor for CountPaints {
//!     fn process_paint(&mut self, _source: ComponentId) {
//!         self.0 += 1;
//!     }
//!     fn process_layout(&mut self, _scope: LayoutScope) {}
//!     fn process_request_focus(&mut self, _source: ComponentId) {}
//!     fn process_transfer_focus(&mut self, _source: ComponentId, _direction: FocusDirection) {}
//!     fn process_push_input_root(&mut self, _root: ComponentId) {}
//!     fn process_pop_input_root(&mut self, _root: ComponentId) {}
//!     fn process_component_event(&mut self, _event: ComponentEvent) {}
//!     fn process_ancestor_event(&mut self, _event: AncestorEvent) {}
//!     fn process_property_change(&mut self, _event: PropertyChangeEvent) {}
//!     fn process_input(&mut self, _input: RawInput) {}
//! }
//!
//! let queue = EventQueue::new();
//! let id = ComponentId::default();
//! for _ in 0..10 {
//!     queue.fire_paint(id);
//! }
//! let mut processor = CountPaints::default();
//! queue.process_all_events(&mut processor);
//! assert_eq!(processor.0, 1);
//! ```

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::error::{ErrorHandler, TrellisError, panic_message, report_fault};
use crate::event::{
    AncestorEvent, ComponentEvent, FocusDirection, LayoutScope, Property, PropertyChangeEvent,
    QueuePriority, QueuedEvent, Runnable,
};
use crate::id::ComponentId;
use crate::input::RawInput;
use crate::logging::targets;
use crate::thread_check::ControllerThread;

/// Default cap on the item capacity the queue keeps allocated between drains.
pub const DEFAULT_MAX_RETAINED_ITEMS: usize = 128;

/// Configuration for an [`EventQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Upper bound on the capacity recycled from one drain to the next.
    ///
    /// Drained item storage is reused instead of reallocated; anything above
    /// this bound is released after a drain.
    pub max_retained_items: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retained_items: DEFAULT_MAX_RETAINED_ITEMS,
        }
    }
}

impl QueueConfig {
    pub fn with_max_retained_items(mut self, max: usize) -> Self {
        self.max_retained_items = max;
        self
    }
}

/// Receiver for drained queue items, implemented by the root controller.
///
/// Each method handles one item kind. Implementations run on the controller
/// thread and may enqueue further items; those are drained in the same call
/// to [`EventQueue::process_all_events`].
pub trait EventProcessor {
    fn process_paint(&mut self, source: ComponentId);
    fn process_layout(&mut self, scope: LayoutScope);
    fn process_request_focus(&mut self, source: ComponentId);
    fn process_transfer_focus(&mut self, source: ComponentId, direction: FocusDirection);
    fn process_push_input_root(&mut self, root: ComponentId);
    fn process_pop_input_root(&mut self, root: ComponentId);
    fn process_component_event(&mut self, event: ComponentEvent);
    fn process_ancestor_event(&mut self, event: AncestorEvent);
    fn process_property_change(&mut self, event: PropertyChangeEvent);
    fn process_input(&mut self, input: RawInput);

    /// Run a queued closure. The default simply calls it.
    fn process_runnable(&mut self, runnable: Runnable) {
        runnable();
    }
}

/// Thread-safe, coalescing, three-bucket event queue.
pub struct EventQueue {
    paint: Mutex<Option<ComponentId>>,
    layout: Mutex<Option<LayoutScope>>,
    normal: Mutex<VecDeque<QueuedEvent>>,
    /// Storage recycled between drains of the normal bucket.
    spare: Mutex<VecDeque<QueuedEvent>>,
    ignore_repaints: AtomicBool,
    error_handler: RwLock<Option<ErrorHandler>>,
    controller: ControllerThread,
    config: QueueConfig,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    /// Create a queue with default configuration.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            paint: Mutex::new(None),
            layout: Mutex::new(None),
            normal: Mutex::new(VecDeque::new()),
            spare: Mutex::new(VecDeque::new()),
            ignore_repaints: AtomicBool::new(false),
            error_handler: RwLock::new(None),
            controller: ControllerThread::new(),
            config,
        }
    }

    pub fn config(&self) -> QueueConfig {
        self.config
    }

    // =========================================================================
    // Enqueue (any thread)
    // =========================================================================

    /// Request a repaint. Coalesces with any pending paint request.
    pub fn fire_paint(&self, source: ComponentId) {
        if self.ignore_repaints.load(Ordering::Acquire) {
            return;
        }
        let mut pending = self.paint.lock();
        if pending.is_none() {
            *pending = Some(source);
        }
    }

    /// Request a layout of `source`'s subtree.
    ///
    /// A second request from a different source widens the pending request
    /// to the whole tree.
    pub fn fire_layout(&self, source: ComponentId) {
        let mut pending = self.layout.lock();
        *pending = match *pending {
            None => Some(LayoutScope::Component(source)),
            Some(LayoutScope::Component(existing)) if existing == source => {
                Some(LayoutScope::Component(existing))
            }
            Some(_) => {
                tracing::trace!(target: targets::QUEUE, ?source, "layout request widened to tree");
                Some(LayoutScope::Tree)
            }
        };
    }

    pub fn fire_request_focus(&self, source: ComponentId) {
        self.push_normal(QueuedEvent::RequestFocus(source));
    }

    pub fn fire_transfer_focus_forward(&self, source: ComponentId) {
        self.push_normal(QueuedEvent::TransferFocus {
            source,
            direction: FocusDirection::Forward,
        });
    }

    pub fn fire_transfer_focus_backward(&self, source: ComponentId) {
        self.push_normal(QueuedEvent::TransferFocus {
            source,
            direction: FocusDirection::Backward,
        });
    }

    pub fn fire_push_input_root(&self, root: ComponentId) {
        self.push_normal(QueuedEvent::PushInputRoot(root));
    }

    pub fn fire_pop_input_root(&self, root: ComponentId) {
        self.push_normal(QueuedEvent::PopInputRoot(root));
    }

    pub fn fire_component_event(&self, event: ComponentEvent) {
        self.push_normal(QueuedEvent::Component(event));
    }

    pub fn fire_ancestor_event(&self, event: AncestorEvent) {
        self.push_normal(QueuedEvent::Ancestor(event));
    }

    pub fn fire_property_change(
        &self,
        source: ComponentId,
        property: Property,
        old_value: bool,
        new_value: bool,
    ) {
        self.push_normal(QueuedEvent::PropertyChange(PropertyChangeEvent {
            source,
            property,
            old_value,
            new_value,
        }));
    }

    /// Hand a raw host input event to the controller thread.
    pub fn fire_input(&self, input: RawInput) {
        self.push_normal(QueuedEvent::Input(input));
    }

    /// Run `f` on the controller thread during the next drain.
    pub fn fire_runnable<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.push_normal(QueuedEvent::Runnable(Box::new(f)));
    }

    fn push_normal(&self, event: QueuedEvent) {
        self.normal.lock().push_back(event);
    }

    // =========================================================================
    // State
    // =========================================================================

    /// While true, [`fire_paint`](Self::fire_paint) is a no-op.
    ///
    /// Used when an external animator repaints every frame regardless.
    pub fn ignore_repaints(&self, ignore: bool) {
        self.ignore_repaints.store(ignore, Ordering::Release);
    }

    pub fn is_ignoring_repaints(&self) -> bool {
        self.ignore_repaints.load(Ordering::Acquire)
    }

    /// Install (or clear) the callback receiving isolated faults.
    pub fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        *self.error_handler.write() = handler;
    }

    /// Report a fault through the installed handler, or log it.
    pub fn report_fault(&self, error: &TrellisError) {
        let handler = self.error_handler.read().clone();
        report_fault(handler.as_ref(), error);
    }

    /// Number of items waiting, counting coalesced paint and layout as one each.
    pub fn pending_count(&self) -> usize {
        usize::from(self.paint.lock().is_some())
            + usize::from(self.layout.lock().is_some())
            + self.normal.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_count() == 0
    }

    /// Whether a paint request is pending.
    pub fn has_pending_paint(&self) -> bool {
        self.paint.lock().is_some()
    }

    /// The pending layout request, if any.
    pub fn pending_layout(&self) -> Option<LayoutScope> {
        *self.layout.lock()
    }

    // =========================================================================
    // Drain (controller thread)
    // =========================================================================

    /// Drain every bucket, highest priority first, until all are empty.
    ///
    /// Returns the number of items processed. Must be called from the
    /// controller thread; the first caller becomes that thread.
    pub fn process_all_events(&self, processor: &mut dyn EventProcessor) -> usize {
        self.controller.bind_or_assert("EventQueue::process_all_events");

        let mut processed = 0;
        loop {
            let mut round = 0;

            let paint = self.paint.lock().take();
            if let Some(source) = paint {
                self.dispatch(processor, QueuedEvent::Paint(source));
                round += 1;
            }

            let layout = self.layout.lock().take();
            if let Some(scope) = layout {
                self.dispatch(processor, QueuedEvent::Layout(scope));
                round += 1;
            }

            let mut batch = {
                let recycled = std::mem::take(&mut *self.spare.lock());
                std::mem::replace(&mut *self.normal.lock(), recycled)
            };
            round += batch.len();
            for event in batch.drain(..) {
                self.dispatch(processor, event);
            }
            if batch.capacity() > self.config.max_retained_items {
                batch.shrink_to(self.config.max_retained_items);
            }
            *self.spare.lock() = batch;

            if round == 0 {
                break;
            }
            processed += round;
        }

        if processed > 0 {
            tracing::trace!(target: targets::QUEUE, processed, "queue drained");
        }
        processed
    }

    fn dispatch(&self, processor: &mut dyn EventProcessor, event: QueuedEvent) {
        let description = event.describe();
        let result = catch_unwind(AssertUnwindSafe(|| match event {
            QueuedEvent::Paint(source) => processor.process_paint(source),
            QueuedEvent::Layout(scope) => processor.process_layout(scope),
            QueuedEvent::RequestFocus(source) => processor.process_request_focus(source),
            QueuedEvent::TransferFocus { source, direction } => {
                processor.process_transfer_focus(source, direction)
            }
            QueuedEvent::PushInputRoot(root) => processor.process_push_input_root(root),
            QueuedEvent::PopInputRoot(root) => processor.process_pop_input_root(root),
            QueuedEvent::Component(e) => processor.process_component_event(e),
            QueuedEvent::Ancestor(e) => processor.process_ancestor_event(e),
            QueuedEvent::PropertyChange(e) => processor.process_property_change(e),
            QueuedEvent::Input(input) => processor.process_input(input),
            QueuedEvent::Runnable(runnable) => processor.process_runnable(runnable),
        }));

        if let Err(payload) = result {
            self.report_fault(&TrellisError::Panicked {
                context: format!("processing {description}"),
                message: panic_message(payload.as_ref()),
            });
        }
    }

    /// The bucket an item would land in; exposed for diagnostics.
    pub fn bucket_of(event: &QueuedEvent) -> QueuePriority {
        event.priority()
    }
}

static_assertions::assert_impl_all!(EventQueue: Send, Sync);
