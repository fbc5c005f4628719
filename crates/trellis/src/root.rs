//! The root controller: one tree, one queue, one frame at a time.
//!
//! A [`RootController`] wires the component tree, its event queue and the
//! input controller together and drives frames from a single controller
//! thread:
//!
//! 1. [`process_events`](RootController::process_events) heals the modal
//!    stack and drains the queue, routing each item to the focus manager,
//!    the input controller, the layout pass or the paint-dirty flag.
//! 2. [`process_paint`](RootController::process_paint) paints the displayed
//!    tree into a [`RenderContext`].
//!
//! Panics raised by listeners are caught at this boundary and passed to the
//! installed [`ErrorHandler`] (or logged) instead of unwinding into the
//! platform's event loop.
//!
//! Raw input may also be posted from other threads through
//! [`EventQueue::fire_input`]; it is then handled during the next drain.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use trellis_core::logging::{PerfSpan, span_names, targets};
use trellis_core::{
    AncestorEvent, ComponentEvent, ComponentId, ControllerThread, ErrorHandler, EventProcessor,
    EventQueue, FocusDirection, Key, KeyLocation, LayoutScope, Modifiers, MouseButton,
    PropertyChangeEvent, RawInput, Rect, ScrollType, TrellisError, TrellisResult, panic_message,
};

use crate::component::{ComponentTree, RenderContext};
use crate::config::{RootBuilder, RootConfig};
use crate::focus::FocusManager;
use crate::input::InputController;

/// Routes drained queue items for one frame.
struct FrameProcessor<'a> {
    tree: &'a mut ComponentTree,
    input: &'a mut InputController,
    root: ComponentId,
    needs_paint: &'a mut bool,
}

impl EventProcessor for FrameProcessor<'_> {
    fn process_paint(&mut self, _source: ComponentId) {
        *self.needs_paint = true;
    }

    fn process_layout(&mut self, scope: LayoutScope) {
        let target = match scope {
            LayoutScope::Component(id) if self.tree.contains(id) => id,
            _ => self.root,
        };
        self.tree.tree_process_layout(target);
    }

    fn process_request_focus(&mut self, source: ComponentId) {
        self.input.focus_mut().request_focus(self.tree, source);
        self.input.validate_mouse(self.tree);
    }

    fn process_transfer_focus(&mut self, source: ComponentId, direction: FocusDirection) {
        let focus = self.input.focus_mut();
        match direction {
            FocusDirection::Forward => focus.transfer_focus_forward(self.tree, source),
            FocusDirection::Backward => focus.transfer_focus_backward(self.tree, source),
        };
        self.input.validate_mouse(self.tree);
    }

    fn process_push_input_root(&mut self, root: ComponentId) {
        self.input.focus_mut().push_input_root(self.tree, root);
        self.input.validate_mouse(self.tree);
    }

    fn process_pop_input_root(&mut self, root: ComponentId) {
        self.input.focus_mut().pop_input_root(self.tree, root);
        self.input.validate_mouse(self.tree);
    }

    fn process_component_event(&mut self, event: ComponentEvent) {
        self.tree.dispatch_component_event(&event);
    }

    fn process_ancestor_event(&mut self, event: AncestorEvent) {
        self.tree.dispatch_ancestor_event(&event);
    }

    fn process_property_change(&mut self, event: PropertyChangeEvent) {
        // Focus and mouse state first, so listeners observe a consistent view.
        self.input.validate(self.tree);
        self.tree.dispatch_property_change(&event);
    }

    fn process_input(&mut self, input: RawInput) {
        self.input.handle_raw(self.tree, input);
    }
}

/// Owns a component tree and drives its frames.
pub struct RootController {
    tree: ComponentTree,
    input: InputController,
    root: ComponentId,
    queue: Arc<EventQueue>,
    needs_paint: bool,
    controller: ControllerThread,
    config: RootConfig,
}

impl Default for RootController {
    fn default() -> Self {
        Self::new(RootConfig::default())
    }
}

impl RootController {
    pub fn builder() -> RootBuilder {
        RootBuilder::new()
    }

    /// Create a controller with a root component of the configured size.
    pub fn new(config: RootConfig) -> Self {
        let queue = Arc::new(EventQueue::with_config(config.queue));
        let mut tree = ComponentTree::new(Arc::clone(&queue));
        let root = tree.create_root("root");
        if let Err(error) = tree.set_bounds(root, Rect::new(0, 0, config.width, config.height)) {
            tracing::error!(target: targets::ROOT, %error, "failed to size root");
        }
        tracing::debug!(target: targets::ROOT, width = config.width, height = config.height, "root controller created");
        Self {
            tree,
            input: InputController::new(config.input),
            root,
            queue,
            needs_paint: true,
            controller: ControllerThread::new(),
            config,
        }
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ComponentTree {
        &mut self.tree
    }

    /// The root component.
    pub fn root(&self) -> ComponentId {
        self.root
    }

    /// The queue, for posting work from other threads.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputController {
        &mut self.input
    }

    pub fn focus(&self) -> &FocusManager {
        self.input.focus()
    }

    /// Whether a repaint has been requested since the last paint.
    pub fn needs_paint(&self) -> bool {
        self.needs_paint
    }

    /// Install (or clear) the callback receiving caught panics.
    pub fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        self.queue.set_error_handler(handler);
    }

    /// Resize the root component.
    pub fn resize(&mut self, width: i32, height: i32) -> TrellisResult<()> {
        tracing::debug!(target: targets::ROOT, width, height, "root resized");
        self.tree.set_size(self.root, width, height)
    }

    /// Run `f` with panics caught and reported as faults.
    fn guarded<R>(&mut self, context: &str, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        match catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(value) => Some(value),
            Err(payload) => {
                self.queue.report_fault(&TrellisError::Panicked {
                    context: context.to_owned(),
                    message: panic_message(payload.as_ref()),
                });
                None
            }
        }
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Drain the event queue. Returns the number of items processed.
    pub fn process_events(&mut self) -> usize {
        self.controller.bind_or_assert("RootController::process_events");
        let _span = PerfSpan::new(span_names::PROCESS_EVENTS);

        self.guarded("processing events", |this| {
            if this.input.focus_mut().validate_input_root(&mut this.tree) > 0 {
                this.input.validate_mouse(&mut this.tree);
            }
            let mut processor = FrameProcessor {
                tree: &mut this.tree,
                input: &mut this.input,
                root: this.root,
                needs_paint: &mut this.needs_paint,
            };
            this.queue.process_all_events(&mut processor)
        })
        .unwrap_or(0)
    }

    /// Paint the displayed tree into `ctx`.
    pub fn process_paint(&mut self, ctx: &mut dyn RenderContext) {
        self.controller.bind_or_assert("RootController::process_paint");
        let _span = PerfSpan::new(span_names::PROCESS_PAINT);

        self.guarded("painting", |this| {
            let (width, height) = this.tree.bounds(this.root).map_or((0, 0), |b| b.size());
            ctx.push_state();
            ctx.set_viewport(Rect::new(0, 0, width, height));
            ctx.set_projection(width, height);
            this.tree.process_paint(this.root, ctx, height);
            ctx.pop_state();
        });
        self.needs_paint = false;
    }

    /// Process events, then paint if anything asked for it. Returns whether
    /// a paint happened.
    ///
    /// While the queue ignores repaints an external animator is assumed to
    /// drive frames, so every tick paints.
    pub fn tick(&mut self, ctx: &mut dyn RenderContext) -> bool {
        self.process_events();
        if self.needs_paint || self.queue.is_ignoring_repaints() {
            self.process_paint(ctx);
            true
        } else {
            false
        }
    }

    // =========================================================================
    // Synchronous input (controller thread)
    // =========================================================================

    fn with_input(
        &mut self,
        context: &str,
        f: impl FnOnce(&mut InputController, &mut ComponentTree) -> bool,
    ) -> bool {
        self.controller.bind_or_assert("RootController input");
        self.guarded(context, |this| f(&mut this.input, &mut this.tree))
            .unwrap_or(false)
    }

    /// Handle one raw input record immediately.
    pub fn handle_input(&mut self, input: RawInput) -> bool {
        self.with_input("handling input", |i, t| i.handle_raw(t, input))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn mouse_pressed(
        &mut self,
        when_us: u64,
        modifiers: Modifiers,
        button: MouseButton,
        x: i32,
        y: i32,
        popup_trigger: bool,
    ) -> bool {
        self.with_input("handling mouse press", |i, t| {
            i.mouse_pressed(t, when_us, modifiers, button, x, y, popup_trigger)
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn mouse_released(
        &mut self,
        when_us: u64,
        modifiers: Modifiers,
        button: MouseButton,
        x: i32,
        y: i32,
        popup_trigger: bool,
        generate_click: bool,
    ) -> bool {
        self.with_input("handling mouse release", |i, t| {
            i.mouse_released(t, when_us, modifiers, button, x, y, popup_trigger, generate_click)
        })
    }

    pub fn mouse_moved(&mut self, when_us: u64, modifiers: Modifiers, x: i32, y: i32) -> bool {
        self.with_input("handling mouse motion", |i, t| {
            i.mouse_moved(t, when_us, modifiers, x, y)
        })
    }

    pub fn mouse_entered(&mut self, when_us: u64, modifiers: Modifiers, x: i32, y: i32) -> bool {
        self.with_input("handling mouse enter", |i, t| {
            i.mouse_entered(t, when_us, modifiers, x, y)
        })
    }

    pub fn mouse_exited(&mut self, when_us: u64, modifiers: Modifiers, x: i32, y: i32) -> bool {
        self.with_input("handling mouse exit", |i, t| {
            i.mouse_exited(t, when_us, modifiers, x, y)
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn mouse_wheel_moved(
        &mut self,
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
        scroll_type: ScrollType,
        scroll_amount: i32,
        wheel_rotation: i32,
    ) -> bool {
        self.with_input("handling mouse wheel", |i, t| {
            i.mouse_wheel_moved(
                t,
                when_us,
                modifiers,
                x,
                y,
                scroll_type,
                scroll_amount,
                wheel_rotation,
            )
        })
    }

    pub fn key_pressed(
        &mut self,
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    ) -> bool {
        self.with_input("handling key press", |i, t| {
            i.key_pressed(t, when_us, modifiers, key, ch, location)
        })
    }

    pub fn key_released(
        &mut self,
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    ) -> bool {
        self.with_input("handling key release", |i, t| {
            i.key_released(t, when_us, modifiers, key, ch, location)
        })
    }

    pub fn key_typed(
        &mut self,
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    ) -> bool {
        self.with_input("handling key typed", |i, t| {
            i.key_typed(t, when_us, modifiers, key, ch, location)
        })
    }
}

static_assertions::assert_impl_all!(RootController: Send);
