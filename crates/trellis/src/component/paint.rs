//! The render context contract and the recursive paint pass.

use std::panic::{AssertUnwindSafe, catch_unwind};

use trellis_core::logging::targets;
use trellis_core::{ComponentId, Rect, TrellisError, panic_message};

use super::ComponentTree;
use crate::style::Style;

/// An opaque rendering backend.
///
/// Viewports are given in surface coordinates with the origin at the
/// bottom-left corner and y pointing up; component bounds use a top-left
/// origin, so the paint pass flips them against the surface height.
pub trait RenderContext {
    /// Save the current render state.
    fn push_state(&mut self);
    /// Restore the most recently saved render state.
    fn pop_state(&mut self);
    /// Restrict drawing to `viewport`.
    fn set_viewport(&mut self, viewport: Rect);
    /// Set an orthographic projection mapping `width` x `height` units onto
    /// the current viewport.
    fn set_projection(&mut self, width: i32, height: i32);
}

/// What a paint callback sees of the component being painted.
pub struct PaintContext<'a> {
    pub tree: &'a ComponentTree,
    pub component: ComponentId,
    /// Local bounds: origin at zero, the component's size.
    pub bounds: Rect,
    /// Root-relative bounds.
    pub absolute: Rect,
    pub style: &'a Style,
}

/// Convert root-relative bounds (top-left origin) to surface coordinates
/// (bottom-left origin).
pub(crate) fn to_surface(absolute: Rect, surface_height: i32) -> Rect {
    Rect::new(
        absolute.x(),
        surface_height - absolute.max_y(),
        absolute.width(),
        absolute.height(),
    )
}

/// Counts the states one paint callback pushes so they can be popped
/// again if it returns, or unwinds, without balancing them.
struct BalancedContext<'a> {
    inner: &'a mut dyn RenderContext,
    depth: usize,
}

impl<'a> BalancedContext<'a> {
    fn new(inner: &'a mut dyn RenderContext) -> Self {
        Self { inner, depth: 0 }
    }

    /// Pop whatever the callback left pushed, returning how many.
    fn unwind(&mut self) -> usize {
        let leaked = self.depth;
        for _ in 0..leaked {
            self.inner.pop_state();
        }
        self.depth = 0;
        leaked
    }
}

impl RenderContext for BalancedContext<'_> {
    fn push_state(&mut self) {
        self.depth += 1;
        self.inner.push_state();
    }

    fn pop_state(&mut self) {
        // States saved outside the callback are not its to restore.
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        self.inner.pop_state();
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.inner.set_viewport(viewport);
    }

    fn set_projection(&mut self, width: i32, height: i32) {
        self.inner.set_projection(width, height);
    }
}

impl ComponentTree {
    /// Paint `id` and its displayed descendants, back to front.
    ///
    /// A panicking paint callback is reported and skipped; the rest of the
    /// frame still paints. Render states a callback leaves pushed are popped
    /// before the next callback runs.
    pub fn process_paint(
        &mut self,
        id: ComponentId,
        ctx: &mut dyn RenderContext,
        surface_height: i32,
    ) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.displayed {
            return;
        }
        node.needs_paint = false;
        let listeners = node.listeners.paint.snapshot();
        let children = node.children.clone();
        let Some(absolute) = self.absolute_bounds(id) else {
            return;
        };

        ctx.push_state();
        ctx.set_viewport(to_surface(absolute, surface_height));
        ctx.set_projection(absolute.width(), absolute.height());

        if !listeners.is_empty() {
            let tree: &ComponentTree = self;
            let style = tree.nodes.get(id).map(|n| n.style.clone()).unwrap_or_default();
            let paint_ctx = PaintContext {
                tree,
                component: id,
                bounds: Rect::new(0, 0, absolute.width(), absolute.height()),
                absolute,
                style: &style,
            };
            for listener in listeners {
                let mut balanced = BalancedContext::new(&mut *ctx);
                let result = catch_unwind(AssertUnwindSafe(|| listener(&paint_ctx, &mut balanced)));
                let leaked = balanced.unwind();
                if leaked > 0 {
                    tracing::debug!(target: targets::PAINT, ?id, leaked, "unbalanced render state popped");
                }
                if let Err(payload) = result {
                    tracing::warn!(target: targets::PAINT, ?id, "paint callback panicked");
                    tree.queue.report_fault(&TrellisError::Panicked {
                        context: format!("painting {id:?}"),
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        }

        for child in children {
            self.process_paint(child, ctx, surface_height);
        }
        ctx.pop_state();
    }
}
