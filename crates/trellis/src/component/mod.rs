//! The component tree.
//!
//! [`ComponentTree`] is an arena of component nodes keyed by
//! [`ComponentId`]. A parent owns its children by id; each child holds a
//! non-owning id of its parent. The tree holds the root controller's
//! [`EventQueue`], so any live component can post repaint, layout and focus
//! requests directly.
//!
//! # Displayed and live
//!
//! A component is *live* when it is the tree root or a descendant of it.
//! It is *displayed* when it is live, visible, and its parent is displayed.
//! The displayed flag is maintained eagerly: every structural or visibility
//! change recomputes it for the affected subtree, short-circuiting at the
//! first node whose value does not flip, and each flip fires `Shown`/`Hidden`
//! and a `Displayed` property change.
//!
//! Non-live components never post paint, layout or focus requests; those
//! are dropped silently.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis::{ComponentTree, Rect};
//! use trellis_core::EventQueue;
//!
//! let mut tree = ComponentTree::new(Arc::new(EventQueue::new()));
//! let root = tree.create_root("root");
//! tree.set_bounds(root, Rect::new(0, 0, 200, 100)).unwrap();
//!
//! let button = tree.create_named("ok");
//! tree.add_child(root, button).unwrap();
//! tree.set_bounds(button, Rect::new(10, 10, 50, 20)).unwrap();
//!
//! assert!(tree.is_displayed(button));
//! assert_eq!(tree.absolute_bounds(button), Some(Rect::new(10, 10, 50, 20)));
//! assert_eq!(tree.component_at(root, 15, 15), Some(button));
//! ```

mod layout;
mod listeners;
mod paint;

use std::cell::Cell;
use std::sync::Arc;

use slotmap::SlotMap;
use trellis_core::logging::targets;
use trellis_core::{
    AncestorEvent, AncestorEventKind, ComponentEvent, ComponentEventKind, ComponentId, EventQueue,
    Property, Rect, TrellisError, TrellisResult,
};

use crate::events::{FocusEvent, KeyEvent, MouseEvent, MouseWheelEvent, PropertyChangeEvent};
use crate::style::{Color, Font, Style};

pub use layout::Layout;
pub use listeners::{
    AncestorListener, ComponentListener, FocusListener, KeyListener, ListenerId, MouseListener,
    MouseWheelListener, PaintListener, PropertyChangeListener,
};
pub use paint::{PaintContext, RenderContext};

use listeners::Listeners;

/// Storage for a single component.
pub(crate) struct ComponentNode {
    name: String,
    parent: Option<ComponentId>,
    /// Ordered by ascending layer, then insertion. The last child is frontmost.
    children: Vec<ComponentId>,
    layer: i32,
    /// Bounds relative to the parent's origin.
    bounds: Rect,
    /// Cached root-relative bounds; `None` when stale.
    absolute: Cell<Option<Rect>>,
    visible: bool,
    enabled: bool,
    displayed: bool,
    live: bool,
    needs_layout: bool,
    needs_paint: bool,
    style: Style,
    layout: Option<Arc<dyn Layout>>,
    listeners: Listeners,
}

impl ComponentNode {
    fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            layer: 0,
            bounds: Rect::ZERO,
            absolute: Cell::new(None),
            visible: true,
            enabled: true,
            displayed: false,
            live: false,
            needs_layout: true,
            needs_paint: true,
            style: Style::default(),
            layout: None,
            listeners: Listeners::default(),
        }
    }
}

/// Arena-backed scene graph of components.
pub struct ComponentTree {
    nodes: SlotMap<ComponentId, ComponentNode>,
    root: Option<ComponentId>,
    queue: Arc<EventQueue>,
}

impl ComponentTree {
    /// Create an empty tree posting to `queue`.
    pub fn new(queue: Arc<EventQueue>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            queue,
        }
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    // =========================================================================
    // Creation and lookup
    // =========================================================================

    /// Create a detached, unnamed component.
    pub fn create(&mut self) -> ComponentId {
        self.create_named("")
    }

    /// Create a detached component with a name used in diagnostics.
    pub fn create_named(&mut self, name: impl Into<String>) -> ComponentId {
        let id = self.nodes.insert(ComponentNode::new(name.into()));
        tracing::trace!(target: targets::TREE, ?id, "component created");
        id
    }

    /// Create a component and make it the live root of this tree.
    pub fn create_root(&mut self, name: impl Into<String>) -> ComponentId {
        let id = self.create_named(name);
        self.attach_root(id);
        id
    }

    /// Make an existing parentless component the root, detaching any previous root.
    pub fn set_root(&mut self, id: ComponentId) -> TrellisResult<()> {
        let node = self.node(id)?;
        if node.parent.is_some() {
            return Err(TrellisError::RootHasParent(id));
        }
        if self.root != Some(id) {
            self.attach_root(id);
        }
        Ok(())
    }

    fn attach_root(&mut self, id: ComponentId) {
        if let Some(old) = self.root.take() {
            self.set_live_subtree(old, false);
            self.update_displayed(old);
        }
        self.root = Some(id);
        self.invalidate_absolute(id);
        self.set_live_subtree(id, true);
        self.update_displayed(id);
        self.invalidate_layout(id);
        self.repaint(id);
        tracing::debug!(target: targets::TREE, ?id, "root attached");
    }

    /// The live root, if one is attached.
    pub fn root(&self) -> Option<ComponentId> {
        self.root
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: ComponentId) -> TrellisResult<&ComponentNode> {
        self.nodes.get(id).ok_or(TrellisError::InvalidComponent(id))
    }

    fn node_mut(&mut self, id: ComponentId) -> TrellisResult<&mut ComponentNode> {
        self.nodes.get_mut(id).ok_or(TrellisError::InvalidComponent(id))
    }

    /// Remove a component and its whole subtree from the arena.
    ///
    /// The subtree is detached first, so listeners see `Hidden` and the
    /// focus and mouse state revalidate on the next drain.
    pub fn destroy(&mut self, id: ComponentId) -> TrellisResult<()> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.remove_child(parent, id)?;
        } else if self.root == Some(id) {
            self.root = None;
            self.set_live_subtree(id, false);
            self.update_displayed(id);
        }
        let doomed = self.descendants_inclusive(id);
        tracing::trace!(target: targets::TREE, ?id, count = doomed.len(), "destroying subtree");
        for victim in doomed {
            self.nodes.remove(victim);
        }
        Ok(())
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append `child` under `parent` at the child's current layer.
    ///
    /// Adding a child that is already present is a no-op. A child with a
    /// different parent is moved.
    pub fn add_child(&mut self, parent: ComponentId, child: ComponentId) -> TrellisResult<()> {
        let layer = self.node(child)?.layer;
        if self.node(child)?.parent == Some(parent) {
            self.node(parent)?;
            return Ok(());
        }
        self.add_child_at_layer(parent, child, layer)
    }

    /// Insert `child` under `parent` at `layer`, after any siblings with the
    /// same or lower layer.
    pub fn add_child_at_layer(
        &mut self,
        parent: ComponentId,
        child: ComponentId,
        layer: i32,
    ) -> TrellisResult<()> {
        self.node(parent)?;
        let old_parent = self.node(child)?.parent;
        if self.root == Some(child) {
            return Err(TrellisError::RootHasParent(child));
        }
        if self.is_descendant_of(parent, child) {
            return Err(TrellisError::CircularParentage { parent, child });
        }
        if old_parent == Some(parent) {
            return self.set_layer(child, layer);
        }
        if let Some(old_parent) = old_parent {
            self.remove_child(old_parent, child)?;
        }

        {
            let node = self.node_mut(child)?;
            node.parent = Some(parent);
            node.layer = layer;
        }
        self.insert_sorted(parent, child, layer);
        let parent_live = self.node(parent)?.live;

        self.invalidate_absolute(child);
        self.set_live_subtree(child, parent_live);
        if parent_live {
            for source in self.descendants_inclusive(child) {
                self.queue.fire_ancestor_event(AncestorEvent {
                    source,
                    ancestor: parent,
                    kind: AncestorEventKind::Added,
                });
            }
        }
        self.update_displayed(child);
        self.invalidate_layout(parent);
        self.repaint(child);
        tracing::trace!(target: targets::TREE, ?parent, ?child, layer, "child added");
        Ok(())
    }

    fn insert_sorted(&mut self, parent: ComponentId, child: ComponentId, layer: i32) {
        let position = {
            let Some(parent_node) = self.nodes.get(parent) else {
                return;
            };
            parent_node
                .children
                .iter()
                .rposition(|c| self.nodes.get(*c).is_some_and(|n| n.layer <= layer))
                .map_or(0, |p| p + 1)
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.insert(position, child);
        }
    }

    /// Detach `child` from `parent`. Removing a non-child is a no-op.
    pub fn remove_child(&mut self, parent: ComponentId, child: ComponentId) -> TrellisResult<()> {
        self.node(parent)?;
        let node = self.node(child)?;
        if node.parent != Some(parent) {
            return Ok(());
        }
        let was_live = node.live;
        // Collected before detaching so the notifications still name live components.
        let subtree = if was_live {
            self.descendants_inclusive(child)
        } else {
            Vec::new()
        };

        self.node_mut(parent)?.children.retain(|c| *c != child);
        self.node_mut(child)?.parent = None;
        self.invalidate_absolute(child);
        self.set_live_subtree(child, false);
        self.update_displayed(child);

        for source in subtree {
            self.queue.fire_ancestor_event(AncestorEvent {
                source,
                ancestor: parent,
                kind: AncestorEventKind::Removed,
            });
        }
        self.invalidate_layout(parent);
        self.repaint(parent);
        tracing::trace!(target: targets::TREE, ?parent, ?child, "child removed");
        Ok(())
    }

    /// Detach every child of `parent`.
    pub fn clear_children(&mut self, parent: ComponentId) -> TrellisResult<()> {
        let children = self.node(parent)?.children.clone();
        for child in children {
            self.remove_child(parent, child)?;
        }
        Ok(())
    }

    /// Move a component to another layer within its parent.
    pub fn set_layer(&mut self, id: ComponentId, layer: i32) -> TrellisResult<()> {
        let node = self.node_mut(id)?;
        if node.layer == layer {
            return Ok(());
        }
        node.layer = layer;
        if let Some(parent) = node.parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
            self.insert_sorted(parent, id, layer);
            self.repaint(parent);
        }
        Ok(())
    }

    pub fn layer(&self, id: ComponentId) -> Option<i32> {
        self.nodes.get(id).map(|n| n.layer)
    }

    /// Children in paint order (back to front).
    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// True when `id` is `ancestor` or lies below it.
    pub fn is_descendant_of(&self, id: ComponentId, ancestor: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.nodes.get(c).and_then(|n| n.parent);
        }
        false
    }

    /// True when `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        ancestor != id && self.is_descendant_of(id, ancestor)
    }

    /// `id` and all its descendants in pre-order.
    pub fn descendants_inclusive(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Set bounds relative to the parent.
    ///
    /// Moving fires `Moved` to the component and an ancestor `Moved` to its
    /// descendants; resizing does the same with `Resized` and requests a
    /// layout of the component.
    pub fn set_bounds(&mut self, id: ComponentId, bounds: Rect) -> TrellisResult<()> {
        let node = self.node_mut(id)?;
        let old = node.bounds;
        if old == bounds {
            return Ok(());
        }
        node.bounds = bounds;
        let live = node.live;
        self.invalidate_absolute(id);

        let moved = old.origin() != bounds.origin();
        let resized = old.size() != bounds.size();
        if live {
            let descendants: Vec<_> = self.descendants_inclusive(id).into_iter().skip(1).collect();
            if moved {
                self.fire_component_event(id, ComponentEventKind::Moved);
                for &source in &descendants {
                    self.queue.fire_ancestor_event(AncestorEvent {
                        source,
                        ancestor: id,
                        kind: AncestorEventKind::Moved,
                    });
                }
            }
            if resized {
                self.fire_component_event(id, ComponentEventKind::Resized);
                for &source in &descendants {
                    self.queue.fire_ancestor_event(AncestorEvent {
                        source,
                        ancestor: id,
                        kind: AncestorEventKind::Resized,
                    });
                }
            }
        }
        if resized {
            self.invalidate_layout(id);
        }
        self.repaint(id);
        Ok(())
    }

    pub fn set_location(&mut self, id: ComponentId, x: i32, y: i32) -> TrellisResult<()> {
        let bounds = self.node(id)?.bounds.with_origin(x, y);
        self.set_bounds(id, bounds)
    }

    pub fn set_size(&mut self, id: ComponentId, width: i32, height: i32) -> TrellisResult<()> {
        let bounds = self.node(id)?.bounds.with_size(width, height);
        self.set_bounds(id, bounds)
    }

    /// Bounds relative to the parent.
    pub fn bounds(&self, id: ComponentId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.bounds)
    }

    /// Bounds relative to the top of the component's tree, cached until a
    /// move, resize or reparent invalidates them.
    pub fn absolute_bounds(&self, id: ComponentId) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        if let Some(cached) = node.absolute.get() {
            return Some(cached);
        }
        let absolute = match node.parent {
            Some(parent) => {
                let parent_abs = self.absolute_bounds(parent)?;
                node.bounds.translate(parent_abs.x(), parent_abs.y())
            }
            None => node.bounds,
        };
        node.absolute.set(Some(absolute));
        Some(absolute)
    }

    fn invalidate_absolute(&mut self, id: ComponentId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            // A cached child implies a cached parent, so stale nodes have stale subtrees.
            if node.absolute.take().is_none() && current != id {
                continue;
            }
            stack.extend(node.children.iter().copied());
        }
    }

    // =========================================================================
    // Visibility, enablement and derived state
    // =========================================================================

    pub fn set_visible(&mut self, id: ComponentId, visible: bool) -> TrellisResult<()> {
        let node = self.node_mut(id)?;
        if node.visible == visible {
            return Ok(());
        }
        node.visible = visible;
        let parent = node.parent;
        self.update_displayed(id);
        if let Some(parent) = parent {
            self.invalidate_layout(parent);
            self.repaint(parent);
        }
        Ok(())
    }

    pub fn set_enabled(&mut self, id: ComponentId, enabled: bool) -> TrellisResult<()> {
        let node = self.node_mut(id)?;
        if node.enabled == enabled {
            return Ok(());
        }
        node.enabled = enabled;
        let live = node.live;
        if live {
            self.queue
                .fire_property_change(id, Property::Enabled, !enabled, enabled);
        }
        self.repaint(id);
        Ok(())
    }

    pub fn is_visible(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    pub fn is_enabled(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.enabled)
    }

    /// Live, visible, and every ancestor displayed.
    pub fn is_displayed(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.displayed)
    }

    /// Attached (transitively) to the root.
    pub fn is_live(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.live)
    }

    /// Has a mouse-family listener, is enabled and displayed.
    pub fn is_mouse_focusable(&self, id: ComponentId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.listeners.has_mouse() && n.enabled && n.displayed)
    }

    /// Has a key listener, is enabled and displayed.
    pub fn is_keyboard_focusable(&self, id: ComponentId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.listeners.has_key() && n.enabled && n.displayed)
    }

    pub fn has_mouse_listener(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.listeners.has_mouse())
    }

    pub fn has_key_listener(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.listeners.has_key())
    }

    fn set_live_subtree(&mut self, id: ComponentId, live: bool) {
        // Liveness is uniform across a subtree, so one check at the top suffices.
        if self.nodes.get(id).is_none_or(|n| n.live == live) {
            return;
        }
        for current in self.descendants_inclusive(id) {
            if let Some(node) = self.nodes.get_mut(current) {
                node.live = live;
            }
        }
    }

    /// Recompute the displayed flag below and including `id`.
    fn update_displayed(&mut self, id: ComponentId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let parent_displayed = match self.nodes.get(current).and_then(|n| n.parent) {
                Some(parent) => self.is_displayed(parent),
                None => true,
            };
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            let displayed = node.live && node.visible && parent_displayed;
            if displayed == node.displayed {
                continue;
            }
            node.displayed = displayed;
            stack.extend(node.children.iter().rev().copied());

            let kind = if displayed {
                ComponentEventKind::Shown
            } else {
                ComponentEventKind::Hidden
            };
            self.queue.fire_component_event(ComponentEvent {
                source: current,
                kind,
            });
            self.queue
                .fire_property_change(current, Property::Displayed, !displayed, displayed);
        }
    }

    fn fire_component_event(&self, source: ComponentId, kind: ComponentEventKind) {
        self.queue
            .fire_component_event(ComponentEvent { source, kind });
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Mark the component dirty and request a repaint of the tree.
    pub fn repaint(&mut self, id: ComponentId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.needs_paint = true;
            if node.live {
                self.queue.fire_paint(id);
            }
        }
    }

    /// Mark the component's layout stale and request a layout pass.
    pub fn invalidate_layout(&mut self, id: ComponentId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.needs_layout = true;
            if node.live {
                self.queue.fire_layout(id);
            }
        }
    }

    pub fn needs_paint(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.needs_paint)
    }

    pub fn needs_layout(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.needs_layout)
    }

    /// Ask for keyboard focus.
    ///
    /// Returns false when the component is not live or not keyboard
    /// focusable; otherwise the request is queued and may still be refused
    /// (for example when it lies outside the active modal root).
    pub fn request_focus(&mut self, id: ComponentId) -> bool {
        if !self.is_live(id) || !self.is_keyboard_focusable(id) {
            return false;
        }
        self.queue.fire_request_focus(id);
        true
    }

    /// Move focus to the next component in traversal order, if `id` owns it.
    pub fn transfer_focus_forward(&mut self, id: ComponentId) {
        if self.is_live(id) {
            self.queue.fire_transfer_focus_forward(id);
        }
    }

    pub fn transfer_focus_backward(&mut self, id: ComponentId) {
        if self.is_live(id) {
            self.queue.fire_transfer_focus_backward(id);
        }
    }

    /// Make `id` the modal input root until [`stop_modal`](Self::stop_modal).
    pub fn start_modal(&mut self, id: ComponentId) {
        if self.is_live(id) {
            self.queue.fire_push_input_root(id);
        }
    }

    pub fn stop_modal(&mut self, id: ComponentId) {
        if self.is_live(id) {
            self.queue.fire_pop_input_root(id);
        }
    }

    // =========================================================================
    // Styling
    // =========================================================================

    pub fn set_name(&mut self, id: ComponentId, name: impl Into<String>) -> TrellisResult<()> {
        self.node_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn name(&self, id: ComponentId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    pub fn set_foreground(&mut self, id: ComponentId, color: Color) -> TrellisResult<()> {
        self.node_mut(id)?.style.foreground = color;
        self.repaint(id);
        Ok(())
    }

    pub fn set_background(&mut self, id: ComponentId, color: Color) -> TrellisResult<()> {
        self.node_mut(id)?.style.background = color;
        self.repaint(id);
        Ok(())
    }

    pub fn set_font(&mut self, id: ComponentId, font: Option<Font>) -> TrellisResult<()> {
        self.node_mut(id)?.style.font = font;
        self.invalidate_layout(id);
        self.repaint(id);
        Ok(())
    }

    pub fn style(&self, id: ComponentId) -> Option<&Style> {
        self.nodes.get(id).map(|n| &n.style)
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn add_component_listener<F>(&mut self, id: ComponentId, f: F) -> TrellisResult<ListenerId>
    where
        F: Fn(&mut ComponentTree, &ComponentEvent) + Send + Sync + 'static,
    {
        Ok(self.node_mut(id)?.listeners.component.push(Arc::new(f)))
    }

    pub fn add_ancestor_listener<F>(&mut self, id: ComponentId, f: F) -> TrellisResult<ListenerId>
    where
        F: Fn(&mut ComponentTree, &AncestorEvent) + Send + Sync + 'static,
    {
        Ok(self.node_mut(id)?.listeners.ancestor.push(Arc::new(f)))
    }

    pub fn add_focus_listener<F>(&mut self, id: ComponentId, f: F) -> TrellisResult<ListenerId>
    where
        F: Fn(&mut ComponentTree, &FocusEvent) + Send + Sync + 'static,
    {
        Ok(self.node_mut(id)?.listeners.focus.push(Arc::new(f)))
    }

    pub fn add_property_change_listener<F>(
        &mut self,
        id: ComponentId,
        f: F,
    ) -> TrellisResult<ListenerId>
    where
        F: Fn(&mut ComponentTree, &PropertyChangeEvent) + Send + Sync + 'static,
    {
        Ok(self.node_mut(id)?.listeners.property.push(Arc::new(f)))
    }

    pub fn add_paint_listener<F>(&mut self, id: ComponentId, f: F) -> TrellisResult<ListenerId>
    where
        F: Fn(&PaintContext<'_>, &mut dyn RenderContext) + Send + Sync + 'static,
    {
        let listener = self.node_mut(id)?.listeners.paint.push(Arc::new(f));
        self.repaint(id);
        Ok(listener)
    }

    /// Receive press, release, click, enter and exit events.
    pub fn add_mouse_listener<F>(&mut self, id: ComponentId, f: F) -> TrellisResult<ListenerId>
    where
        F: Fn(&mut ComponentTree, &mut MouseEvent) + Send + Sync + 'static,
    {
        self.mutate_listeners(id, |l| l.mouse.push(Arc::new(f)))
    }

    /// Receive move and drag events.
    pub fn add_mouse_motion_listener<F>(
        &mut self,
        id: ComponentId,
        f: F,
    ) -> TrellisResult<ListenerId>
    where
        F: Fn(&mut ComponentTree, &mut MouseEvent) + Send + Sync + 'static,
    {
        self.mutate_listeners(id, |l| l.mouse_motion.push(Arc::new(f)))
    }

    pub fn add_mouse_wheel_listener<F>(
        &mut self,
        id: ComponentId,
        f: F,
    ) -> TrellisResult<ListenerId>
    where
        F: Fn(&mut ComponentTree, &mut MouseWheelEvent) + Send + Sync + 'static,
    {
        self.mutate_listeners(id, |l| l.mouse_wheel.push(Arc::new(f)))
    }

    pub fn add_key_listener<F>(&mut self, id: ComponentId, f: F) -> TrellisResult<ListenerId>
    where
        F: Fn(&mut ComponentTree, &mut KeyEvent) + Send + Sync + 'static,
    {
        self.mutate_listeners(id, |l| l.key.push(Arc::new(f)))
    }

    /// Remove a listener of any kind. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ComponentId, listener: ListenerId) -> TrellisResult<bool> {
        self.mutate_listeners(id, |l| l.remove(listener))
    }

    /// Run a listener-set mutation and broadcast any resulting change of the
    /// has-mouse-listener or has-key-listener flags.
    fn mutate_listeners<R>(
        &mut self,
        id: ComponentId,
        mutate: impl FnOnce(&mut Listeners) -> R,
    ) -> TrellisResult<R> {
        let node = self.node_mut(id)?;
        let (had_mouse, had_key) = (node.listeners.has_mouse(), node.listeners.has_key());
        let result = mutate(&mut node.listeners);
        let (has_mouse, has_key) = (node.listeners.has_mouse(), node.listeners.has_key());
        let live = node.live;
        if live {
            if had_mouse != has_mouse {
                self.queue
                    .fire_property_change(id, Property::HasMouseListener, had_mouse, has_mouse);
            }
            if had_key != has_key {
                self.queue
                    .fire_property_change(id, Property::HasKeyListener, had_key, has_key);
            }
        }
        Ok(result)
    }

    pub fn listener_count(&self, id: ComponentId) -> usize {
        self.nodes.get(id).map_or(0, |n| n.listeners.count())
    }

    // =========================================================================
    // Dispatch (controller thread)
    // =========================================================================

    pub(crate) fn dispatch_component_event(&mut self, event: &ComponentEvent) {
        let Some(node) = self.nodes.get(event.source) else {
            return;
        };
        for listener in node.listeners.component.snapshot() {
            listener(self, event);
        }
    }

    pub(crate) fn dispatch_ancestor_event(&mut self, event: &AncestorEvent) {
        let Some(node) = self.nodes.get(event.source) else {
            return;
        };
        for listener in node.listeners.ancestor.snapshot() {
            listener(self, event);
        }
    }

    pub(crate) fn dispatch_property_change(&mut self, event: &PropertyChangeEvent) {
        let Some(node) = self.nodes.get(event.source) else {
            return;
        };
        for listener in node.listeners.property.snapshot() {
            listener(self, event);
        }
    }

    pub(crate) fn dispatch_focus_event(&mut self, event: &FocusEvent) {
        let Some(node) = self.nodes.get(event.source) else {
            return;
        };
        for listener in node.listeners.focus.snapshot() {
            listener(self, event);
        }
        self.repaint(event.source);
    }

    /// Deliver to mouse or mouse-motion listeners; returns whether accepted.
    pub(crate) fn dispatch_mouse_event(&mut self, event: &mut MouseEvent) -> bool {
        let Some(node) = self.nodes.get(event.source) else {
            return false;
        };
        let listeners = if event.kind.is_motion() {
            node.listeners.mouse_motion.snapshot()
        } else {
            node.listeners.mouse.snapshot()
        };
        for listener in listeners {
            listener(self, event);
        }
        event.is_accepted()
    }

    pub(crate) fn dispatch_mouse_wheel_event(&mut self, event: &mut MouseWheelEvent) -> bool {
        let Some(node) = self.nodes.get(event.source) else {
            return false;
        };
        for listener in node.listeners.mouse_wheel.snapshot() {
            listener(self, event);
        }
        event.is_accepted()
    }

    pub(crate) fn dispatch_key_event(&mut self, event: &mut KeyEvent) -> bool {
        let Some(node) = self.nodes.get(event.source) else {
            return false;
        };
        for listener in node.listeners.key.snapshot() {
            listener(self, event);
            if event.is_accepted() {
                break;
            }
        }
        event.is_accepted()
    }
}

static_assertions::assert_impl_all!(ComponentTree: Send);

#[cfg(test)]
mod tests;
