//! Listener slots attached to each component.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::ComponentTree;
use super::paint::{PaintContext, RenderContext};
use crate::events::{
    AncestorEvent, ComponentEvent, FocusEvent, KeyEvent, MouseEvent, MouseWheelEvent,
    PropertyChangeEvent,
};

/// A unique identifier for a registered listener, used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

fn next_listener_id() -> ListenerId {
    ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
}

pub type ComponentListener = Arc<dyn Fn(&mut ComponentTree, &ComponentEvent) + Send + Sync>;
pub type AncestorListener = Arc<dyn Fn(&mut ComponentTree, &AncestorEvent) + Send + Sync>;
pub type FocusListener = Arc<dyn Fn(&mut ComponentTree, &FocusEvent) + Send + Sync>;
/// Receives press, release, click, enter and exit (mouse listeners) or
/// move and drag (mouse-motion listeners).
pub type MouseListener = Arc<dyn Fn(&mut ComponentTree, &mut MouseEvent) + Send + Sync>;
pub type MouseWheelListener = Arc<dyn Fn(&mut ComponentTree, &mut MouseWheelEvent) + Send + Sync>;
pub type KeyListener = Arc<dyn Fn(&mut ComponentTree, &mut KeyEvent) + Send + Sync>;
pub type PropertyChangeListener =
    Arc<dyn Fn(&mut ComponentTree, &PropertyChangeEvent) + Send + Sync>;
/// Paint callbacks draw through the render context with the component's
/// viewport already set.
pub type PaintListener = Arc<dyn Fn(&PaintContext<'_>, &mut dyn RenderContext) + Send + Sync>;

/// An ordered list of listeners of one kind.
pub(crate) struct Slot<L> {
    entries: Vec<(ListenerId, L)>,
}

impl<L> Default for Slot<L> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<L: Clone> Slot<L> {
    pub(crate) fn push(&mut self, listener: L) -> ListenerId {
        let id = next_listener_id();
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(lid, _)| *lid != id);
        self.entries.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Snapshot for invocation; listeners may mutate the tree while running.
    pub(crate) fn snapshot(&self) -> Vec<L> {
        self.entries.iter().map(|(_, l)| l.clone()).collect()
    }
}

/// All listener slots of a component.
#[derive(Default)]
pub(crate) struct Listeners {
    pub(crate) component: Slot<ComponentListener>,
    pub(crate) ancestor: Slot<AncestorListener>,
    pub(crate) focus: Slot<FocusListener>,
    pub(crate) paint: Slot<PaintListener>,
    pub(crate) mouse: Slot<MouseListener>,
    pub(crate) mouse_motion: Slot<MouseListener>,
    pub(crate) mouse_wheel: Slot<MouseWheelListener>,
    pub(crate) key: Slot<KeyListener>,
    pub(crate) property: Slot<PropertyChangeListener>,
}

impl Listeners {
    /// Whether any mouse-family listener is registered.
    pub(crate) fn has_mouse(&self) -> bool {
        !(self.mouse.is_empty() && self.mouse_motion.is_empty() && self.mouse_wheel.is_empty())
    }

    pub(crate) fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Remove `id` from whichever slot holds it.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        self.component.remove(id)
            || self.ancestor.remove(id)
            || self.focus.remove(id)
            || self.paint.remove(id)
            || self.mouse.remove(id)
            || self.mouse_motion.remove(id)
            || self.mouse_wheel.remove(id)
            || self.key.remove(id)
            || self.property.remove(id)
    }

    pub(crate) fn count(&self) -> usize {
        self.component.len()
            + self.ancestor.len()
            + self.focus.len()
            + self.paint.len()
            + self.mouse.len()
            + self.mouse_motion.len()
            + self.mouse_wheel.len()
            + self.key.len()
            + self.property.len()
    }
}
