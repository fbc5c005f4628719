//! Records carried through the event queue.

use std::fmt;

use crate::id::ComponentId;
use crate::input::RawInput;

/// Priority buckets of the event queue, drained in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum QueuePriority {
    /// Repaint requests.
    Paint = 0,
    /// Layout requests.
    Layout = 1,
    /// Everything else: focus, modal, component notifications, raw input, runnables.
    Normal = 2,
}

/// What a component event reports about its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentEventKind {
    Moved,
    Resized,
    Shown,
    Hidden,
}

/// A change to a component's own geometry or displayed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentEvent {
    pub source: ComponentId,
    pub kind: ComponentEventKind,
}

/// What an ancestor event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AncestorEventKind {
    /// The source (or one of its ancestors) was attached under `ancestor`.
    Added,
    /// The source (or one of its ancestors) was detached from `ancestor`.
    Removed,
    /// `ancestor` moved.
    Moved,
    /// `ancestor` was resized.
    Resized,
}

/// A change to one of the source's ancestors, delivered to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AncestorEvent {
    pub source: ComponentId,
    pub ancestor: ComponentId,
    pub kind: AncestorEventKind,
}

/// Properties whose changes are broadcast; all of them affect focusability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Enabled,
    Displayed,
    HasMouseListener,
    HasKeyListener,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::Enabled => "enabled",
            Property::Displayed => "displayed",
            Property::HasMouseListener => "hasMouseListener",
            Property::HasKeyListener => "hasKeyListener",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyChangeEvent {
    pub source: ComponentId,
    pub property: Property,
    pub old_value: bool,
    pub new_value: bool,
}

/// Direction of a focus traversal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusDirection {
    Forward,
    Backward,
}

/// Target of a layout request after coalescing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutScope {
    /// Lay out the subtree under one component.
    Component(ComponentId),
    /// Several distinct sources asked; lay out the whole tree from its root.
    Tree,
}

/// A closure queued for execution on the controller thread.
pub type Runnable = Box<dyn FnOnce() + Send + 'static>;

/// One item pending in the event queue.
pub enum QueuedEvent {
    Paint(ComponentId),
    Layout(LayoutScope),
    RequestFocus(ComponentId),
    TransferFocus {
        source: ComponentId,
        direction: FocusDirection,
    },
    PushInputRoot(ComponentId),
    PopInputRoot(ComponentId),
    Component(ComponentEvent),
    Ancestor(AncestorEvent),
    PropertyChange(PropertyChangeEvent),
    Input(RawInput),
    Runnable(Runnable),
}

impl QueuedEvent {
    /// The bucket this item belongs to.
    pub fn priority(&self) -> QueuePriority {
        match self {
            Self::Paint(_) => QueuePriority::Paint,
            Self::Layout(_) => QueuePriority::Layout,
            _ => QueuePriority::Normal,
        }
    }

    /// Short description used in logs and fault reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Paint(id) => format!("paint request from {id:?}"),
            Self::Layout(scope) => format!("layout of {scope:?}"),
            Self::RequestFocus(id) => format!("focus request from {id:?}"),
            Self::TransferFocus { source, direction } => {
                format!("{direction:?} focus transfer from {source:?}")
            }
            Self::PushInputRoot(id) => format!("input root push of {id:?}"),
            Self::PopInputRoot(id) => format!("input root pop of {id:?}"),
            Self::Component(e) => format!("{:?} event on {:?}", e.kind, e.source),
            Self::Ancestor(e) => format!("ancestor {:?} event on {:?}", e.kind, e.source),
            Self::PropertyChange(e) => format!("{} change on {:?}", e.property, e.source),
            Self::Input(input) => format!("raw input at {}us", input.when_us()),
            Self::Runnable(_) => "runnable".to_string(),
        }
    }
}

impl fmt::Debug for QueuedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paint(id) => f.debug_tuple("Paint").field(id).finish(),
            Self::Layout(scope) => f.debug_tuple("Layout").field(scope).finish(),
            Self::RequestFocus(id) => f.debug_tuple("RequestFocus").field(id).finish(),
            Self::TransferFocus { source, direction } => f
                .debug_struct("TransferFocus")
                .field("source", source)
                .field("direction", direction)
                .finish(),
            Self::PushInputRoot(id) => f.debug_tuple("PushInputRoot").field(id).finish(),
            Self::PopInputRoot(id) => f.debug_tuple("PopInputRoot").field(id).finish(),
            Self::Component(e) => f.debug_tuple("Component").field(e).finish(),
            Self::Ancestor(e) => f.debug_tuple("Ancestor").field(e).finish(),
            Self::PropertyChange(e) => f.debug_tuple("PropertyChange").field(e).finish(),
            Self::Input(input) => f.debug_tuple("Input").field(input).finish(),
            Self::Runnable(_) => f.write_str("Runnable(..)"),
        }
    }
}
