//! Events delivered to component listeners.
//!
//! Component, ancestor and property-change notifications travel through the
//! event queue and are re-exported from `trellis_core`. Focus, mouse and key
//! events are produced synchronously by the input controller and carry an
//! [`EventBase`] so a listener can mark them accepted (consumed).

use trellis_core::{ComponentId, Key, KeyLocation, Modifiers, MouseButton, ScrollType};

pub use trellis_core::{
    AncestorEvent, AncestorEventKind, ComponentEvent, ComponentEventKind, Property,
    PropertyChangeEvent,
};

/// Common data for consumable events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventBase {
    /// Whether the event has been accepted (consumed).
    accepted: bool,
}

impl EventBase {
    pub fn new() -> Self {
        Self { accepted: false }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accept the event, stopping later processing stages.
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    pub fn ignore(&mut self) {
        self.accepted = false;
    }
}

/// Kinds of focus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusEventKind {
    Gained,
    Lost,
}

/// Sent to a component when it gains or loses keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    pub kind: FocusEventKind,
    pub source: ComponentId,
    /// The component on the other side of the transfer, if any.
    pub opposite: Option<ComponentId>,
}

/// Kinds of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Pressed,
    Released,
    Clicked,
    Moved,
    Dragged,
    Entered,
    Exited,
}

impl MouseEventKind {
    /// Motion events go to mouse-motion listeners, the rest to mouse listeners.
    pub fn is_motion(self) -> bool {
        matches!(self, MouseEventKind::Moved | MouseEventKind::Dragged)
    }
}

/// A mouse event in the target component's local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub base: EventBase,
    pub kind: MouseEventKind,
    pub source: ComponentId,
    pub when_us: u64,
    pub modifiers: Modifiers,
    /// Pointer position relative to the source's origin.
    pub x: i32,
    pub y: i32,
    /// Pointer position relative to the root.
    pub root_x: i32,
    pub root_y: i32,
    /// The button that changed, for press/release/click.
    pub button: Option<MouseButton>,
    pub click_count: u32,
    pub popup_trigger: bool,
}

impl MouseEvent {
    pub fn accept(&mut self) {
        self.base.accept();
    }

    pub fn is_accepted(&self) -> bool {
        self.base.is_accepted()
    }

    pub fn point(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// A wheel rotation, delivered to the component under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseWheelEvent {
    pub base: EventBase,
    pub source: ComponentId,
    pub when_us: u64,
    pub modifiers: Modifiers,
    pub x: i32,
    pub y: i32,
    pub root_x: i32,
    pub root_y: i32,
    pub scroll_type: ScrollType,
    pub scroll_amount: i32,
    /// Notches rotated; positive means toward the user (scroll down).
    pub wheel_rotation: i32,
}

impl MouseWheelEvent {
    pub fn accept(&mut self) {
        self.base.accept();
    }

    pub fn is_accepted(&self) -> bool {
        self.base.is_accepted()
    }

    /// Units to scroll for a unit scroll; zero for block scrolls.
    pub fn units_to_scroll(&self) -> i32 {
        match self.scroll_type {
            ScrollType::Unit => self.scroll_amount * self.wheel_rotation,
            ScrollType::Block => 0,
        }
    }
}

/// Kinds of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Pressed,
    Released,
    Typed,
}

/// A key event, routed to the focus owner.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub base: EventBase,
    pub kind: KeyEventKind,
    pub source: ComponentId,
    pub when_us: u64,
    pub modifiers: Modifiers,
    pub key: Key,
    /// The character produced, if any.
    pub ch: Option<char>,
    pub location: KeyLocation,
}

impl KeyEvent {
    pub fn accept(&mut self) {
        self.base.accept();
    }

    pub fn is_accepted(&self) -> bool {
        self.base.is_accepted()
    }
}
