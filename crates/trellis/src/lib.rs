//! Trellis - a retained-mode component toolkit core.
//!
//! Trellis keeps a tree of rectangular components and turns raw host input
//! into component events with correct focus ownership, modal scoping, mouse
//! capture and multi-click detection. Rendering is left to an external
//! [`RenderContext`]; Trellis decides what is painted, where, and in which
//! order.
//!
//! The pieces:
//!
//! - [`ComponentTree`]: the scene graph, with listener registration, hit
//!   testing, the layout pass and the paint pass
//! - [`FocusManager`]: focus owner, modal input roots and traversal
//! - [`InputController`]: the mouse and keyboard state machines
//! - [`RootController`]: one tree, its event queue and the per-frame tick
//! - [`platform`]: translation from winit events
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use parking_lot::Mutex;
//! use trellis::{MouseButton, Modifiers, Rect, RootController};
//!
//! let mut root = RootController::builder().size(200, 100).build();
//! let button = root.tree_mut().create_named("ok");
//! let parent = root.root();
//! root.tree_mut().add_child(parent, button).unwrap();
//! root.tree_mut().set_bounds(button, Rect::new(10, 10, 50, 20)).unwrap();
//!
//! let clicks = Arc::new(Mutex::new(0));
//! let counter = Arc::clone(&clicks);
//! root.tree_mut()
//!     .add_mouse_listener(button, move |_, event| {
//!         if event.kind == trellis::MouseEventKind::Clicked {
//!             *counter.lock() += 1;
//!         }
//!     })
//!     .unwrap();
//! root.process_events();
//!
//! let none = Modifiers::empty();
//! root.mouse_moved(0, none, 15, 15);
//! root.mouse_pressed(1, none, MouseButton::Primary, 15, 15, false);
//! root.mouse_released(2, none, MouseButton::Primary, 15, 15, false, true);
//! assert_eq!(*clicks.lock(), 1);
//! ```

pub mod component;
pub mod config;
pub mod debug;
pub mod events;
pub mod focus;
pub mod input;
pub mod platform;
pub mod root;
pub mod style;

pub use component::{ComponentTree, Layout, ListenerId, PaintContext, RenderContext};
pub use config::{DEFAULT_DOUBLE_CLICK_TIMEOUT, InputConfig, RootBuilder, RootConfig};
pub use events::{
    EventBase, FocusEvent, FocusEventKind, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
    MouseWheelEvent,
};
pub use focus::{
    DocumentOrderPolicy, FirstComponentPolicy, FocusManager, KeyEventDispatcher,
    KeyEventPostProcessor, TraversalPolicy,
};
pub use input::InputController;
pub use root::RootController;
pub use style::{Color, Font, Style};

pub use trellis_core::{
    AncestorEvent, AncestorEventKind, ComponentEvent, ComponentEventKind, ComponentId,
    ErrorHandler, EventQueue, Key, KeyLocation, Modifiers, MouseButton, Property,
    PropertyChangeEvent, QueueConfig, RawInput, Rect, ScrollType, TrellisError, TrellisResult,
};
