//! Translation of raw host input into component events.
//!
//! [`InputController`] is the state machine between the platform and the
//! component tree. It owns the [`FocusManager`], the mouse state (pointer
//! position, the component under the pointer, the component holding the
//! button capture, held buttons, multi-click tracking) and the keyboard
//! modifier state.
//!
//! All coordinates handed to the controller are relative to the tree root.
//! Mouse events reach listeners in the target's local coordinates.
//!
//! Every entry point returns whether a listener consumed the event and is a
//! no-op when there is nothing to deliver to.

mod keyboard;
mod mouse;

use trellis_core::logging::targets;
use trellis_core::{ComponentId, RawInput};

use crate::component::ComponentTree;
use crate::config::InputConfig;
use crate::focus::FocusManager;

use keyboard::KeyboardState;
use mouse::MouseState;

/// Mouse, keyboard and focus state for one tree.
#[derive(Debug)]
pub struct InputController {
    focus: FocusManager,
    mouse: MouseState,
    keyboard: KeyboardState,
    config: InputConfig,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl InputController {
    pub fn new(config: InputConfig) -> Self {
        Self {
            focus: FocusManager::new(),
            mouse: MouseState::default(),
            keyboard: KeyboardState::default(),
            config,
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusManager {
        &mut self.focus
    }

    /// The component under the pointer, if any.
    pub fn mouse_location(&self) -> Option<ComponentId> {
        self.mouse.location
    }

    /// The component holding the mouse capture, if any.
    pub fn button_focus(&self) -> Option<ComponentId> {
        self.mouse.capture
    }

    /// Last known pointer position, relative to the tree root.
    pub fn pointer_position(&self) -> (i32, i32) {
        (self.mouse.x, self.mouse.y)
    }

    /// Restore the focus and mouse invariants after the tree changed.
    pub fn validate(&mut self, tree: &mut ComponentTree) {
        self.focus.validate(tree);
        self.validate_mouse(tree);
    }

    /// Route one raw host event to the matching entry point.
    pub fn handle_raw(&mut self, tree: &mut ComponentTree, input: RawInput) -> bool {
        tracing::trace!(target: targets::INPUT, ?input, "raw input");
        match input {
            RawInput::MousePressed {
                when_us,
                modifiers,
                button,
                x,
                y,
                popup_trigger,
            } => self.mouse_pressed(tree, when_us, modifiers, button, x, y, popup_trigger),
            RawInput::MouseReleased {
                when_us,
                modifiers,
                button,
                x,
                y,
                popup_trigger,
                generate_click,
            } => self.mouse_released(
                tree,
                when_us,
                modifiers,
                button,
                x,
                y,
                popup_trigger,
                generate_click,
            ),
            RawInput::MouseMoved {
                when_us,
                modifiers,
                x,
                y,
            } => self.mouse_moved(tree, when_us, modifiers, x, y),
            RawInput::MouseEntered {
                when_us,
                modifiers,
                x,
                y,
            } => self.mouse_entered(tree, when_us, modifiers, x, y),
            RawInput::MouseExited {
                when_us,
                modifiers,
                x,
                y,
            } => self.mouse_exited(tree, when_us, modifiers, x, y),
            RawInput::MouseWheel {
                when_us,
                modifiers,
                x,
                y,
                scroll_type,
                scroll_amount,
                wheel_rotation,
            } => self.mouse_wheel_moved(
                tree,
                when_us,
                modifiers,
                x,
                y,
                scroll_type,
                scroll_amount,
                wheel_rotation,
            ),
            RawInput::KeyPressed {
                when_us,
                modifiers,
                key,
                ch,
                location,
            } => self.key_pressed(tree, when_us, modifiers, key, ch, location),
            RawInput::KeyReleased {
                when_us,
                modifiers,
                key,
                ch,
                location,
            } => self.key_released(tree, when_us, modifiers, key, ch, location),
            RawInput::KeyTyped {
                when_us,
                modifiers,
                key,
                ch,
                location,
            } => self.key_typed(tree, when_us, modifiers, key, ch, location),
        }
    }
}

static_assertions::assert_impl_all!(InputController: Send);
