//! The winit boundary.
//!
//! Host codes are translated into the closed core vocabulary here and
//! nowhere else. [`WinitInputAdapter`] turns a window's event stream into
//! [`RawInput`] records stamped with a monotonic microsecond clock, ready
//! for [`RootController::handle_input`](crate::RootController::handle_input)
//! or [`EventQueue::fire_input`](trellis_core::EventQueue::fire_input).

use std::time::Instant;

use trellis_core::logging::targets;
use trellis_core::{Key, KeyLocation, Modifiers, MouseButton, RawInput, ScrollType};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{
    Key as WinitKey, KeyLocation as WinitKeyLocation, ModifiersState, NamedKey,
};

/// Lines scrolled per wheel notch for line-based deltas.
pub const LINES_PER_NOTCH: i32 = 3;

/// Converts a winit mouse button. Unnumbered extra buttons have no mapping.
pub fn from_winit_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Primary),
        WinitMouseButton::Right => Some(MouseButton::Secondary),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Back),
        WinitMouseButton::Forward => Some(MouseButton::Forward),
        WinitMouseButton::Other(_) => None,
    }
}

pub fn from_winit_modifiers(state: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, state.shift_key());
    modifiers.set(Modifiers::CONTROL, state.control_key());
    modifiers.set(Modifiers::ALT, state.alt_key());
    modifiers.set(Modifiers::META, state.super_key());
    modifiers
}

pub fn from_winit_key_location(location: WinitKeyLocation) -> KeyLocation {
    match location {
        WinitKeyLocation::Standard => KeyLocation::Standard,
        WinitKeyLocation::Left => KeyLocation::Left,
        WinitKeyLocation::Right => KeyLocation::Right,
        WinitKeyLocation::Numpad => KeyLocation::Numpad,
    }
}

/// Converts a winit logical key.
pub fn from_winit_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(named) => from_winit_named_key(named),
        WinitKey::Character(text) => text.chars().next().map_or(Key::Unknown(0), Key::Character),
        WinitKey::Unidentified(_) | WinitKey::Dead(_) => Key::Unknown(0),
    }
}

pub fn from_winit_named_key(key: &NamedKey) -> Key {
    match key {
        NamedKey::Shift => Key::Shift,
        NamedKey::Control => Key::Control,
        NamedKey::Alt | NamedKey::AltGraph => Key::Alt,
        NamedKey::Super | NamedKey::Meta => Key::Meta,
        NamedKey::CapsLock => Key::CapsLock,

        NamedKey::Tab => Key::Tab,
        NamedKey::Enter => Key::Enter,
        NamedKey::Escape => Key::Escape,
        NamedKey::Space => Key::Space,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Insert => Key::Insert,

        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::ArrowUp => Key::ArrowUp,
        NamedKey::ArrowDown => Key::ArrowDown,
        NamedKey::ArrowLeft => Key::ArrowLeft,
        NamedKey::ArrowRight => Key::ArrowRight,

        NamedKey::F1 => Key::F(1),
        NamedKey::F2 => Key::F(2),
        NamedKey::F3 => Key::F(3),
        NamedKey::F4 => Key::F(4),
        NamedKey::F5 => Key::F(5),
        NamedKey::F6 => Key::F(6),
        NamedKey::F7 => Key::F(7),
        NamedKey::F8 => Key::F(8),
        NamedKey::F9 => Key::F(9),
        NamedKey::F10 => Key::F(10),
        NamedKey::F11 => Key::F(11),
        NamedKey::F12 => Key::F(12),

        _ => Key::Unknown(0),
    }
}

/// Converts a wheel delta into `(scroll_type, scroll_amount, wheel_rotation)`.
///
/// Rotation is positive toward the user (content scrolls down), the
/// opposite of winit's sign. Pixel deltas scroll one unit per pixel.
pub fn scroll_from_winit_delta(delta: &MouseScrollDelta) -> (ScrollType, i32, i32) {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => (ScrollType::Unit, LINES_PER_NOTCH, -y.round() as i32),
        MouseScrollDelta::PixelDelta(position) => (ScrollType::Unit, 1, -position.y.round() as i32),
    }
}

/// Tracks what winit reports incrementally (cursor position, modifier
/// keys) and stamps each translated record with the time since creation.
#[derive(Debug, Clone)]
pub struct WinitInputAdapter {
    cursor: (i32, i32),
    modifiers: Modifiers,
    epoch: Instant,
}

impl Default for WinitInputAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WinitInputAdapter {
    pub fn new() -> Self {
        Self {
            cursor: (0, 0),
            modifiers: Modifiers::empty(),
            epoch: Instant::now(),
        }
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn now_us(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    pub fn modifiers_changed(&mut self, state: ModifiersState) {
        self.modifiers = from_winit_modifiers(state);
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) -> RawInput {
        self.cursor = (x.round() as i32, y.round() as i32);
        RawInput::MouseMoved {
            when_us: self.now_us(),
            modifiers: self.modifiers,
            x: self.cursor.0,
            y: self.cursor.1,
        }
    }

    pub fn cursor_entered(&self) -> RawInput {
        RawInput::MouseEntered {
            when_us: self.now_us(),
            modifiers: self.modifiers,
            x: self.cursor.0,
            y: self.cursor.1,
        }
    }

    pub fn cursor_left(&self) -> RawInput {
        RawInput::MouseExited {
            when_us: self.now_us(),
            modifiers: self.modifiers,
            x: self.cursor.0,
            y: self.cursor.1,
        }
    }

    /// A button changed state at the last cursor position. The secondary
    /// button press is the popup trigger; releases always ask for clicks.
    pub fn mouse_input(&self, state: ElementState, button: WinitMouseButton) -> Option<RawInput> {
        let button = from_winit_mouse_button(button)?;
        let (x, y) = self.cursor;
        let when_us = self.now_us();
        let modifiers = self.modifiers;
        Some(match state {
            ElementState::Pressed => RawInput::MousePressed {
                when_us,
                modifiers,
                button,
                x,
                y,
                popup_trigger: button == MouseButton::Secondary,
            },
            ElementState::Released => RawInput::MouseReleased {
                when_us,
                modifiers,
                button,
                x,
                y,
                popup_trigger: false,
                generate_click: true,
            },
        })
    }

    pub fn mouse_wheel(&self, delta: &MouseScrollDelta) -> Option<RawInput> {
        let (scroll_type, scroll_amount, wheel_rotation) = scroll_from_winit_delta(delta);
        if wheel_rotation == 0 {
            return None;
        }
        Some(RawInput::MouseWheel {
            when_us: self.now_us(),
            modifiers: self.modifiers,
            x: self.cursor.0,
            y: self.cursor.1,
            scroll_type,
            scroll_amount,
            wheel_rotation,
        })
    }

    /// A key changed state. A press producing text is followed by one
    /// typed record per character.
    pub fn keyboard_input(
        &self,
        key: &WinitKey,
        location: WinitKeyLocation,
        state: ElementState,
        text: Option<&str>,
    ) -> Vec<RawInput> {
        let when_us = self.now_us();
        let modifiers = self.modifiers;
        let location = from_winit_key_location(location);
        let code = from_winit_key(key);
        let ch = match code {
            Key::Character(c) => Some(c),
            _ => None,
        };

        match state {
            ElementState::Pressed => {
                let mut out = vec![RawInput::KeyPressed {
                    when_us,
                    modifiers,
                    key: code,
                    ch,
                    location,
                }];
                for c in text.unwrap_or_default().chars().filter(|c| !c.is_control()) {
                    out.push(RawInput::KeyTyped {
                        when_us,
                        modifiers,
                        key: code,
                        ch: Some(c),
                        location,
                    });
                }
                out
            }
            ElementState::Released => vec![RawInput::KeyReleased {
                when_us,
                modifiers,
                key: code,
                ch,
                location,
            }],
        }
    }

    /// Translate one window event. Events with no input meaning yield
    /// nothing.
    pub fn translate(&mut self, event: &WindowEvent) -> Vec<RawInput> {
        let translated = match event {
            WindowEvent::CursorMoved { position, .. } => vec![self.cursor_moved(position.x, position.y)],
            WindowEvent::CursorEntered { .. } => vec![self.cursor_entered()],
            WindowEvent::CursorLeft { .. } => vec![self.cursor_left()],
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse_input(*state, *button).into_iter().collect()
            }
            WindowEvent::MouseWheel { delta, .. } => self.mouse_wheel(delta).into_iter().collect(),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers_changed(modifiers.state());
                Vec::new()
            }
            WindowEvent::KeyboardInput { event, .. } => self.keyboard_input(
                &event.logical_key,
                event.location,
                event.state,
                event.text.as_deref(),
            ),
            _ => Vec::new(),
        };
        if !translated.is_empty() {
            tracing::trace!(target: targets::INPUT, count = translated.len(), "translated window event");
        }
        translated
    }
}
