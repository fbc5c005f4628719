//! Platform-neutral input vocabulary.
//!
//! Host window systems translate their native codes into these closed types
//! at the platform boundary; everything past that boundary routes on these
//! alone. [`RawInput`] packages one raw host event so it can be handed from
//! a platform thread to the controller thread through the event queue.

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifier and mouse button state attached to every input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
        /// Primary (usually left) mouse button.
        const BUTTON1 = 1 << 8;
        /// Middle mouse button.
        const BUTTON2 = 1 << 9;
        /// Secondary (usually right) mouse button.
        const BUTTON3 = 1 << 10;
        /// Back navigation button.
        const BUTTON4 = 1 << 11;
        /// Forward navigation button.
        const BUTTON5 = 1 << 12;

        const KEYS = Self::SHIFT.bits() | Self::CONTROL.bits() | Self::ALT.bits() | Self::META.bits();
        const BUTTONS = Self::BUTTON1.bits()
            | Self::BUTTON2.bits()
            | Self::BUTTON3.bits()
            | Self::BUTTON4.bits()
            | Self::BUTTON5.bits();
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
    Back,
    Forward,
}

impl MouseButton {
    /// All buttons, in modifier-bit order.
    pub const ALL: [MouseButton; 5] = [
        MouseButton::Primary,
        MouseButton::Middle,
        MouseButton::Secondary,
        MouseButton::Back,
        MouseButton::Forward,
    ];

    /// The modifier bit tracking this button while it is held.
    pub fn modifier(self) -> Modifiers {
        match self {
            Self::Primary => Modifiers::BUTTON1,
            Self::Middle => Modifiers::BUTTON2,
            Self::Secondary => Modifiers::BUTTON3,
            Self::Back => Modifiers::BUTTON4,
            Self::Forward => Modifiers::BUTTON5,
        }
    }
}

/// Where on the keyboard a key sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyLocation {
    #[default]
    Unknown,
    Standard,
    Left,
    Right,
    Numpad,
}

/// Wheel scroll granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollType {
    /// Scroll by units (lines); `scroll_amount` units per notch.
    Unit,
    /// Scroll by blocks (pages).
    Block,
}

/// A key code.
///
/// Named keys cover modifiers, navigation and editing; printable keys are
/// carried as [`Key::Character`] with the unshifted character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Shift,
    Control,
    Alt,
    Meta,
    CapsLock,
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Function key `F1` through `F24`.
    F(u8),
    Character(char),
    /// A key the platform could not identify, with its native code.
    Unknown(u32),
}

impl Key {
    /// The modifier this key controls, if it is a modifier key.
    pub fn modifier(self) -> Option<Modifiers> {
        match self {
            Key::Shift => Some(Modifiers::SHIFT),
            Key::Control => Some(Modifiers::CONTROL),
            Key::Alt => Some(Modifiers::ALT),
            Key::Meta => Some(Modifiers::META),
            _ => None,
        }
    }
}

/// One raw host input event with its microsecond timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    MousePressed {
        when_us: u64,
        modifiers: Modifiers,
        button: MouseButton,
        x: i32,
        y: i32,
        popup_trigger: bool,
    },
    MouseReleased {
        when_us: u64,
        modifiers: Modifiers,
        button: MouseButton,
        x: i32,
        y: i32,
        popup_trigger: bool,
        generate_click: bool,
    },
    MouseMoved {
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
    },
    MouseEntered {
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
    },
    MouseExited {
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
    },
    MouseWheel {
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
        scroll_type: ScrollType,
        scroll_amount: i32,
        wheel_rotation: i32,
    },
    KeyPressed {
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    },
    KeyReleased {
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    },
    KeyTyped {
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    },
}

impl RawInput {
    /// The event's timestamp in microseconds.
    pub fn when_us(&self) -> u64 {
        match *self {
            RawInput::MousePressed { when_us, .. }
            | RawInput::MouseReleased { when_us, .. }
            | RawInput::MouseMoved { when_us, .. }
            | RawInput::MouseEntered { when_us, .. }
            | RawInput::MouseExited { when_us, .. }
            | RawInput::MouseWheel { when_us, .. }
            | RawInput::KeyPressed { when_us, .. }
            | RawInput::KeyReleased { when_us, .. }
            | RawInput::KeyTyped { when_us, .. } => when_us,
        }
    }
}
