//! Keyboard routing and modifier tracking.

use trellis_core::logging::targets;
use trellis_core::{Key, KeyLocation, Modifiers};

use super::InputController;
use crate::component::ComponentTree;
use crate::events::{EventBase, KeyEvent, KeyEventKind};

/// Modifier keys held, tracked separately for each side of the keyboard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct KeyboardState {
    left: Modifiers,
    right: Modifiers,
}

impl KeyboardState {
    /// Record a modifier key going down or up. Keys without a side count as
    /// left-hand keys.
    fn track(&mut self, key: Key, location: KeyLocation, down: bool) {
        let Some(modifier) = key.modifier() else {
            return;
        };
        let side = match location {
            KeyLocation::Right => &mut self.right,
            _ => &mut self.left,
        };
        side.set(modifier, down);
    }

    fn held(&self) -> Modifiers {
        self.left | self.right
    }
}

impl InputController {
    /// Modifier keys currently held on the given side.
    pub fn modifiers_on(&self, location: KeyLocation) -> Modifiers {
        match location {
            KeyLocation::Right => self.keyboard.right,
            _ => self.keyboard.left,
        }
    }

    /// Modifiers reported with key events: the host's key state, tracked
    /// modifier keys and held mouse buttons.
    fn key_modifiers(&self, raw: Modifiers) -> Modifiers {
        (raw & Modifiers::KEYS) | self.keyboard.held() | self.mouse.buttons
    }

    pub fn key_pressed(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    ) -> bool {
        self.keyboard.track(key, location, true);
        self.route_key(tree, KeyEventKind::Pressed, when_us, modifiers, key, ch, location)
    }

    pub fn key_released(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    ) -> bool {
        self.keyboard.track(key, location, false);
        // The host may still report the released modifier as held.
        let modifiers = match key.modifier() {
            Some(released) if !self.keyboard.held().contains(released) => modifiers - released,
            _ => modifiers,
        };
        self.route_key(tree, KeyEventKind::Released, when_us, modifiers, key, ch, location)
    }

    pub fn key_typed(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    ) -> bool {
        self.route_key(tree, KeyEventKind::Typed, when_us, modifiers, key, ch, location)
    }

    /// Deliver to the focus owner (or the input root): dispatchers first,
    /// then the target's key listeners, then post-processors, then default
    /// Tab traversal. Stops at the first stage that consumes the event.
    #[allow(clippy::too_many_arguments)]
    fn route_key(
        &mut self,
        tree: &mut ComponentTree,
        kind: KeyEventKind,
        when_us: u64,
        modifiers: Modifiers,
        key: Key,
        ch: Option<char>,
        location: KeyLocation,
    ) -> bool {
        let Some(target) = self
            .focus
            .focus_owner()
            .filter(|id| tree.contains(*id))
            .or_else(|| self.focus.current_root(tree))
        else {
            return false;
        };
        let mut event = KeyEvent {
            base: EventBase::new(),
            kind,
            source: target,
            when_us,
            modifiers: self.key_modifiers(modifiers),
            key,
            ch,
            location,
        };
        tracing::trace!(target: targets::INPUT, ?kind, ?key, ?target, "key event");

        if self.focus.pre_dispatch_key_event(tree, &mut event) {
            return true;
        }
        if tree.dispatch_key_event(&mut event) {
            return true;
        }
        if self.focus.post_process_key_event(tree, &mut event) {
            return true;
        }
        self.default_key_action(tree, &event)
    }

    fn default_key_action(&mut self, tree: &mut ComponentTree, event: &KeyEvent) -> bool {
        if !self.config.tab_traversal
            || event.kind != KeyEventKind::Pressed
            || event.key != Key::Tab
            || event
                .modifiers
                .intersects(Modifiers::CONTROL | Modifiers::ALT | Modifiers::META)
        {
            return false;
        }
        if event.modifiers.contains(Modifiers::SHIFT) {
            self.focus.focus_previous(tree)
        } else {
            self.focus.focus_next(tree)
        }
    }
}
