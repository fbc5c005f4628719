//! The mouse state machine.
//!
//! A press over a mouse-focusable component captures the mouse for that
//! component until every button is released: drags and the release go to
//! the capture even when the pointer has left its bounds. Enter/exit
//! transitions are withheld during a capture and caught up after the final
//! release.

use trellis_core::logging::targets;
use trellis_core::{ComponentId, Modifiers, MouseButton, ScrollType};

use super::InputController;
use crate::component::ComponentTree;
use crate::events::{EventBase, MouseEvent, MouseEventKind, MouseWheelEvent};

/// The most recent press, for multi-click counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastPress {
    button: MouseButton,
    x: i32,
    y: i32,
    when_us: u64,
    count: u32,
}

#[derive(Debug, Default)]
pub(super) struct MouseState {
    pub(super) x: i32,
    pub(super) y: i32,
    /// Whether the pointer is over the host surface.
    inside: bool,
    /// The mouse-focusable component under the pointer.
    pub(super) location: Option<ComponentId>,
    /// Button focus: receives drags and releases until all buttons are up.
    pub(super) capture: Option<ComponentId>,
    /// Pointer position of the press that started the capture.
    capture_origin: Option<(i32, i32)>,
    /// Held buttons, as `Modifiers::BUTTONS` bits.
    pub(super) buttons: Modifiers,
    last_press: Option<LastPress>,
    /// Timestamp of the most recent pointer event.
    last_seen_us: u64,
}

/// The variable part of one delivered mouse event.
#[derive(Debug, Clone, Copy)]
struct Stroke {
    kind: MouseEventKind,
    when_us: u64,
    modifiers: Modifiers,
    button: Option<MouseButton>,
    click_count: u32,
    popup_trigger: bool,
}

impl Stroke {
    fn plain(kind: MouseEventKind, when_us: u64, modifiers: Modifiers) -> Self {
        Self {
            kind,
            when_us,
            modifiers,
            button: None,
            click_count: 0,
            popup_trigger: false,
        }
    }
}

impl InputController {
    /// Key modifiers from the host plus the buttons currently held.
    fn mouse_modifiers(&self, raw: Modifiers) -> Modifiers {
        (raw & Modifiers::KEYS) | self.mouse.buttons
    }

    fn move_pointer(&mut self, x: i32, y: i32, when_us: u64) {
        self.mouse.x = x;
        self.mouse.y = y;
        self.mouse.last_seen_us = when_us;
    }

    /// Whether `id` can be the mouse location or capture.
    fn is_mouse_target(&self, tree: &ComponentTree, id: ComponentId) -> bool {
        tree.is_mouse_focusable(id)
            && self
                .focus
                .current_root(tree)
                .is_some_and(|root| tree.is_descendant_of(id, root))
    }

    /// The mouse-focusable component under the pointer.
    ///
    /// Searches the previous location's subtree first; that answer stands
    /// only when the pointer is inside every ancestor up to the input root
    /// and nothing painted in front of it covers the pointer. Otherwise the
    /// whole input root is searched.
    fn locate(&self, tree: &ComponentTree) -> Option<ComponentId> {
        if !self.mouse.inside {
            return None;
        }
        let root = self.focus.current_root(tree)?;
        let (x, y) = (self.mouse.x, self.mouse.y);

        if let Some(previous) = self.mouse.location.filter(|id| self.is_mouse_target(tree, *id)) {
            if let Some(abs) = tree.absolute_bounds(previous) {
                let hit = tree.mouse_focusable_component_at(previous, x - abs.x(), y - abs.y());
                if hit.is_some()
                    && !tree.is_clipped(previous, root, x, y)
                    && !tree.is_occluded(previous, root, x, y)
                {
                    return hit;
                }
            }
        }

        let abs = tree.absolute_bounds(root)?;
        tree.mouse_focusable_component_at(root, x - abs.x(), y - abs.y())
    }

    /// Build a mouse event for `target` at the current pointer position.
    fn mouse_event(&self, tree: &ComponentTree, target: ComponentId, stroke: Stroke) -> Option<MouseEvent> {
        let abs = tree.absolute_bounds(target)?;
        Some(MouseEvent {
            base: EventBase::new(),
            kind: stroke.kind,
            source: target,
            when_us: stroke.when_us,
            modifiers: stroke.modifiers,
            x: self.mouse.x - abs.x(),
            y: self.mouse.y - abs.y(),
            root_x: self.mouse.x,
            root_y: self.mouse.y,
            button: stroke.button,
            click_count: stroke.click_count,
            popup_trigger: stroke.popup_trigger,
        })
    }

    fn deliver(&self, tree: &mut ComponentTree, target: ComponentId, stroke: Stroke) -> bool {
        let Some(mut event) = self.mouse_event(tree, target, stroke) else {
            return false;
        };
        tracing::trace!(target: targets::INPUT, kind = ?stroke.kind, ?target, x = event.x, y = event.y, "mouse event");
        tree.dispatch_mouse_event(&mut event)
    }

    /// Point the mouse location at `next`, sending `Exited` to the old
    /// location and `Entered` to the new one.
    fn set_location(
        &mut self,
        tree: &mut ComponentTree,
        next: Option<ComponentId>,
        when_us: u64,
        modifiers: Modifiers,
    ) {
        let previous = self.mouse.location;
        if previous == next {
            return;
        }
        self.mouse.location = next;
        if let Some(old) = previous.filter(|id| tree.contains(*id)) {
            self.deliver(tree, old, Stroke::plain(MouseEventKind::Exited, when_us, modifiers));
        }
        if let Some(new) = next {
            self.deliver(tree, new, Stroke::plain(MouseEventKind::Entered, when_us, modifiers));
        }
    }

    fn relocate(&mut self, tree: &mut ComponentTree, when_us: u64, modifiers: Modifiers) {
        let next = self.locate(tree);
        self.set_location(tree, next, when_us, modifiers);
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// The pointer moved to `(x, y)`.
    ///
    /// During a capture the capture receives `Dragged`; otherwise the
    /// location is updated and receives `Moved` (or `Dragged` while a
    /// dropped press still holds a button).
    pub fn mouse_moved(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
    ) -> bool {
        self.move_pointer(x, y, when_us);
        self.mouse.inside = true;
        let modifiers = self.mouse_modifiers(modifiers);

        if let Some(capture) = self.mouse.capture {
            return self.deliver(tree, capture, Stroke::plain(MouseEventKind::Dragged, when_us, modifiers));
        }
        self.relocate(tree, when_us, modifiers);
        let Some(location) = self.mouse.location else {
            return false;
        };
        let kind = if self.mouse.buttons.is_empty() {
            MouseEventKind::Moved
        } else {
            MouseEventKind::Dragged
        };
        self.deliver(tree, location, Stroke::plain(kind, when_us, modifiers))
    }

    /// The pointer entered the host surface.
    pub fn mouse_entered(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
    ) -> bool {
        self.move_pointer(x, y, when_us);
        self.mouse.inside = true;
        if self.mouse.capture.is_none() {
            let modifiers = self.mouse_modifiers(modifiers);
            self.relocate(tree, when_us, modifiers);
        }
        false
    }

    /// The pointer left the host surface.
    pub fn mouse_exited(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
    ) -> bool {
        self.move_pointer(x, y, when_us);
        self.mouse.inside = false;
        if self.mouse.capture.is_none() {
            let modifiers = self.mouse_modifiers(modifiers);
            self.set_location(tree, None, when_us, modifiers);
        }
        false
    }

    /// A button went down at `(x, y)`.
    ///
    /// Without a capture the component under the pointer takes it; with no
    /// such component the press is dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn mouse_pressed(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        button: MouseButton,
        x: i32,
        y: i32,
        popup_trigger: bool,
    ) -> bool {
        self.move_pointer(x, y, when_us);
        self.mouse.inside = true;
        self.mouse.buttons |= button.modifier();
        let modifiers = self.mouse_modifiers(modifiers);

        if self.mouse.capture.is_none() {
            self.relocate(tree, when_us, modifiers);
            let Some(location) = self.mouse.location else {
                tracing::trace!(target: targets::INPUT, ?button, x, y, "press dropped, nothing under pointer");
                return false;
            };
            self.mouse.capture = Some(location);
            self.mouse.capture_origin = Some((x, y));
        }
        let Some(capture) = self.mouse.capture else {
            return false;
        };

        let timeout = self.config.double_click_timeout_us();
        let count = match self.mouse.last_press {
            Some(last)
                if last.button == button
                    && (last.x, last.y) == (x, y)
                    && when_us.saturating_sub(last.when_us) <= timeout =>
            {
                last.count + 1
            }
            _ => 1,
        };
        self.mouse.last_press = Some(LastPress {
            button,
            x,
            y,
            when_us,
            count,
        });

        self.deliver(
            tree,
            capture,
            Stroke {
                kind: MouseEventKind::Pressed,
                when_us,
                modifiers,
                button: Some(button),
                click_count: count,
                popup_trigger,
            },
        )
    }

    /// A button went up at `(x, y)`.
    ///
    /// `Released` goes to the capture (else the location). Releasing the
    /// last held button ends the capture; when that release has
    /// `generate_click` set and the pointer is still where the capturing
    /// press happened, `Clicked` follows. Releases of other buttons while
    /// the capture holds never click.
    #[allow(clippy::too_many_arguments)]
    pub fn mouse_released(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        button: MouseButton,
        x: i32,
        y: i32,
        popup_trigger: bool,
        generate_click: bool,
    ) -> bool {
        self.move_pointer(x, y, when_us);
        self.mouse.buttons.remove(button.modifier());
        let modifiers = self.mouse_modifiers(modifiers);
        let click_count = self
            .mouse
            .last_press
            .filter(|last| last.button == button)
            .map_or(1, |last| last.count);

        // Settled before any listener runs; a panicking listener must not
        // leave the capture behind.
        let capture = self.mouse.capture;
        let capture_origin = self.mouse.capture_origin;
        let ended = self.mouse.buttons.is_empty() && capture.is_some();
        if ended {
            self.mouse.capture = None;
            self.mouse.capture_origin = None;
        }

        let mut consumed = false;
        if let Some(target) = capture.or(self.mouse.location) {
            let stroke = Stroke {
                kind: MouseEventKind::Released,
                when_us,
                modifiers,
                button: Some(button),
                click_count,
                popup_trigger,
            };
            consumed = self.deliver(tree, target, stroke);

            if generate_click && ended && capture_origin == Some((x, y)) {
                let click = Stroke {
                    kind: MouseEventKind::Clicked,
                    popup_trigger: false,
                    ..stroke
                };
                consumed |= self.deliver(tree, target, click);
            }
        }

        if ended {
            self.relocate(tree, when_us, modifiers);
        }
        consumed
    }

    /// The wheel turned. Delivered to the location only.
    #[allow(clippy::too_many_arguments)]
    pub fn mouse_wheel_moved(
        &mut self,
        tree: &mut ComponentTree,
        when_us: u64,
        modifiers: Modifiers,
        x: i32,
        y: i32,
        scroll_type: ScrollType,
        scroll_amount: i32,
        wheel_rotation: i32,
    ) -> bool {
        self.move_pointer(x, y, when_us);
        self.mouse.inside = true;
        let modifiers = self.mouse_modifiers(modifiers);
        if self.mouse.capture.is_none() {
            self.relocate(tree, when_us, modifiers);
        }
        let Some(target) = self.mouse.location else {
            return false;
        };
        let Some(abs) = tree.absolute_bounds(target) else {
            return false;
        };
        let mut event = MouseWheelEvent {
            base: EventBase::new(),
            source: target,
            when_us,
            modifiers,
            x: x - abs.x(),
            y: y - abs.y(),
            root_x: x,
            root_y: y,
            scroll_type,
            scroll_amount,
            wheel_rotation,
        };
        tree.dispatch_mouse_wheel_event(&mut event)
    }

    /// Drop a capture or location that is no longer a valid mouse target.
    ///
    /// A dead capture is force-released: it receives `Released` for every
    /// held button (if it still exists) and the buttons are cleared. A dead
    /// location receives `Exited`. The location is then recomputed.
    pub fn validate_mouse(&mut self, tree: &mut ComponentTree) {
        let when_us = self.mouse.last_seen_us;

        if let Some(capture) = self.mouse.capture.filter(|id| !self.is_mouse_target(tree, *id)) {
            tracing::debug!(target: targets::INPUT, ?capture, "force-releasing stale capture");
            let held: Vec<_> = MouseButton::ALL
                .into_iter()
                .filter(|b| self.mouse.buttons.contains(b.modifier()))
                .collect();
            for button in held {
                self.mouse.buttons.remove(button.modifier());
                if tree.contains(capture) {
                    let mut stroke = Stroke::plain(MouseEventKind::Released, when_us, self.mouse.buttons);
                    stroke.button = Some(button);
                    stroke.click_count = 1;
                    self.deliver(tree, capture, stroke);
                }
            }
            self.mouse.capture = None;
            self.mouse.capture_origin = None;
        }

        if let Some(location) = self.mouse.location.filter(|id| !self.is_mouse_target(tree, *id)) {
            self.mouse.location = None;
            if tree.contains(location) {
                let exited = Stroke::plain(MouseEventKind::Exited, when_us, self.mouse.buttons);
                self.deliver(tree, location, exited);
            }
        }

        if self.mouse.capture.is_none() {
            let modifiers = self.mouse.buttons;
            self.relocate(tree, when_us, modifiers);
        }
    }
}
