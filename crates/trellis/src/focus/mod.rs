//! Keyboard focus and modal input scoping.
//!
//! [`FocusManager`] tracks the focus owner within the current *input root*,
//! the subtree eligible for focus. Starting a modal pushes a frame that
//! narrows the input root to the modal component and remembers the previous
//! root and owner; stopping it restores them.
//!
//! The manager never owns components. Every operation takes the
//! [`ComponentTree`] and revalidates ids against it, so a stale focus owner
//! or input root is corrected rather than reported.
//!
//! # Focus order
//!
//! When focus moves, the previous owner receives `Lost` (opposite: the new
//! owner) before the new owner receives `Gained` (opposite: the previous
//! owner).

mod traversal;

use std::sync::Arc;

use trellis_core::ComponentId;
use trellis_core::logging::targets;

use crate::component::ComponentTree;
use crate::events::{FocusEvent, FocusEventKind, KeyEvent};

pub use traversal::{DocumentOrderPolicy, FirstComponentPolicy, TraversalPolicy};

/// Sees key events before the focus owner's listeners.
///
/// Returning `true` consumes the event.
pub trait KeyEventDispatcher: Send + Sync {
    fn dispatch_key_event(&self, tree: &mut ComponentTree, event: &mut KeyEvent) -> bool;
}

impl<F> KeyEventDispatcher for F
where
    F: Fn(&mut ComponentTree, &mut KeyEvent) -> bool + Send + Sync,
{
    fn dispatch_key_event(&self, tree: &mut ComponentTree, event: &mut KeyEvent) -> bool {
        self(tree, event)
    }
}

/// Sees key events no listener consumed.
///
/// Returning `true` consumes the event.
pub trait KeyEventPostProcessor: Send + Sync {
    fn post_process_key_event(&self, tree: &mut ComponentTree, event: &mut KeyEvent) -> bool;
}

impl<F> KeyEventPostProcessor for F
where
    F: Fn(&mut ComponentTree, &mut KeyEvent) -> bool + Send + Sync,
{
    fn post_process_key_event(&self, tree: &mut ComponentTree, event: &mut KeyEvent) -> bool {
        self(tree, event)
    }
}

/// Saved state for one active modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModalFrame {
    /// The modal component this frame made the input root.
    root: ComponentId,
    /// The input root before the push; `None` is the tree root.
    saved_root: Option<ComponentId>,
    saved_focus: Option<ComponentId>,
}

/// Focus owner, input root stack and key interception for one tree.
pub struct FocusManager {
    focus_owner: Option<ComponentId>,
    /// `None` means the tree root.
    input_root: Option<ComponentId>,
    frames: Vec<ModalFrame>,
    dispatchers: Vec<Arc<dyn KeyEventDispatcher>>,
    post_processors: Vec<Arc<dyn KeyEventPostProcessor>>,
    policy: Box<dyn TraversalPolicy>,
}

impl Default for FocusManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FocusManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusManager")
            .field("focus_owner", &self.focus_owner)
            .field("input_root", &self.input_root)
            .field("frames", &self.frames)
            .field("dispatchers", &self.dispatchers.len())
            .field("post_processors", &self.post_processors.len())
            .finish_non_exhaustive()
    }
}

impl FocusManager {
    /// A manager with no focus, the tree root as input root, and
    /// [`DocumentOrderPolicy`] traversal.
    pub fn new() -> Self {
        Self::with_policy(Box::new(DocumentOrderPolicy))
    }

    pub fn with_policy(policy: Box<dyn TraversalPolicy>) -> Self {
        Self {
            focus_owner: None,
            input_root: None,
            frames: Vec::new(),
            dispatchers: Vec::new(),
            post_processors: Vec::new(),
            policy,
        }
    }

    #[inline]
    pub fn focus_owner(&self) -> Option<ComponentId> {
        self.focus_owner
    }

    #[inline]
    pub fn has_focus(&self, id: ComponentId) -> bool {
        self.focus_owner == Some(id)
    }

    /// The explicit input root, or `None` while the tree root is in effect.
    pub fn input_root(&self) -> Option<ComponentId> {
        self.input_root
    }

    /// The input root in effect: the innermost modal, else the tree root.
    pub fn current_root(&self, tree: &ComponentTree) -> Option<ComponentId> {
        self.input_root.or_else(|| tree.root())
    }

    /// Number of active modal frames.
    pub fn modal_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn set_traversal_policy(&mut self, policy: Box<dyn TraversalPolicy>) {
        self.policy = policy;
    }

    pub fn traversal_policy(&self) -> &dyn TraversalPolicy {
        self.policy.as_ref()
    }

    pub fn add_key_dispatcher(&mut self, dispatcher: Arc<dyn KeyEventDispatcher>) {
        self.dispatchers.push(dispatcher);
    }

    pub fn add_key_post_processor(&mut self, post_processor: Arc<dyn KeyEventPostProcessor>) {
        self.post_processors.push(post_processor);
    }

    /// Whether `id` may own focus under the current input root.
    pub fn is_eligible(&self, tree: &ComponentTree, id: ComponentId) -> bool {
        let Some(root) = self.current_root(tree) else {
            return false;
        };
        tree.is_keyboard_focusable(id) && tree.is_descendant_of(id, root)
    }

    // =========================================================================
    // Focus changes
    // =========================================================================

    /// Move focus to `target` (or clear it with `None`).
    ///
    /// Returns false without any notification when `target` already owns
    /// focus or lies outside the current input root.
    pub fn transfer_focus(&mut self, tree: &mut ComponentTree, target: Option<ComponentId>) -> bool {
        if target == self.focus_owner {
            return false;
        }
        if let Some(id) = target {
            let inside = self
                .current_root(tree)
                .is_some_and(|root| tree.is_descendant_of(id, root));
            if !inside {
                tracing::debug!(target: targets::FOCUS, ?id, "focus target outside input root");
                return false;
            }
        }

        let previous = self.focus_owner;
        self.focus_owner = target;
        tracing::debug!(target: targets::FOCUS, ?previous, ?target, "focus transferred");

        if let Some(lost) = previous {
            tree.dispatch_focus_event(&FocusEvent {
                kind: FocusEventKind::Lost,
                source: lost,
                opposite: target,
            });
        }
        if let Some(gained) = target {
            tree.dispatch_focus_event(&FocusEvent {
                kind: FocusEventKind::Gained,
                source: gained,
                opposite: previous,
            });
        }
        true
    }

    /// Handle a queued focus request. Ineligible targets are ignored.
    pub fn request_focus(&mut self, tree: &mut ComponentTree, id: ComponentId) -> bool {
        if !self.is_eligible(tree, id) {
            tracing::debug!(target: targets::FOCUS, ?id, "focus request refused");
            return false;
        }
        self.transfer_focus(tree, Some(id))
    }

    /// Move focus to the next component, if `source` still owns focus.
    pub fn transfer_focus_forward(&mut self, tree: &mut ComponentTree, source: ComponentId) -> bool {
        if self.focus_owner != Some(source) {
            return false;
        }
        self.focus_next(tree)
    }

    /// Move focus to the previous component, if `source` still owns focus.
    pub fn transfer_focus_backward(
        &mut self,
        tree: &mut ComponentTree,
        source: ComponentId,
    ) -> bool {
        if self.focus_owner != Some(source) {
            return false;
        }
        self.focus_previous(tree)
    }

    /// Move focus forward in traversal order; with no owner, to the first
    /// focusable component.
    pub fn focus_next(&mut self, tree: &mut ComponentTree) -> bool {
        let Some(root) = self.current_root(tree) else {
            return false;
        };
        let next = match self.focus_owner {
            Some(current) => self.policy.component_after(tree, root, current),
            None => self.policy.first_component(tree, root),
        };
        next.is_some() && self.transfer_focus(tree, next)
    }

    /// Move focus backward in traversal order; with no owner, to the last
    /// focusable component.
    pub fn focus_previous(&mut self, tree: &mut ComponentTree) -> bool {
        let Some(root) = self.current_root(tree) else {
            return false;
        };
        let previous = match self.focus_owner {
            Some(current) => self.policy.component_before(tree, root, current),
            None => self.policy.last_component(tree, root),
        };
        previous.is_some() && self.transfer_focus(tree, previous)
    }

    /// The policy's default for the current root, if it is eligible.
    fn default_component(&self, tree: &ComponentTree) -> Option<ComponentId> {
        let root = self.current_root(tree)?;
        self.policy
            .default_component(tree, root)
            .filter(|id| self.is_eligible(tree, *id))
    }

    /// Restore the focus invariant.
    ///
    /// An owner that is missing, unfocusable or outside the input root is
    /// replaced by the policy default (possibly nothing). With no owner the
    /// default is also applied.
    pub fn validate(&mut self, tree: &mut ComponentTree) {
        if let Some(owner) = self.focus_owner {
            if self.is_eligible(tree, owner) {
                return;
            }
            tracing::debug!(target: targets::FOCUS, ?owner, "focus owner no longer eligible");
            if !tree.contains(owner) {
                // Nothing left to notify.
                self.focus_owner = None;
            }
        }
        let fallback = self.default_component(tree);
        self.transfer_focus(tree, fallback);
    }

    // =========================================================================
    // Input root stack
    // =========================================================================

    /// Narrow the input root to `root`, which must lie strictly inside the
    /// current one. Focus is cleared and then revalidated within `root`.
    pub fn push_input_root(&mut self, tree: &mut ComponentTree, root: ComponentId) -> bool {
        let Some(current) = self.current_root(tree) else {
            return false;
        };
        if root == current || !tree.is_descendant_of(root, current) || !tree.is_live(root) {
            tracing::debug!(target: targets::FOCUS, ?root, "modal push refused");
            return false;
        }
        self.frames.push(ModalFrame {
            root,
            saved_root: self.input_root,
            saved_focus: self.focus_owner,
        });
        self.input_root = Some(root);
        tracing::debug!(target: targets::FOCUS, ?root, depth = self.frames.len(), "input root pushed");

        self.transfer_focus(tree, None);
        self.validate(tree);
        true
    }

    /// End the modal started for `root`, along with any opened inside it.
    ///
    /// The saved focus owner is restored when still eligible; otherwise the
    /// policy default is used. Unknown roots are ignored.
    pub fn pop_input_root(&mut self, tree: &mut ComponentTree, root: ComponentId) -> bool {
        let Some(position) = self.frames.iter().rposition(|f| f.root == root) else {
            tracing::debug!(target: targets::FOCUS, ?root, "no modal frame to pop");
            return false;
        };
        let frame = self.frames[position];
        self.frames.truncate(position);
        self.restore(tree, frame);
        tracing::debug!(target: targets::FOCUS, ?root, depth = self.frames.len(), "input root popped");
        true
    }

    fn restore(&mut self, tree: &mut ComponentTree, frame: ModalFrame) {
        self.input_root = frame.saved_root;
        if self.focus_owner.is_some_and(|owner| !tree.contains(owner)) {
            self.focus_owner = None;
        }
        let target = frame
            .saved_focus
            .filter(|id| self.is_eligible(tree, *id))
            .or_else(|| self.default_component(tree));
        self.transfer_focus(tree, target);
    }

    /// Unwind modal frames whose root is no longer attached to the tree
    /// root. Returns the number of frames popped.
    pub fn validate_input_root(&mut self, tree: &mut ComponentTree) -> usize {
        let mut unwound = 0;
        while let Some(root) = self.input_root {
            if tree.is_live(root) {
                break;
            }
            let Some(frame) = self.frames.pop() else {
                self.input_root = None;
                break;
            };
            tracing::debug!(target: targets::FOCUS, ?root, "unwinding detached input root");
            self.restore(tree, frame);
            unwound += 1;
        }
        unwound
    }

    // =========================================================================
    // Key interception
    // =========================================================================

    /// Offer `event` to the key dispatchers; true when one consumed it.
    pub(crate) fn pre_dispatch_key_event(&self, tree: &mut ComponentTree, event: &mut KeyEvent) -> bool {
        for dispatcher in &self.dispatchers {
            if dispatcher.dispatch_key_event(tree, event) || event.is_accepted() {
                event.accept();
                return true;
            }
        }
        false
    }

    /// Offer an unconsumed `event` to the post-processors.
    pub(crate) fn post_process_key_event(&self, tree: &mut ComponentTree, event: &mut KeyEvent) -> bool {
        for post_processor in &self.post_processors {
            if post_processor.post_process_key_event(tree, event) || event.is_accepted() {
                event.accept();
                return true;
            }
        }
        false
    }
}

static_assertions::assert_impl_all!(FocusManager: Send);

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use trellis_core::{EventQueue, Rect};

    use super::*;

    type Log = Arc<Mutex<Vec<(FocusEventKind, ComponentId, Option<ComponentId>)>>>;

    fn focusable(tree: &mut ComponentTree, parent: ComponentId, name: &str, log: &Log) -> ComponentId {
        let id = tree.create_named(name);
        tree.add_child(parent, id).unwrap();
        tree.set_bounds(id, Rect::new(0, 0, 10, 10)).unwrap();
        tree.add_key_listener(id, |_, _| {}).unwrap();
        let log = Arc::clone(log);
        tree.add_focus_listener(id, move |_, e| {
            log.lock().push((e.kind, e.source, e.opposite));
        })
        .unwrap();
        id
    }

    fn setup() -> (ComponentTree, ComponentId, Log) {
        let mut tree = ComponentTree::new(Arc::new(EventQueue::new()));
        let root = tree.create_root("root");
        tree.set_bounds(root, Rect::new(0, 0, 100, 100)).unwrap();
        (tree, root, Arc::default())
    }

    #[test]
    fn test_lost_before_gained() {
        let (mut tree, root, log) = setup();
        let a = focusable(&mut tree, root, "a", &log);
        let b = focusable(&mut tree, root, "b", &log);
        let mut focus = FocusManager::new();

        assert!(focus.request_focus(&mut tree, a));
        assert!(!focus.request_focus(&mut tree, a));
        assert!(focus.request_focus(&mut tree, b));
        assert_eq!(
            *log.lock(),
            [
                (FocusEventKind::Gained, a, None),
                (FocusEventKind::Lost, a, Some(b)),
                (FocusEventKind::Gained, b, Some(a)),
            ]
        );
    }

    #[test]
    fn test_request_focus_rejects_unfocusable() {
        let (mut tree, root, _log) = setup();
        let plain = tree.create();
        tree.add_child(root, plain).unwrap();
        let mut focus = FocusManager::new();
        assert!(!focus.request_focus(&mut tree, plain));
        assert_eq!(focus.focus_owner(), None);
    }

    #[test]
    fn test_transfer_forward_requires_owner() {
        let (mut tree, root, log) = setup();
        let a = focusable(&mut tree, root, "a", &log);
        let b = focusable(&mut tree, root, "b", &log);
        let mut focus = FocusManager::new();
        focus.request_focus(&mut tree, a);

        assert!(!focus.transfer_focus_forward(&mut tree, b));
        assert_eq!(focus.focus_owner(), Some(a));
        assert!(focus.transfer_focus_forward(&mut tree, a));
        assert_eq!(focus.focus_owner(), Some(b));
        assert!(focus.transfer_focus_backward(&mut tree, b));
        assert_eq!(focus.focus_owner(), Some(a));
    }

    #[test]
    fn test_validate_moves_focus_off_disabled_owner() {
        let (mut tree, root, log) = setup();
        let a = focusable(&mut tree, root, "a", &log);
        let b = focusable(&mut tree, root, "b", &log);
        let mut focus = FocusManager::with_policy(Box::new(FirstComponentPolicy));
        focus.request_focus(&mut tree, a);

        tree.set_enabled(a, false).unwrap();
        focus.validate(&mut tree);
        assert_eq!(focus.focus_owner(), Some(b));

        tree.set_visible(b, false).unwrap();
        focus.validate(&mut tree);
        assert_eq!(focus.focus_owner(), None);
    }

    #[test]
    fn test_validate_forgets_destroyed_owner() {
        let (mut tree, root, log) = setup();
        let a = focusable(&mut tree, root, "a", &log);
        let mut focus = FocusManager::new();
        focus.request_focus(&mut tree, a);
        tree.destroy(a).unwrap();
        focus.validate(&mut tree);
        assert_eq!(focus.focus_owner(), None);
    }

    #[test]
    fn test_modal_scopes_focus() {
        let (mut tree, root, log) = setup();
        let outside = focusable(&mut tree, root, "outside", &log);
        let dialog = tree.create_named("dialog");
        tree.add_child(root, dialog).unwrap();
        tree.set_bounds(dialog, Rect::new(0, 0, 50, 50)).unwrap();
        let inside = focusable(&mut tree, dialog, "inside", &log);

        let mut focus = FocusManager::new();
        focus.request_focus(&mut tree, outside);
        assert!(focus.push_input_root(&mut tree, dialog));
        assert_eq!(focus.focus_owner(), None);
        assert_eq!(focus.modal_depth(), 1);

        assert!(!focus.request_focus(&mut tree, outside));
        assert!(focus.request_focus(&mut tree, inside));

        assert!(focus.pop_input_root(&mut tree, dialog));
        assert_eq!(focus.focus_owner(), Some(outside));
        assert_eq!(focus.input_root(), None);
    }

    #[test]
    fn test_push_rejects_escalation() {
        let (mut tree, root, log) = setup();
        let dialog = tree.create();
        tree.add_child(root, dialog).unwrap();
        let sibling = focusable(&mut tree, root, "sibling", &log);
        let mut focus = FocusManager::new();

        assert!(!focus.push_input_root(&mut tree, root));
        assert!(focus.push_input_root(&mut tree, dialog));
        assert!(!focus.push_input_root(&mut tree, dialog));
        assert!(!focus.push_input_root(&mut tree, sibling));
        assert_eq!(focus.modal_depth(), 1);
    }

    #[test]
    fn test_pop_searches_below_top() {
        let (mut tree, root, _log) = setup();
        let outer = tree.create();
        let inner = tree.create();
        tree.add_child(root, outer).unwrap();
        tree.add_child(outer, inner).unwrap();
        let mut focus = FocusManager::new();
        focus.push_input_root(&mut tree, outer);
        focus.push_input_root(&mut tree, inner);
        assert_eq!(focus.modal_depth(), 2);

        assert!(!focus.pop_input_root(&mut tree, root));
        assert!(focus.pop_input_root(&mut tree, outer));
        assert_eq!(focus.modal_depth(), 0);
        assert_eq!(focus.current_root(&tree), Some(root));
    }

    #[test]
    fn test_detached_modal_unwinds() {
        let (mut tree, root, log) = setup();
        let before = focusable(&mut tree, root, "before", &log);
        let dialog = tree.create();
        tree.add_child(root, dialog).unwrap();
        let mut focus = FocusManager::new();
        focus.request_focus(&mut tree, before);
        focus.push_input_root(&mut tree, dialog);

        tree.remove_child(root, dialog).unwrap();
        assert_eq!(focus.validate_input_root(&mut tree), 1);
        assert_eq!(focus.modal_depth(), 0);
        assert_eq!(focus.focus_owner(), Some(before));
    }

    #[test]
    fn test_key_interceptors_stop_at_first_consumer() {
        let (mut tree, root, _log) = setup();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut focus = FocusManager::new();
        for (name, consume) in [("first", false), ("second", true), ("third", true)] {
            let calls = Arc::clone(&calls);
            focus.add_key_dispatcher(Arc::new(move |_: &mut ComponentTree, _: &mut KeyEvent| {
                calls.lock().push(name);
                consume
            }));
        }
        let mut event = KeyEvent {
            base: Default::default(),
            kind: crate::events::KeyEventKind::Pressed,
            source: root,
            when_us: 0,
            modifiers: Default::default(),
            key: trellis_core::Key::Enter,
            ch: None,
            location: Default::default(),
        };
        assert!(focus.pre_dispatch_key_event(&mut tree, &mut event));
        assert!(event.is_accepted());
        assert_eq!(*calls.lock(), ["first", "second"]);
        assert!(!focus.post_process_key_event(&mut tree, &mut KeyEvent {
            base: Default::default(),
            ..event
        }));
    }
}
