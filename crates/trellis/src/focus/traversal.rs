//! Traversal policies: which component receives focus next.

use trellis_core::ComponentId;

use crate::component::ComponentTree;

/// Answers next/previous/first/last/default focus queries over a subtree.
///
/// Every answer must be keyboard focusable and a descendant (inclusive) of
/// `root`, or `None`.
pub trait TraversalPolicy: Send + Sync {
    fn first_component(&self, tree: &ComponentTree, root: ComponentId) -> Option<ComponentId>;

    fn last_component(&self, tree: &ComponentTree, root: ComponentId) -> Option<ComponentId>;

    /// The focusable component after `current`, wrapping to the first.
    fn component_after(
        &self,
        tree: &ComponentTree,
        root: ComponentId,
        current: ComponentId,
    ) -> Option<ComponentId>;

    /// The focusable component before `current`, wrapping to the last.
    fn component_before(
        &self,
        tree: &ComponentTree,
        root: ComponentId,
        current: ComponentId,
    ) -> Option<ComponentId>;

    /// The component to focus when nothing valid is focused.
    fn default_component(&self, _tree: &ComponentTree, _root: ComponentId) -> Option<ComponentId> {
        None
    }
}

/// Depth-first pre-order over displayed components, in paint order
/// (parents before children, back to front).
fn document_order(tree: &ComponentTree, root: ComponentId) -> Vec<ComponentId> {
    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        // Hidden subtrees hold nothing focusable.
        if !tree.is_displayed(current) {
            continue;
        }
        order.push(current);
        stack.extend(tree.children(current).iter().rev().copied());
    }
    order
}

/// Focus moves in document order and wraps at either end. Nothing is
/// focused automatically.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentOrderPolicy;

impl TraversalPolicy for DocumentOrderPolicy {
    fn first_component(&self, tree: &ComponentTree, root: ComponentId) -> Option<ComponentId> {
        document_order(tree, root)
            .into_iter()
            .find(|id| tree.is_keyboard_focusable(*id))
    }

    fn last_component(&self, tree: &ComponentTree, root: ComponentId) -> Option<ComponentId> {
        document_order(tree, root)
            .into_iter()
            .rev()
            .find(|id| tree.is_keyboard_focusable(*id))
    }

    fn component_after(
        &self,
        tree: &ComponentTree,
        root: ComponentId,
        current: ComponentId,
    ) -> Option<ComponentId> {
        let order = document_order(tree, root);
        let Some(position) = order.iter().position(|id| *id == current) else {
            return self.first_component(tree, root);
        };
        order[position + 1..]
            .iter()
            .chain(&order[..=position])
            .copied()
            .find(|id| tree.is_keyboard_focusable(*id))
    }

    fn component_before(
        &self,
        tree: &ComponentTree,
        root: ComponentId,
        current: ComponentId,
    ) -> Option<ComponentId> {
        let order = document_order(tree, root);
        let Some(position) = order.iter().position(|id| *id == current) else {
            return self.last_component(tree, root);
        };
        order[..position]
            .iter()
            .rev()
            .chain(order[position..].iter().rev())
            .copied()
            .find(|id| tree.is_keyboard_focusable(*id))
    }
}

/// Document order traversal that also focuses the first focusable
/// component whenever focus would otherwise be empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstComponentPolicy;

impl TraversalPolicy for FirstComponentPolicy {
    fn first_component(&self, tree: &ComponentTree, root: ComponentId) -> Option<ComponentId> {
        DocumentOrderPolicy.first_component(tree, root)
    }

    fn last_component(&self, tree: &ComponentTree, root: ComponentId) -> Option<ComponentId> {
        DocumentOrderPolicy.last_component(tree, root)
    }

    fn component_after(
        &self,
        tree: &ComponentTree,
        root: ComponentId,
        current: ComponentId,
    ) -> Option<ComponentId> {
        DocumentOrderPolicy.component_after(tree, root, current)
    }

    fn component_before(
        &self,
        tree: &ComponentTree,
        root: ComponentId,
        current: ComponentId,
    ) -> Option<ComponentId> {
        DocumentOrderPolicy.component_before(tree, root, current)
    }

    fn default_component(&self, tree: &ComponentTree, root: ComponentId) -> Option<ComponentId> {
        self.first_component(tree, root)
    }
}
