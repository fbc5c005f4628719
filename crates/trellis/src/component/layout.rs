//! Layout strategies and the recursive layout pass.

use std::sync::Arc;

use trellis_core::logging::{PerfSpan, span_names, targets};
use trellis_core::{ComponentId, TrellisResult};

use super::ComponentTree;

/// Positions a pane's children.
///
/// Implementations read the pane's bounds and call
/// [`ComponentTree::set_bounds`] on its children. Any
/// `Fn(&mut ComponentTree, ComponentId)` closure is a layout.
pub trait Layout: Send + Sync {
    fn layout_pane(&self, tree: &mut ComponentTree, pane: ComponentId);
}

impl<F> Layout for F
where
    F: Fn(&mut ComponentTree, ComponentId) + Send + Sync,
{
    fn layout_pane(&self, tree: &mut ComponentTree, pane: ComponentId) {
        self(tree, pane)
    }
}

impl ComponentTree {
    /// Install (or clear) the layout strategy and request a layout pass.
    pub fn set_layout(
        &mut self,
        id: ComponentId,
        layout: Option<Arc<dyn Layout>>,
    ) -> TrellisResult<()> {
        self.node_mut(id)?.layout = layout;
        self.invalidate_layout(id);
        Ok(())
    }

    pub fn has_layout(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.layout.is_some())
    }

    /// Lay out `id` and then every descendant, displayed or not.
    pub fn tree_process_layout(&mut self, id: ComponentId) {
        let _span = PerfSpan::new(span_names::PROCESS_LAYOUT);
        self.layout_recursive(id);
    }

    fn layout_recursive(&mut self, id: ComponentId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.needs_layout = false;
        if let Some(layout) = node.layout.clone() {
            tracing::trace!(target: targets::TREE, ?id, "layout pane");
            layout.layout_pane(self, id);
        }
        let children = self.children(id).to_vec();
        for child in children {
            self.layout_recursive(child);
        }
    }
}
