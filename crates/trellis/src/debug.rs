//! Human-readable dumps of a component tree.
//!
//! ```
//! use std::sync::Arc;
//! use trellis::debug::{TreeDebug, TreeFormatOptions, TreeStyle};
//! use trellis::{ComponentTree, Rect};
//! use trellis_core::EventQueue;
//!
//! let mut tree = ComponentTree::new(Arc::new(EventQueue::new()));
//! let root = tree.create_root("root");
//! let ok = tree.create_named("ok");
//! tree.add_child(root, ok).unwrap();
//! tree.set_bounds(ok, Rect::new(4, 4, 40, 20)).unwrap();
//!
//! let dump = TreeDebug::with_options(TreeFormatOptions {
//!     style: TreeStyle::Ascii,
//!     ..TreeFormatOptions::minimal()
//! })
//! .format_subtree(&tree, root);
//! assert_eq!(dump, "root\n`-- ok\n");
//! ```

use trellis_core::ComponentId;

use crate::component::ComponentTree;

/// Branch drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

/// What each line of a dump shows.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    pub show_ids: bool,
    /// Show local bounds as `x,y wxh`.
    pub show_bounds: bool,
    /// Show `hidden`, `disabled`, `detached` and listener markers.
    pub show_flags: bool,
    /// Maximum depth to descend (`None` for unlimited).
    pub max_depth: Option<usize>,
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_bounds: true,
            show_flags: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_bounds: false,
            show_flags: false,
            ..Default::default()
        }
    }
}

/// Formats a component tree for logs and test failures.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the live tree from its root.
    pub fn format_tree(&self, tree: &ComponentTree) -> String {
        match tree.root() {
            Some(root) => {
                let mut output = format!("Component tree ({} components):\n", tree.len());
                self.format_into(tree, root, 0, &mut Vec::new(), &mut output);
                output
            }
            None => "Component tree: (no root)\n".to_owned(),
        }
    }

    /// Format the subtree below and including `id`.
    pub fn format_subtree(&self, tree: &ComponentTree, id: ComponentId) -> String {
        let mut output = String::new();
        self.format_into(tree, id, 0, &mut Vec::new(), &mut output);
        output
    }

    /// `open` holds, per ancestor level, whether more siblings follow.
    fn format_into(
        &self,
        tree: &ComponentTree,
        id: ComponentId,
        depth: usize,
        open: &mut Vec<bool>,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) || !tree.contains(id) {
            return;
        }

        output.push_str(&self.prefix(open));
        match tree.name(id) {
            Some(name) if !name.is_empty() => output.push_str(name),
            _ => output.push_str("(unnamed)"),
        }
        if self.options.show_ids {
            output.push_str(&format!(" [{:?}]", id));
        }
        if self.options.show_bounds {
            if let Some(b) = tree.bounds(id) {
                output.push_str(&format!(" {},{} {}x{}", b.x(), b.y(), b.width(), b.height()));
            }
        }
        if self.options.show_flags {
            let flags = [
                (!tree.is_visible(id), "hidden"),
                (!tree.is_enabled(id), "disabled"),
                (!tree.is_live(id), "detached"),
                (tree.has_mouse_listener(id), "mouse"),
                (tree.has_key_listener(id), "key"),
            ];
            for (_, flag) in flags.iter().filter(|(set, _)| *set) {
                output.push_str(&format!(" {flag}"));
            }
        }
        output.push('\n');

        let children = tree.children(id);
        for (i, &child) in children.iter().enumerate() {
            open.push(i + 1 < children.len());
            self.format_into(tree, child, depth + 1, open, output);
            open.pop();
        }
    }

    fn prefix(&self, open: &[bool]) -> String {
        let Some((&last_open, ancestors)) = open.split_last() else {
            return String::new();
        };
        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "|-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        };
        let mut prefix = String::new();
        for &more in ancestors {
            prefix.push_str(if more { branch } else { " " });
            prefix.push_str(&" ".repeat(self.options.indent_size + 1));
        }
        prefix.push_str(if last_open { tee } else { corner });
        prefix
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trellis_core::{EventQueue, Rect};

    use super::*;

    #[test]
    fn test_ascii_nesting() {
        let mut tree = ComponentTree::new(Arc::new(EventQueue::new()));
        let root = tree.create_root("root");
        let a = tree.create_named("a");
        let a1 = tree.create_named("a1");
        let b = tree.create_named("b");
        tree.add_child(root, a).unwrap();
        tree.add_child(a, a1).unwrap();
        tree.add_child(root, b).unwrap();

        let debug = TreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        });
        assert_eq!(
            debug.format_subtree(&tree, root),
            "root\n|-- a\n|   `-- a1\n`-- b\n"
        );
    }

    #[test]
    fn test_flags_and_bounds() {
        let mut tree = ComponentTree::new(Arc::new(EventQueue::new()));
        let root = tree.create_root("root");
        let field = tree.create();
        tree.add_child(root, field).unwrap();
        tree.set_bounds(field, Rect::new(1, 2, 30, 40)).unwrap();
        tree.set_visible(field, false).unwrap();
        tree.add_key_listener(field, |_, _| {}).unwrap();

        let debug = TreeDebug::with_options(TreeFormatOptions {
            show_ids: false,
            max_depth: Some(1),
            ..Default::default()
        });
        let dump = debug.format_tree(&tree);
        assert!(dump.starts_with("Component tree (2 components):\n"));
        assert!(dump.contains("(unnamed) 1,2 30x40 hidden key\n"));
    }
}
