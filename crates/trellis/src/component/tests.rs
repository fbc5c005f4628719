use parking_lot::Mutex;

use trellis_core::{
    AncestorEvent, EventProcessor, FocusDirection, LayoutScope, RawInput,
};

use super::*;

/// Collects drained items so tests can inspect what the tree posted.
#[derive(Default)]
struct Recorder {
    paints: usize,
    layouts: Vec<LayoutScope>,
    focus_requests: Vec<ComponentId>,
    component: Vec<ComponentEvent>,
    ancestor: Vec<AncestorEvent>,
    properties: Vec<PropertyChangeEvent>,
}

impl EventProcessor for Recorder {
    fn process_paint(&mut self, _source: ComponentId) {
        self.paints += 1;
    }
    fn process_layout(&mut self, scope: LayoutScope) {
        self.layouts.push(scope);
    }
    fn process_request_focus(&mut self, source: ComponentId) {
        self.focus_requests.push(source);
    }
    fn process_transfer_focus(&mut self, _source: ComponentId, _direction: FocusDirection) {}
    fn process_push_input_root(&mut self, _root: ComponentId) {}
    fn process_pop_input_root(&mut self, _root: ComponentId) {}
    fn process_component_event(&mut self, event: ComponentEvent) {
        self.component.push(event);
    }
    fn process_ancestor_event(&mut self, event: AncestorEvent) {
        self.ancestor.push(event);
    }
    fn process_property_change(&mut self, event: PropertyChangeEvent) {
        self.properties.push(event);
    }
    fn process_input(&mut self, _input: RawInput) {}
}

fn drain(tree: &ComponentTree) -> Recorder {
    let mut recorder = Recorder::default();
    tree.queue().process_all_events(&mut recorder);
    recorder
}

fn tree_with_root() -> (ComponentTree, ComponentId) {
    let mut tree = ComponentTree::new(Arc::new(EventQueue::new()));
    let root = tree.create_root("root");
    tree.set_bounds(root, Rect::new(0, 0, 200, 100)).unwrap();
    (tree, root)
}

#[test]
fn test_displayed_follows_parent_chain() {
    let (mut tree, root) = tree_with_root();
    let panel = tree.create_named("panel");
    let leaf = tree.create_named("leaf");
    tree.add_child(panel, leaf).unwrap();
    assert!(!tree.is_displayed(leaf));
    assert!(!tree.is_live(leaf));

    tree.add_child(root, panel).unwrap();
    assert!(tree.is_live(leaf));
    assert!(tree.is_displayed(leaf));

    tree.set_visible(panel, false).unwrap();
    assert!(tree.is_visible(leaf));
    assert!(!tree.is_displayed(leaf));

    tree.set_visible(panel, true).unwrap();
    assert!(tree.is_displayed(leaf));

    tree.remove_child(root, panel).unwrap();
    assert!(!tree.is_live(panel));
    assert!(!tree.is_displayed(leaf));
}

#[test]
fn test_shown_and_hidden_events() {
    let (mut tree, root) = tree_with_root();
    let child = tree.create();
    tree.add_child(root, child).unwrap();
    drain(&tree);

    tree.set_visible(child, false).unwrap();
    let recorder = drain(&tree);
    assert!(recorder.component.contains(&ComponentEvent {
        source: child,
        kind: ComponentEventKind::Hidden,
    }));
    assert!(recorder.properties.iter().any(|p| p.source == child
        && p.property == Property::Displayed
        && p.old_value
        && !p.new_value));
}

#[test]
fn test_circular_parentage_is_rejected() {
    let (mut tree, root) = tree_with_root();
    let a = tree.create();
    let b = tree.create();
    tree.add_child(root, a).unwrap();
    tree.add_child(a, b).unwrap();
    assert_eq!(
        tree.add_child(b, a),
        Err(TrellisError::CircularParentage { parent: b, child: a })
    );
    assert_eq!(
        tree.add_child(a, a),
        Err(TrellisError::CircularParentage { parent: a, child: a })
    );
    assert_eq!(tree.add_child(a, root), Err(TrellisError::RootHasParent(root)));
}

#[test]
fn test_add_existing_child_is_noop() {
    let (mut tree, root) = tree_with_root();
    let a = tree.create();
    tree.add_child(root, a).unwrap();
    tree.add_child(root, a).unwrap();
    assert_eq!(tree.children(root), &[a]);
}

#[test]
fn test_reparenting_moves_child() {
    let (mut tree, root) = tree_with_root();
    let first = tree.create();
    let second = tree.create();
    let child = tree.create();
    tree.add_child(root, first).unwrap();
    tree.add_child(root, second).unwrap();
    tree.add_child(first, child).unwrap();
    tree.add_child(second, child).unwrap();
    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[child]);
    assert_eq!(tree.parent(child), Some(second));
}

#[test]
fn test_children_sorted_by_layer_then_insertion() {
    let (mut tree, root) = tree_with_root();
    let a = tree.create_named("a");
    let b = tree.create_named("b");
    let c = tree.create_named("c");
    let d = tree.create_named("d");
    tree.add_child_at_layer(root, a, 0).unwrap();
    tree.add_child_at_layer(root, b, 1).unwrap();
    tree.add_child_at_layer(root, c, -1).unwrap();
    tree.add_child_at_layer(root, d, 0).unwrap();
    assert_eq!(tree.children(root), &[c, a, d, b]);

    tree.set_layer(c, 2).unwrap();
    assert_eq!(tree.children(root), &[a, d, b, c]);
}

#[test]
fn test_absolute_bounds_track_ancestors() {
    let (mut tree, root) = tree_with_root();
    let panel = tree.create();
    let leaf = tree.create();
    tree.add_child(root, panel).unwrap();
    tree.add_child(panel, leaf).unwrap();
    tree.set_bounds(panel, Rect::new(10, 20, 100, 50)).unwrap();
    tree.set_bounds(leaf, Rect::new(5, 5, 10, 10)).unwrap();
    assert_eq!(tree.absolute_bounds(leaf), Some(Rect::new(15, 25, 10, 10)));

    tree.set_location(panel, 30, 40).unwrap();
    assert_eq!(tree.absolute_bounds(leaf), Some(Rect::new(35, 45, 10, 10)));
}

#[test]
fn test_move_and_resize_notifications() {
    let (mut tree, root) = tree_with_root();
    let panel = tree.create();
    let leaf = tree.create();
    tree.add_child(root, panel).unwrap();
    tree.add_child(panel, leaf).unwrap();
    drain(&tree);

    tree.set_bounds(panel, Rect::new(1, 1, 10, 10)).unwrap();
    let recorder = drain(&tree);
    let kinds: Vec<_> = recorder
        .component
        .iter()
        .filter(|e| e.source == panel)
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds, [ComponentEventKind::Moved, ComponentEventKind::Resized]);
    assert!(recorder.ancestor.iter().any(|e| e.source == leaf
        && e.ancestor == panel
        && e.kind == AncestorEventKind::Resized));
    assert_eq!(recorder.layouts, [LayoutScope::Component(panel)]);
}

#[test]
fn test_detached_components_post_nothing() {
    let (mut tree, _root) = tree_with_root();
    drain(&tree);
    let loose = tree.create();
    tree.set_bounds(loose, Rect::new(0, 0, 5, 5)).unwrap();
    tree.repaint(loose);
    tree.invalidate_layout(loose);
    tree.start_modal(loose);
    assert!(!tree.request_focus(loose));
    assert!(tree.queue().is_empty());
    assert!(tree.needs_paint(loose));
}

#[test]
fn test_listener_flags_fire_property_changes() {
    let (mut tree, root) = tree_with_root();
    let button = tree.create();
    tree.add_child(root, button).unwrap();
    drain(&tree);

    let first = tree.add_mouse_listener(button, |_, _| {}).unwrap();
    let second = tree.add_mouse_motion_listener(button, |_, _| {}).unwrap();
    assert!(tree.is_mouse_focusable(button));
    tree.remove_listener(button, first).unwrap();
    let recorder = drain(&tree);
    let flips: Vec<_> = recorder
        .properties
        .iter()
        .filter(|p| p.property == Property::HasMouseListener)
        .map(|p| p.new_value)
        .collect();
    assert_eq!(flips, [true]);

    assert_eq!(tree.remove_listener(button, second), Ok(true));
    assert!(!tree.has_mouse_listener(button));
    let recorder = drain(&tree);
    assert!(recorder
        .properties
        .iter()
        .any(|p| p.property == Property::HasMouseListener && !p.new_value));
}

#[test]
fn test_request_focus_requires_key_listener() {
    let (mut tree, root) = tree_with_root();
    let field = tree.create();
    tree.add_child(root, field).unwrap();
    assert!(!tree.request_focus(field));
    tree.add_key_listener(field, |_, _| {}).unwrap();
    assert!(tree.request_focus(field));
    tree.set_enabled(field, false).unwrap();
    assert!(!tree.request_focus(field));
    let recorder = drain(&tree);
    assert_eq!(recorder.focus_requests, [field]);
}

#[test]
fn test_hit_testing_prefers_front_layer() {
    let (mut tree, root) = tree_with_root();
    let a = tree.create_named("a");
    let b = tree.create_named("b");
    let c = tree.create_named("c");
    for (id, layer) in [(a, 0), (b, 1), (c, -1)] {
        tree.add_child_at_layer(root, id, layer).unwrap();
        tree.set_bounds(id, Rect::new(0, 0, 50, 50)).unwrap();
    }
    assert_eq!(tree.component_at(root, 10, 10), Some(b));
    tree.set_visible(b, false).unwrap();
    assert_eq!(tree.component_at(root, 10, 10), Some(b));
    assert_eq!(tree.displayed_component_at(root, 10, 10), Some(a));
    assert_eq!(tree.component_at(root, 150, 10), Some(root));
    assert_eq!(tree.component_at(root, 250, 10), None);
}

#[test]
fn test_mouse_hit_skips_components_without_listeners() {
    let (mut tree, root) = tree_with_root();
    let back = tree.create();
    let front = tree.create();
    tree.add_child(root, back).unwrap();
    tree.add_child(root, front).unwrap();
    tree.set_bounds(back, Rect::new(0, 0, 50, 50)).unwrap();
    tree.set_bounds(front, Rect::new(0, 0, 50, 50)).unwrap();
    tree.add_mouse_listener(back, |_, _| {}).unwrap();

    assert_eq!(tree.mouse_focusable_component_at(root, 10, 10), Some(back));
    assert_eq!(tree.mouse_focusable_component_at(root, 100, 10), None);
    tree.set_enabled(back, false).unwrap();
    assert_eq!(tree.mouse_focusable_component_at(root, 10, 10), None);
}

#[test]
fn test_nested_hit_uses_local_coordinates() {
    let (mut tree, root) = tree_with_root();
    let panel = tree.create();
    let leaf = tree.create();
    tree.add_child(root, panel).unwrap();
    tree.add_child(panel, leaf).unwrap();
    tree.set_bounds(panel, Rect::new(100, 0, 100, 100)).unwrap();
    tree.set_bounds(leaf, Rect::new(10, 10, 10, 10)).unwrap();
    assert_eq!(tree.component_at(root, 115, 15), Some(leaf));
    assert_eq!(tree.component_at(panel, 15, 15), Some(leaf));
    assert_eq!(tree.component_at(root, 15, 15), Some(root));
}

#[test]
fn test_layout_runs_for_every_descendant() {
    let (mut tree, root) = tree_with_root();
    let panel = tree.create();
    let leaf = tree.create();
    tree.add_child(root, panel).unwrap();
    tree.add_child(panel, leaf).unwrap();
    tree.set_visible(panel, false).unwrap();

    let visits = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&visits);
    tree.set_layout(
        leaf,
        Some(Arc::new(move |_: &mut ComponentTree, pane: ComponentId| {
            seen.lock().push(pane);
        })),
    )
    .unwrap();
    tree.set_layout(
        root,
        Some(Arc::new(|tree: &mut ComponentTree, pane: ComponentId| {
            let size = tree.bounds(pane).map(|b| b.size()).unwrap_or_default();
            for child in tree.children(pane).to_vec() {
                tree.set_bounds(child, Rect::new(0, 0, size.0, size.1)).unwrap();
            }
        })),
    )
    .unwrap();

    tree.tree_process_layout(root);
    assert_eq!(*visits.lock(), [leaf]);
    assert_eq!(tree.bounds(panel), Some(Rect::new(0, 0, 200, 100)));
    assert!(!tree.needs_layout(leaf));
}

#[derive(Default)]
struct Commands(Vec<String>);

impl RenderContext for Commands {
    fn push_state(&mut self) {
        self.0.push("push".into());
    }
    fn pop_state(&mut self) {
        self.0.push("pop".into());
    }
    fn set_viewport(&mut self, viewport: Rect) {
        self.0.push(format!(
            "viewport {} {} {} {}",
            viewport.x(),
            viewport.y(),
            viewport.width(),
            viewport.height()
        ));
    }
    fn set_projection(&mut self, width: i32, height: i32) {
        self.0.push(format!("projection {width} {height}"));
    }
}

#[test]
fn test_paint_nests_state_and_skips_hidden() {
    let (mut tree, root) = tree_with_root();
    let shown = tree.create();
    let hidden = tree.create();
    tree.add_child(root, shown).unwrap();
    tree.add_child(root, hidden).unwrap();
    tree.set_bounds(shown, Rect::new(10, 10, 20, 20)).unwrap();
    tree.set_visible(hidden, false).unwrap();

    let mut commands = Commands::default();
    tree.process_paint(root, &mut commands, 100);
    assert_eq!(
        commands.0,
        [
            "push",
            "viewport 0 0 200 100",
            "projection 200 100",
            "push",
            "viewport 10 70 20 20",
            "projection 20 20",
            "pop",
            "pop",
        ]
    );
    assert!(!tree.needs_paint(shown));
    assert!(tree.needs_paint(hidden));
}

#[test]
fn test_panicking_paint_listener_is_isolated() {
    let (mut tree, root) = tree_with_root();
    let faults = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&faults);
    tree.queue().set_error_handler(Some(Arc::new(move |e: &TrellisError| {
        sink.lock().push(e.clone());
    })));

    let painted = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&painted);
    tree.add_paint_listener(root, |_, _| panic!("bad brush")).unwrap();
    tree.add_paint_listener(root, move |ctx, _| {
        assert_eq!(ctx.bounds, Rect::new(0, 0, 200, 100));
        *counter.lock() += 1;
    })
    .unwrap();

    let mut commands = Commands::default();
    tree.process_paint(root, &mut commands, 100);
    assert_eq!(*painted.lock(), 1);
    assert_eq!(commands.0.last().map(String::as_str), Some("pop"));
    let faults = faults.lock();
    assert_eq!(faults.len(), 1);
    assert!(matches!(&faults[0], TrellisError::Panicked { message, .. } if message == "bad brush"));
}

#[test]
fn test_panicking_paint_listener_leaves_state_balanced() {
    let (mut tree, root) = tree_with_root();
    tree.queue().set_error_handler(Some(Arc::new(|_: &TrellisError| {})));
    let child = tree.create();
    tree.add_child(root, child).unwrap();
    tree.set_bounds(child, Rect::new(10, 10, 20, 20)).unwrap();
    tree.add_paint_listener(root, |_, ctx| {
        ctx.push_state();
        ctx.push_state();
        panic!("half painted");
    })
    .unwrap();

    for _ in 0..2 {
        let mut commands = Commands::default();
        tree.process_paint(root, &mut commands, 100);
        let pushes = commands.0.iter().filter(|c| *c == "push").count();
        let pops = commands.0.iter().filter(|c| *c == "pop").count();
        assert_eq!(pushes, 4);
        assert_eq!(pops, 4);
        // The child still paints nested one level under the root only.
        let child_viewport = commands.0.iter().position(|c| c == "viewport 10 70 20 20").unwrap();
        let depth: i32 = commands.0[..child_viewport]
            .iter()
            .map(|c| match c.as_str() {
                "push" => 1,
                "pop" => -1,
                _ => 0,
            })
            .sum();
        assert_eq!(depth, 2);
    }
}

#[test]
fn test_destroy_removes_subtree() {
    let (mut tree, root) = tree_with_root();
    let panel = tree.create();
    let leaf = tree.create();
    tree.add_child(root, panel).unwrap();
    tree.add_child(panel, leaf).unwrap();
    tree.destroy(panel).unwrap();
    assert!(!tree.contains(panel));
    assert!(!tree.contains(leaf));
    assert!(tree.children(root).is_empty());
    assert_eq!(tree.set_visible(leaf, true), Err(TrellisError::InvalidComponent(leaf)));
}
