//! Frame processing: coalesced repaints, layout, painting and fault isolation.

mod common;

use std::sync::Arc;
use std::thread;

use common::{MouseLog, RecordingContext, add_component, root_controller, take_kinds, track_mouse};
use parking_lot::Mutex;
use trellis::{
    ComponentId, ComponentTree, Modifiers, MouseButton, MouseEventKind, RawInput, Rect,
    TrellisError,
};

#[test]
fn test_repaints_coalesce_into_one_frame() {
    let mut root = root_controller();
    let parent = root.root();
    let panel = add_component(&mut root, parent, "panel", Rect::new(0, 0, 50, 50), 0);
    let paints = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&paints);
    root.tree_mut()
        .add_paint_listener(panel, move |_, _| *counter.lock() += 1)
        .unwrap();

    let mut ctx = RecordingContext::default();
    assert!(root.tick(&mut ctx));
    assert_eq!(*paints.lock(), 1);
    assert!(!root.tick(&mut ctx));

    for _ in 0..5 {
        root.tree_mut().repaint(panel);
    }
    root.tree_mut().repaint(parent);
    assert!(root.queue().has_pending_paint());
    assert_eq!(root.queue().pending_count(), 1);

    assert!(root.tick(&mut ctx));
    assert_eq!(*paints.lock(), 2);
    assert!(!root.tick(&mut ctx));
}

#[test]
fn test_ignoring_repaints_paints_every_tick() {
    let mut root = root_controller();
    let mut ctx = RecordingContext::default();
    root.tick(&mut ctx);

    root.queue().ignore_repaints(true);
    let parent = root.root();
    root.tree_mut().repaint(parent);
    assert!(!root.queue().has_pending_paint());
    assert!(root.tick(&mut ctx));
    assert!(root.tick(&mut ctx));

    root.queue().ignore_repaints(false);
    assert!(!root.tick(&mut ctx));
}

#[test]
fn test_paint_runs_back_to_front_in_surface_coordinates() {
    let mut root = root_controller();
    let parent = root.root();
    let bounds = Rect::new(10, 10, 20, 20);
    let a = add_component(&mut root, parent, "a", bounds, 0);
    let b = add_component(&mut root, parent, "b", bounds, 1);
    let c = add_component(&mut root, parent, "c", bounds, -1);
    let hidden = add_component(&mut root, parent, "hidden", bounds, 2);
    root.tree_mut().set_visible(hidden, false).unwrap();

    let order: Arc<Mutex<Vec<ComponentId>>> = Arc::default();
    for id in [a, b, c, hidden] {
        let sink = Arc::clone(&order);
        root.tree_mut()
            .add_paint_listener(id, move |paint, _| {
                assert_eq!(paint.bounds, Rect::new(0, 0, 20, 20));
                sink.lock().push(paint.component);
            })
            .unwrap();
    }

    let mut ctx = RecordingContext::default();
    assert!(root.tick(&mut ctx));
    assert_eq!(*order.lock(), [c, a, b]);
    // Top-left (10, 10) in a 200x100 root is y = 100 - 30 from the bottom.
    assert!(ctx.commands.iter().any(|cmd| cmd == "viewport 10 70 20 20"));
    let pushes = ctx.commands.iter().filter(|cmd| *cmd == "push").count();
    let pops = ctx.commands.iter().filter(|cmd| *cmd == "pop").count();
    assert_eq!(pushes, pops);
}

#[test]
fn test_layout_follows_resize() {
    let mut root = root_controller();
    let parent = root.root();
    let content = add_component(&mut root, parent, "content", Rect::new(0, 0, 10, 10), 0);
    root.tree_mut()
        .set_layout(
            parent,
            Some(Arc::new(|tree: &mut ComponentTree, pane: ComponentId| {
                let Some(area) = tree.bounds(pane) else {
                    return;
                };
                for child in tree.children(pane).to_vec() {
                    tree.set_bounds(child, Rect::new(0, 0, area.width(), area.height()))
                        .unwrap();
                }
            })),
        )
        .unwrap();
    root.process_events();
    assert_eq!(root.tree().bounds(content), Some(Rect::new(0, 0, 200, 100)));

    root.resize(320, 240).unwrap();
    root.process_events();
    assert_eq!(root.tree().bounds(content), Some(Rect::new(0, 0, 320, 240)));
    assert!(!root.tree().needs_layout(parent));
    assert!(!root.tree().needs_layout(content));
}

#[test]
fn test_panicking_listener_is_reported_and_contained() {
    let mut root = root_controller();
    let faults = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&faults);
    root.set_error_handler(Some(Arc::new(move |error: &TrellisError| {
        sink.lock().push(error.to_string());
    })));

    let parent = root.root();
    let button = add_component(&mut root, parent, "button", Rect::new(0, 0, 50, 50), 0);
    let log = MouseLog::default();
    track_mouse(&mut root, button, &log);
    root.tree_mut()
        .add_mouse_listener(button, |_, event| {
            if event.kind == MouseEventKind::Clicked {
                panic!("click handler failed");
            }
        })
        .unwrap();
    root.process_events();

    let none = Modifiers::empty();
    root.mouse_pressed(0, none, MouseButton::Primary, 10, 10, false);
    assert!(!root.mouse_released(1_000, none, MouseButton::Primary, 10, 10, false, true));
    {
        let faults = faults.lock();
        assert_eq!(faults.len(), 1);
        assert!(faults[0].contains("click handler failed"));
    }
    assert_eq!(root.input().button_focus(), None);

    // Input keeps flowing after the fault.
    log.lock().clear();
    root.mouse_moved(2_000, none, 20, 20);
    assert_eq!(take_kinds(&log), [MouseEventKind::Moved]);
}

#[test]
fn test_input_posted_from_worker_thread() {
    let mut root = root_controller();
    let parent = root.root();
    let button = add_component(&mut root, parent, "button", Rect::new(0, 0, 50, 50), 0);
    let log = MouseLog::default();
    track_mouse(&mut root, button, &log);
    root.process_events();

    let queue = Arc::clone(root.queue());
    thread::spawn(move || {
        let modifiers = Modifiers::empty();
        queue.fire_input(RawInput::MouseMoved {
            when_us: 0,
            modifiers,
            x: 5,
            y: 5,
        });
        queue.fire_input(RawInput::MousePressed {
            when_us: 1_000,
            modifiers,
            button: MouseButton::Primary,
            x: 5,
            y: 5,
            popup_trigger: false,
        });
        queue.fire_input(RawInput::MouseReleased {
            when_us: 2_000,
            modifiers,
            button: MouseButton::Primary,
            x: 5,
            y: 5,
            popup_trigger: false,
            generate_click: true,
        });
    })
    .join()
    .unwrap();

    assert!(log.lock().is_empty());
    root.process_events();
    assert_eq!(
        take_kinds(&log),
        [
            MouseEventKind::Entered,
            MouseEventKind::Moved,
            MouseEventKind::Pressed,
            MouseEventKind::Released,
            MouseEventKind::Clicked
        ]
    );
}

#[test]
fn test_runnables_run_on_controller_thread() {
    let mut root = root_controller();
    let ran = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&ran);
    let queue = Arc::clone(root.queue());
    thread::spawn(move || {
        queue.fire_runnable(move || *sink.lock() = Some(thread::current().id()));
    })
    .join()
    .unwrap();

    root.process_events();
    assert_eq!(*ran.lock(), Some(thread::current().id()));
}
