//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use parking_lot::Mutex;
use trellis::{ComponentId, MouseEvent, MouseEventKind, Rect, RenderContext, RootController};

static INIT: Once = Once::new();

/// Install a test subscriber once; `RUST_LOG` picks the verbosity.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A render context that records what it is asked to do.
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub commands: Vec<String>,
}

impl RenderContext for RecordingContext {
    fn push_state(&mut self) {
        self.commands.push("push".into());
    }

    fn pop_state(&mut self) {
        self.commands.push("pop".into());
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.commands.push(format!(
            "viewport {} {} {} {}",
            viewport.x(),
            viewport.y(),
            viewport.width(),
            viewport.height()
        ));
    }

    fn set_projection(&mut self, width: i32, height: i32) {
        self.commands.push(format!("projection {width} {height}"));
    }
}

/// A mouse event as seen by a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seen {
    pub kind: MouseEventKind,
    pub source: ComponentId,
    pub x: i32,
    pub y: i32,
    pub click_count: u32,
}

impl From<&MouseEvent> for Seen {
    fn from(event: &MouseEvent) -> Self {
        Self {
            kind: event.kind,
            source: event.source,
            x: event.x,
            y: event.y,
            click_count: event.click_count,
        }
    }
}

pub type MouseLog = Arc<Mutex<Vec<Seen>>>;

/// A 200x100 root with pending setup events already drained.
pub fn root_controller() -> RootController {
    init_tracing();
    let mut root = RootController::builder().size(200, 100).build();
    root.process_events();
    root
}

/// Add a child of `parent` at `bounds` and `layer`.
pub fn add_component(
    root: &mut RootController,
    parent: ComponentId,
    name: &str,
    bounds: Rect,
    layer: i32,
) -> ComponentId {
    let tree = root.tree_mut();
    let id = tree.create_named(name);
    tree.add_child_at_layer(parent, id, layer).unwrap();
    tree.set_bounds(id, bounds).unwrap();
    id
}

/// Record every mouse and mouse-motion event `id` receives into `log`.
pub fn track_mouse(root: &mut RootController, id: ComponentId, log: &MouseLog) {
    let tree = root.tree_mut();
    let sink = Arc::clone(log);
    tree.add_mouse_listener(id, move |_, event| sink.lock().push(Seen::from(&*event)))
        .unwrap();
    let sink = Arc::clone(log);
    tree.add_mouse_motion_listener(id, move |_, event| sink.lock().push(Seen::from(&*event)))
        .unwrap();
}

/// Just the kinds, in delivery order, clearing the log.
pub fn take_kinds(log: &MouseLog) -> Vec<MouseEventKind> {
    log.lock().drain(..).map(|seen| seen.kind).collect()
}
