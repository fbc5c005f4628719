//! Error types for Trellis.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

use crate::id::ComponentId;

/// Errors reported by tree operations and by the fault-isolation
/// boundaries around event processing and painting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrellisError {
    /// The id does not name a component in this tree (never did, or was destroyed).
    #[error("component {0:?} is not present in the tree")]
    InvalidComponent(ComponentId),

    /// A component cannot become a child of itself or of its own descendant.
    #[error("cannot add {child:?} under {parent:?}: {child:?} is {parent:?} or one of its ancestors")]
    CircularParentage {
        parent: ComponentId,
        child: ComponentId,
    },

    /// Only a parentless component can be attached as the tree root.
    #[error("component {0:?} has a parent and cannot become the root")]
    RootHasParent(ComponentId),

    /// A listener, layout or paint callback panicked and was isolated.
    #[error("panic while {context}: {message}")]
    Panicked { context: String, message: String },
}

/// Result type for Trellis operations.
pub type TrellisResult<T> = Result<T, TrellisError>;

/// Callback receiving isolated faults.
///
/// When none is installed, faults are logged with `tracing::error!`.
pub type ErrorHandler = Arc<dyn Fn(&TrellisError) + Send + Sync>;

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Deliver a fault to `handler`, or log it when there is no handler.
pub fn report_fault(handler: Option<&ErrorHandler>, error: &TrellisError) {
    match handler {
        Some(handler) => handler(error),
        None => tracing::error!(target: crate::logging::targets::CORE, %error, "isolated fault"),
    }
}
