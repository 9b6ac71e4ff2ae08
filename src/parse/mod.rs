//! Parse-time wiring of lifecycle listeners onto interpreted process graphs

pub mod history;
pub mod listeners;

pub use history::*;
pub use listeners::*;

use serde::{Deserialize, Serialize};

/// Kinds of parsed elements a handler can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Process,
    Activity,
    SequenceFlow,
}

/// Invoked once per parsed element of [`ParseHandler::handled_type`] while
/// the interpreted graph is built.
pub trait ParseHandler: Send + Sync {
    fn handled_type(&self) -> ElementKind;

    fn parse(&self, root_scope: &mut dyn ListenerRegistration);
}
