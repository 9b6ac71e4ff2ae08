//! LIFO context stack
//!
//! Commands may synchronously run other commands, and listeners fired in the
//! middle of interpretation may ask for the active command. A stack mirrors
//! that call/return nesting so any code on the call path can recover the
//! innermost active value.

use crate::core::errors::{ContextError, Result};
use tracing::{error, trace};

/// Nested context stack, generic over its payload
#[derive(Debug, Clone)]
pub struct ContextStack<T> {
    name: &'static str,
    entries: Vec<T>,
}

impl<T> ContextStack<T> {
    /// Create an empty stack. Nothing is allocated until the first push.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Name used in logs and errors
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Innermost value, or `None` when nothing was pushed
    pub fn current(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn push(&mut self, value: T) {
        self.entries.push(value);
        trace!(stack = self.name, depth = self.entries.len(), "pushed context");
    }

    /// Remove the innermost value.
    ///
    /// Popping an empty stack means a push/pop mismatch in the caller and is
    /// reported as [`ContextError::EmptyStack`].
    pub fn pop(&mut self) -> Result<T> {
        match self.entries.pop() {
            Some(value) => {
                trace!(stack = self.name, depth = self.entries.len(), "popped context");
                Ok(value)
            }
            None => {
                error!(stack = self.name, "pop on empty context stack");
                Err(ContextError::empty_stack(self.name))
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Calling it on an empty stack does nothing.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            trace!(stack = self.name, dropped = self.entries.len(), "cleared context stack");
            self.entries.clear();
        }
    }
}
