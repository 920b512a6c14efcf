//! `Context` — What an action sees while it runs
//!
//! The session owns one context per parse and lends it mutably to each hook in turn. Actions are
//! shared configuration (`&self`); everything that changes during a parse lives here.

use crate::{BindError, Converter, MatchPath, NamedStacks, ObjectStack, Value};
use std::sync::Arc;

/// Per-parse state lent to action hooks.
#[derive(Debug)]
pub struct Context {
    path: MatchPath,
    stack: ObjectStack,
    named: NamedStacks,
    converter: Arc<dyn Converter>,
}

impl Context {
    /// Create a fresh context using `converter` for parameter coercion.
    #[must_use]
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self {
            path: MatchPath::new(),
            stack: ObjectStack::new(),
            named: NamedStacks::new(),
            converter,
        }
    }

    /// The current match path.
    #[must_use]
    pub fn match_path(&self) -> &MatchPath {
        &self.path
    }

    pub(crate) fn path_mut(&mut self) -> &mut MatchPath {
        &mut self.path
    }

    /// Local name of the innermost open element.
    #[must_use]
    pub fn current_element(&self) -> Option<&str> {
        self.path.last().map(|s| s.local_name.as_str())
    }

    // ── default stack ──────────────────────────────────────────────────────────

    /// Push onto the default stack.
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop the default stack.
    ///
    /// # Errors
    ///
    /// [`BindError::StackEmpty`] on an empty stack.
    pub fn pop(&mut self) -> Result<Value, BindError> {
        self.stack.pop()
    }

    /// Peek at `offset` from the top of the default stack.
    ///
    /// # Errors
    ///
    /// [`BindError::StackEmpty`] if `offset` is not below the depth.
    pub fn peek(&self, offset: usize) -> Result<&Value, BindError> {
        self.stack.peek(offset)
    }

    /// Resolve a call-target offset (negative offsets count from the bottom).
    ///
    /// # Errors
    ///
    /// [`BindError::TargetResolution`] if the offset is outside the stack.
    pub fn resolve_target(&self, offset: isize) -> Result<&Value, BindError> {
        self.stack.resolve(offset)
    }

    /// Depth of the default stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The first value pushed during this parse.
    #[must_use]
    pub fn root(&self) -> Option<&Value> {
        self.stack.root()
    }

    // ── named stacks ───────────────────────────────────────────────────────────

    /// Push onto the stack called `name`.
    pub fn push_named(&mut self, name: &str, value: Value) {
        self.named.push(name, value);
    }

    /// Pop from the stack called `name`.
    ///
    /// # Errors
    ///
    /// [`BindError::StackEmpty`] if the stack is empty.
    pub fn pop_named(&mut self, name: &str) -> Result<Value, BindError> {
        self.named.pop(name)
    }

    /// Peek at `offset` from the top of the stack called `name`.
    ///
    /// # Errors
    ///
    /// [`BindError::StackEmpty`] if `offset` is not below the depth.
    pub fn peek_named(&self, name: &str, offset: usize) -> Result<&Value, BindError> {
        self.named.peek(name, offset)
    }

    /// Returns `true` if the stack called `name` is empty or unused.
    #[must_use]
    pub fn is_named_empty(&self, name: &str) -> bool {
        self.named.is_empty(name)
    }

    // ── conversion ─────────────────────────────────────────────────────────────

    /// The session's converter.
    #[must_use]
    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    /// A shared handle to the converter, for values that outlive the current hook.
    #[must_use]
    pub fn converter_arc(&self) -> Arc<dyn Converter> {
        Arc::clone(&self.converter)
    }

    pub(crate) fn reset(&mut self) {
        self.path.clear();
        self.stack.clear();
        self.named.clear();
    }
}
