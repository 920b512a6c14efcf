//! `ObjectStack` / `NamedStacks` — The value stacks shared by all actions of a session
//!
//! The default stack holds the objects under construction; the first value ever pushed is
//! remembered as the root and survives popping. Named stacks are independent LIFO stacks created
//! on first use, used by cooperating actions to stage values (call parameters, pending calls)
//! without disturbing the default stack.

use crate::{BindError, Value};
use std::collections::HashMap;

/// The default object stack.
#[derive(Debug, Default)]
pub struct ObjectStack {
    items: Vec<Value>,
    root: Option<Value>,
}

impl ObjectStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a value. The first push of a parse also records the root.
    pub fn push(&mut self, value: Value) {
        if self.root.is_none() {
            self.root = Some(value.clone());
        }
        self.items.push(value);
    }

    /// Pop the top value.
    ///
    /// # Errors
    ///
    /// [`BindError::StackEmpty`] on an empty stack.
    pub fn pop(&mut self) -> Result<Value, BindError> {
        self.items
            .pop()
            .ok_or_else(|| BindError::stack_empty(None, 0, 0))
    }

    /// Peek at `offset` from the top (0 = top).
    ///
    /// # Errors
    ///
    /// [`BindError::StackEmpty`] if `offset` is not below the depth.
    pub fn peek(&self, offset: usize) -> Result<&Value, BindError> {
        let depth = self.items.len();
        if offset >= depth {
            return Err(BindError::stack_empty(None, offset, depth));
        }
        Ok(&self.items[depth - 1 - offset])
    }

    /// Resolve a call-target offset.
    ///
    /// Non-negative offsets count from the top (0 = top); negative offsets count from the bottom
    /// (-1 = bottom).
    ///
    /// # Errors
    ///
    /// [`BindError::TargetResolution`] if the offset is outside the stack.
    pub fn resolve(&self, offset: isize) -> Result<&Value, BindError> {
        let depth = self.items.len();
        let index = if offset >= 0 {
            depth.checked_sub(1 + offset.unsigned_abs())
        } else {
            let from_bottom = offset.unsigned_abs() - 1;
            (from_bottom < depth).then_some(from_bottom)
        };
        index
            .and_then(|i| self.items.get(i))
            .ok_or(BindError::TargetResolution { offset, depth })
    }

    /// Current depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is on the stack.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The first value pushed during this parse, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    /// Forget everything, including the root.
    pub fn clear(&mut self) {
        self.items.clear();
        self.root = None;
    }
}

/// Named stacks, created lazily on first push.
#[derive(Debug, Default)]
pub struct NamedStacks {
    stacks: HashMap<String, Vec<Value>>,
}

impl NamedStacks {
    /// Create an empty set of stacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push onto the stack called `name`.
    pub fn push(&mut self, name: &str, value: Value) {
        match self.stacks.get_mut(name) {
            Some(stack) => stack.push(value),
            None => {
                self.stacks.insert(name.to_owned(), vec![value]);
            }
        }
    }

    /// Pop from the stack called `name`.
    ///
    /// # Errors
    ///
    /// [`BindError::StackEmpty`] if the stack is empty or was never used.
    pub fn pop(&mut self, name: &str) -> Result<Value, BindError> {
        self.stacks
            .get_mut(name)
            .and_then(Vec::pop)
            .ok_or_else(|| BindError::stack_empty(Some(name), 0, 0))
    }

    /// Peek at `offset` from the top of the stack called `name`.
    ///
    /// # Errors
    ///
    /// [`BindError::StackEmpty`] if `offset` is not below the depth.
    pub fn peek(&self, name: &str, offset: usize) -> Result<&Value, BindError> {
        let stack = self.stacks.get(name).map_or(&[][..], Vec::as_slice);
        let depth = stack.len();
        if offset >= depth {
            return Err(BindError::stack_empty(Some(name), offset, depth));
        }
        Ok(&stack[depth - 1 - offset])
    }

    /// Depth of the stack called `name` (0 if never used).
    #[must_use]
    pub fn len(&self, name: &str) -> usize {
        self.stacks.get(name).map_or(0, Vec::len)
    }

    /// Returns `true` if the stack called `name` is empty or was never used.
    #[must_use]
    pub fn is_empty(&self, name: &str) -> bool {
        self.len(name) == 0
    }

    /// Drop every named stack.
    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}
