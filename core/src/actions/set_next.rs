//! Linking actions: connect the top object to its parent, or to the root, when the element closes.

use crate::{Action, BindError, Context, Method, Value};

/// On `end`, calls `method` on the parent (second from top) with the top object.
///
/// The classic `parent.add_child(child)` binding.
#[derive(Debug, Clone)]
pub struct SetNextAction {
    method: Method,
}

impl SetNextAction {
    /// Link with `method`, invoked on the parent.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Action for SetNextAction {
    fn end(&self, ctx: &mut Context, path: &str) -> Result<(), BindError> {
        let child = ctx.peek(0)?.clone();
        let parent = ctx.peek(1)?.clone();
        log::debug!(
            "[SetNext] {path}: {}.{}({})",
            parent.type_name(),
            self.method.name(),
            child.type_name()
        );
        self.method.invoke(&parent, vec![child], ctx.converter())?;
        Ok(())
    }
}

/// On `end`, calls `method` on the top object with the parent.
#[derive(Debug, Clone)]
pub struct SetTopAction {
    method: Method,
}

impl SetTopAction {
    /// Link with `method`, invoked on the child.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Action for SetTopAction {
    fn end(&self, ctx: &mut Context, path: &str) -> Result<(), BindError> {
        let child = ctx.peek(0)?.clone();
        let parent = ctx.peek(1)?.clone();
        log::debug!(
            "[SetTop] {path}: {}.{}({})",
            child.type_name(),
            self.method.name(),
            parent.type_name()
        );
        self.method.invoke(&child, vec![parent], ctx.converter())?;
        Ok(())
    }
}

/// On `end`, calls `method` on the root object with the top object.
#[derive(Debug, Clone)]
pub struct SetRootAction {
    method: Method,
}

impl SetRootAction {
    /// Link with `method`, invoked on the root.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Action for SetRootAction {
    fn end(&self, ctx: &mut Context, path: &str) -> Result<(), BindError> {
        let child = ctx.peek(0)?.clone();
        let root = ctx
            .root()
            .cloned()
            .ok_or_else(|| BindError::stack_empty(None, 0, 0))?;
        log::debug!(
            "[SetRoot] {path}: {}.{}({})",
            root.type_name(),
            self.method.name(),
            child.type_name()
        );
        self.method.invoke(&root, vec![child], ctx.converter())?;
        Ok(())
    }
}
