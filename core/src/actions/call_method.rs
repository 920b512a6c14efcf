//! Deferred method calls staged on a named stack.

use super::text_value;
use crate::{Action, Attributes, BindError, Context, DeferredInvocation, Method, Value};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(0);

// ═══════════════════════════════════════════════════════════════════════════════
// CallHandle
// ═══════════════════════════════════════════════════════════════════════════════

/// Names the named stack a call (or construction) stages on.
///
/// Parameter actions are bound to the handle of the call they feed, so a parameter always goes to
/// the innermost open call of its owner, never to an unrelated call that happens to be open.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CallHandle {
    stack: Arc<str>,
}

impl CallHandle {
    /// A fresh handle, distinct from every other handle in the process.
    #[must_use]
    pub fn new() -> Self {
        let n = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        Self {
            stack: Arc::from(format!("xbind.call.auto.{n}")),
        }
    }

    /// A handle with a stable, caller-chosen id (used by rule configuration).
    ///
    /// Named handles never share a stack with [`new`](Self::new) handles, whatever the id.
    #[must_use]
    pub fn named(id: &str) -> Self {
        Self {
            stack: Arc::from(format!("xbind.call.id.{id}")),
        }
    }

    /// Name of the backing stack in [`Context`].
    #[must_use]
    pub fn stack_name(&self) -> &str {
        &self.stack
    }
}

impl Default for CallHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CallHandle").field(&self.stack).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CallMethodAction
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Params(usize),
    BodyText,
}

/// Calls a method on a stack object once its parameters are known.
///
/// Three shapes:
///
/// - [`new(method, n)`](Self::new) with `n > 0` stages a [`DeferredInvocation`] at `begin`;
///   [`CallParamAction`](super::CallParamAction)s bound to [`handle`](Self::handle) fill it, and it
///   fires as soon as the last slot arrives. At `end`, defaults fill what is still missing; a call
///   that remains incomplete is skipped with a warning unless
///   [`fire_incomplete(true)`](Self::fire_incomplete) passes the gaps as [`Value::None`].
/// - [`new(method, 0)`](Self::new) calls without arguments when the element closes.
/// - [`body_text(method)`](Self::body_text) calls with the element's body text as its only
///   argument when the body is complete.
///
/// The target is resolved when the element opens: offset `0` is the top of the default stack,
/// `1` its parent, and negative offsets count from the bottom (`-1` is the root).
#[derive(Debug, Clone)]
pub struct CallMethodAction {
    method: Method,
    mode: Mode,
    handle: CallHandle,
    target_offset: isize,
    defaults: Vec<Option<String>>,
    trim: bool,
    fire_incomplete: bool,
}

impl CallMethodAction {
    /// Call `method` with `params` parameters.
    #[must_use]
    pub fn new(method: Method, params: usize) -> Self {
        Self::with_mode(method, Mode::Params(params))
    }

    /// Call `method` with the element's body text.
    #[must_use]
    pub fn body_text(method: Method) -> Self {
        Self::with_mode(method, Mode::BodyText)
    }

    fn with_mode(method: Method, mode: Mode) -> Self {
        Self {
            method,
            mode,
            handle: CallHandle::new(),
            target_offset: 0,
            defaults: Vec::new(),
            trim: true,
            fire_incomplete: false,
        }
    }

    /// Which stack element receives the call.
    #[must_use]
    pub fn target_offset(mut self, offset: isize) -> Self {
        self.target_offset = offset;
        self
    }

    /// Value for parameter `index` if no parameter action supplied one by the time the element
    /// closes.
    #[must_use]
    pub fn with_default(mut self, index: usize, value: &str) -> Self {
        if self.defaults.len() <= index {
            self.defaults.resize(index + 1, None);
        }
        self.defaults[index] = Some(value.to_owned());
        self
    }

    /// Whether body text is trimmed before the call (default `true`).
    #[must_use]
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Whether a call still missing parameters at close fires anyway (default `false`).
    #[must_use]
    pub fn fire_incomplete(mut self, fire: bool) -> Self {
        self.fire_incomplete = fire;
        self
    }

    /// Stage on `handle` instead of a fresh one.
    #[must_use]
    pub fn with_handle(mut self, handle: CallHandle) -> Self {
        self.handle = handle;
        self
    }

    /// The handle parameter actions must be bound to.
    #[must_use]
    pub fn handle(&self) -> CallHandle {
        self.handle.clone()
    }

    fn default_values(&self) -> Vec<Option<Value>> {
        self.defaults
            .iter()
            .map(|d| d.as_deref().map(Value::from))
            .collect()
    }

    fn complete(&self, invocation: &mut DeferredInvocation, path: &str) -> Result<(), BindError> {
        if !invocation.fired() {
            invocation.set_defaults(&self.default_values())?;
        }
        if invocation.fired() {
            return Ok(());
        }
        if self.fire_incomplete {
            log::debug!(
                "[CallMethod] {path}: firing {} with {} unset parameters",
                self.method.name(),
                invocation.unset()
            );
            invocation.fire_incomplete()
        } else {
            log::warn!(
                "[CallMethod] {path}: {} still missing {} parameters; call skipped",
                self.method.name(),
                invocation.unset()
            );
            Ok(())
        }
    }
}

impl Action for CallMethodAction {
    fn begin(&self, ctx: &mut Context, path: &str, _: &Attributes) -> Result<(), BindError> {
        let target = ctx.resolve_target(self.target_offset)?.clone();
        log::debug!(
            "[CallMethod] {path}: stage {} on {}",
            self.method.name(),
            target.type_name()
        );
        let staged = match self.mode {
            Mode::Params(n) if n > 0 => {
                let invocation =
                    DeferredInvocation::new(target, self.method.clone(), n, ctx.converter_arc())?;
                Value::object(invocation)
            }
            Mode::Params(_) | Mode::BodyText => target,
        };
        ctx.push_named(self.handle.stack_name(), staged);
        Ok(())
    }

    fn body(&self, ctx: &mut Context, path: &str, text: &str) -> Result<(), BindError> {
        if self.mode != Mode::BodyText {
            return Ok(());
        }
        let target = ctx.peek_named(self.handle.stack_name(), 0)?.clone();
        let value = text_value(text, self.trim);
        log::debug!("[CallMethod] {path}: {}({value:?})", self.method.name());
        let mut invocation =
            DeferredInvocation::new(target, self.method.clone(), 1, ctx.converter_arc())?;
        invocation.set_param(0, value)
    }

    fn end(&self, ctx: &mut Context, path: &str) -> Result<(), BindError> {
        let staged = ctx.pop_named(self.handle.stack_name())?;
        match self.mode {
            Mode::BodyText => Ok(()),
            Mode::Params(0) => {
                log::debug!("[CallMethod] {path}: {}()", self.method.name());
                DeferredInvocation::new(staged, self.method.clone(), 0, ctx.converter_arc())
                    .map(|_| ())
            }
            Mode::Params(_) => {
                let invocation = staged.as_object().ok_or(BindError::TypeMismatch {
                    expected: "DeferredInvocation",
                    found: staged.type_name(),
                })?;
                invocation.with_mut(|inv: &mut DeferredInvocation| self.complete(inv, path))?
            }
        }
    }
}
