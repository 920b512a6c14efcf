use super::CallHandle;
use crate::{Action, Attributes, BindError, Constructor, Context, PendingRef, Value};

/// Two-phase construction: an object whose constructor needs values from inside its element.
///
/// At `begin` a [`PendingRef`] placeholder is pushed onto the default stack (where other actions
/// treat it like any object; calls against it are recorded) and onto [`handle`](Self::handle),
/// where [`CallParamAction`](super::CallParamAction)s supply constructor arguments. The object is
/// built as soon as the last argument arrives, or at `end` with defaults and [`Value::None`] for
/// whatever is still missing. Recorded calls are replayed right after the build. The placeholder
/// is popped at `end`.
#[derive(Debug, Clone)]
pub struct ConstructAction {
    constructor: Constructor,
    handle: CallHandle,
    defaults: Vec<Option<String>>,
}

impl ConstructAction {
    /// Construct with `constructor`.
    #[must_use]
    pub fn new(constructor: Constructor) -> Self {
        Self {
            constructor,
            handle: CallHandle::new(),
            defaults: Vec::new(),
        }
    }

    /// Stage on `handle` instead of a fresh one.
    #[must_use]
    pub fn with_handle(mut self, handle: CallHandle) -> Self {
        self.handle = handle;
        self
    }

    /// The handle constructor-argument actions must be bound to.
    #[must_use]
    pub fn handle(&self) -> CallHandle {
        self.handle.clone()
    }

    /// Value for argument `index` if none was supplied by the time the element closes.
    #[must_use]
    pub fn with_default(mut self, index: usize, value: &str) -> Self {
        if self.defaults.len() <= index {
            self.defaults.resize(index + 1, None);
        }
        self.defaults[index] = Some(value.to_owned());
        self
    }
}

impl Action for ConstructAction {
    fn begin(&self, ctx: &mut Context, path: &str, _: &Attributes) -> Result<(), BindError> {
        let pending = PendingRef::new(self.constructor.clone(), ctx.converter_arc())?;
        log::debug!(
            "[Construct] {path}: push pending {} ({} args)",
            self.constructor.name(),
            self.constructor.arity()
        );
        let value = Value::Pending(pending);
        ctx.push(value.clone());
        ctx.push_named(self.handle.stack_name(), value);
        Ok(())
    }

    fn end(&self, ctx: &mut Context, path: &str) -> Result<(), BindError> {
        let staged = ctx.pop_named(self.handle.stack_name())?;
        let Value::Pending(pending) = &staged else {
            return Err(BindError::TypeMismatch {
                expected: "PendingConstruction",
                found: staged.type_name(),
            });
        };

        let defaults: Vec<Option<Value>> = self
            .defaults
            .iter()
            .map(|d| d.as_deref().map(Value::from))
            .collect();
        pending.set_defaults(&defaults)?;
        let built = pending.finish()?;
        log::debug!("[Construct] {path}: built {}", built.type_name());

        ctx.pop()?;
        Ok(())
    }
}
