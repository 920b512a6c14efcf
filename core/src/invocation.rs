//! `DeferredInvocation` — A method call whose parameters arrive one at a time
//!
//! The call fires synchronously, exactly once, the moment its last unset slot is filled.
//! Re-setting a slot after that overwrites the stored value with a warning and never fires again,
//! and neither does filling a gap left by [`DeferredInvocation::fire_incomplete`].
//! Failures from the invoked method propagate out of the `set_param`/`set_defaults`/`new` call
//! that triggered them.

use crate::{BindError, Converter, Method, Value, MAX_PARAMS};
use std::fmt;
use std::sync::Arc;

/// Outcome of filling one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotFill {
    /// The slot was unset; `complete` reports whether it was the last one.
    Filled { complete: bool },
    /// The slot already held a value, which was overwritten.
    Overwritten,
}

/// Positional parameter slots with an unset counter.
///
/// Shared by [`DeferredInvocation`] and [`PendingConstruction`](crate::PendingConstruction).
#[derive(Debug, Clone)]
pub struct ParamSlots {
    values: Vec<Option<Value>>,
    unset: usize,
}

impl ParamSlots {
    /// Create `count` unset slots.
    ///
    /// # Errors
    ///
    /// [`BindError::IndexOutOfRange`] if `count` exceeds [`MAX_PARAMS`].
    pub fn new(count: usize) -> Result<Self, BindError> {
        if count > MAX_PARAMS {
            return Err(BindError::IndexOutOfRange {
                index: count,
                count: MAX_PARAMS,
            });
        }
        Ok(Self {
            values: vec![None; count],
            unset: count,
        })
    }

    /// Declared slot count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no slots were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of slots still unset.
    #[must_use]
    pub fn unset(&self) -> usize {
        self.unset
    }

    /// Returns `true` if slot `index` has been set.
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(Option::is_some)
    }

    pub(crate) fn fill(&mut self, index: usize, value: Value) -> Result<SlotFill, BindError> {
        let count = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(BindError::IndexOutOfRange { index, count })?;
        if slot.replace(value).is_some() {
            return Ok(SlotFill::Overwritten);
        }
        self.unset -= 1;
        Ok(SlotFill::Filled {
            complete: self.unset == 0,
        })
    }

    /// Current values, with unset slots as [`Value::None`].
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.values
            .iter()
            .map(|v| v.clone().unwrap_or_default())
            .collect()
    }
}

/// A staged method call on a fixed target.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use xbind::{DeferredInvocation, Method, StandardConverter, Value};
///
/// let calls = Value::object(Vec::<String>::new());
/// let join = Method::on::<Vec<String>, _>("join", |log, args| {
///     log.push(format!("{}{}", args[0].as_str().unwrap(), args[1].as_str().unwrap()));
///     Ok(())
/// });
///
/// let mut call = DeferredInvocation::new(calls.clone(), join, 2, Arc::new(StandardConverter))?;
/// call.set_param(1, "b".into())?;
/// assert!(!call.fired());
/// call.set_param(0, "a".into())?;
/// assert!(call.fired());
///
/// let log = calls.as_object().unwrap().with(|v: &Vec<String>| v.clone())?;
/// assert_eq!(log, ["ab"]);
/// # Ok::<(), xbind::BindError>(())
/// ```
pub struct DeferredInvocation {
    target: Value,
    method: Method,
    slots: ParamSlots,
    converter: Arc<dyn Converter>,
    fired: bool,
}

impl DeferredInvocation {
    /// Stage a call with `count` required parameters. A zero-parameter call fires immediately.
    ///
    /// # Errors
    ///
    /// Failures of an immediate zero-parameter call, or a `count` above [`MAX_PARAMS`].
    pub fn new(
        target: Value,
        method: Method,
        count: usize,
        converter: Arc<dyn Converter>,
    ) -> Result<Self, BindError> {
        let mut invocation = Self {
            target,
            method,
            slots: ParamSlots::new(count)?,
            converter,
            fired: false,
        };
        if count == 0 {
            invocation.fire()?;
        }
        Ok(invocation)
    }

    /// Supply parameter `index`. Fires the call if this was the last unset slot.
    ///
    /// # Errors
    ///
    /// [`BindError::IndexOutOfRange`] for an index outside the declared count, or the method's
    /// own failure if the call fires.
    pub fn set_param(&mut self, index: usize, value: Value) -> Result<(), BindError> {
        match self.slots.fill(index, value)? {
            SlotFill::Filled { complete: true } if !self.fired => self.fire(),
            SlotFill::Filled { .. } => Ok(()),
            SlotFill::Overwritten => {
                log::warn!(
                    "parameter {index} of {} was already set; keeping the new value without re-invoking",
                    self.method.name()
                );
                Ok(())
            }
        }
    }

    /// Fill still-unset slots from `defaults`; `None` entries mean "no default".
    ///
    /// Defaults shorter than the declared count leave the remaining slots untouched.
    ///
    /// # Errors
    ///
    /// The method's own failure if a default completes the call.
    pub fn set_defaults(&mut self, defaults: &[Option<Value>]) -> Result<(), BindError> {
        for (index, default) in defaults.iter().enumerate() {
            let Some(default) = default else { continue };
            if index < self.slots.len() && !self.slots.is_set(index) {
                self.set_param(index, default.clone())?;
            }
        }
        Ok(())
    }

    /// Fire now with unset slots passed as [`Value::None`]. No-op if already fired.
    ///
    /// # Errors
    ///
    /// The method's own failure.
    pub fn fire_incomplete(&mut self) -> Result<(), BindError> {
        if self.fired {
            return Ok(());
        }
        self.fire()
    }

    /// Returns `true` once the call has been made.
    #[must_use]
    pub fn fired(&self) -> bool {
        self.fired
    }

    /// Number of parameters still missing.
    #[must_use]
    pub fn unset(&self) -> usize {
        self.slots.unset()
    }

    /// The staged method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    fn fire(&mut self) -> Result<(), BindError> {
        self.fired = true;
        self.method
            .invoke(&self.target, self.slots.values(), self.converter.as_ref())
            .map(|_| ())
    }
}

impl fmt::Debug for DeferredInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredInvocation")
            .field("method", &self.method.name())
            .field("target", &self.target)
            .field("count", &self.slots.len())
            .field("unset", &self.slots.unset())
            .field("fired", &self.fired)
            .finish()
    }
}
