//! `PendingConstruction` — Two-phase object construction
//!
//! An element whose object needs constructor arguments from its children is represented by a
//! placeholder until every argument slot is filled. Calls made against the placeholder, and calls
//! that would pass the placeholder as an argument, go into a command log. Building the object
//! replays the log in order against the real object.

use crate::invocation::SlotFill;
use crate::{BindError, Constructor, Converter, Method, ParamSlots, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// A call recorded while its target or an argument was still pending.
struct RecordedCall {
    /// `None` targets the pending object itself.
    target: Option<Value>,
    method: Method,
    args: Vec<Value>,
}

/// Constructor arguments collected so far, plus the calls waiting for the object.
pub struct PendingConstruction {
    constructor: Constructor,
    slots: ParamSlots,
    converter: Arc<dyn Converter>,
    built: Option<Value>,
    log: Vec<RecordedCall>,
}

impl PendingConstruction {
    /// Returns `true` once the object exists.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Number of constructor arguments still missing.
    #[must_use]
    pub fn unset(&self) -> usize {
        self.slots.unset()
    }

    /// Number of calls waiting for the object.
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.log.len()
    }
}

impl fmt::Debug for PendingConstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingConstruction")
            .field("constructor", &self.constructor.name())
            .field("unset", &self.slots.unset())
            .field("built", &self.built.is_some())
            .field("recorded", &self.log.len())
            .finish()
    }
}

/// Shared handle to a [`PendingConstruction`], carried on the stacks as [`Value::Pending`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use xbind::{Constructor, Method, ParamType, PendingRef, StandardConverter, Value};
///
/// #[derive(Debug)]
/// struct Pair { left: i64, right: i64, tags: Vec<String> }
///
/// let ctor = Constructor::new::<Pair, _>("Pair.new", [ParamType::Int, ParamType::Int], |a| {
///     Ok(Pair { left: a[0].as_int().unwrap(), right: a[1].as_int().unwrap(), tags: vec![] })
/// });
/// let tag = Method::on::<Pair, _>("Pair.tag", |p, a| {
///     p.tags.push(a[0].to_text().unwrap());
///     Ok(())
/// });
///
/// let pending = PendingRef::new(ctor, Arc::new(StandardConverter))?;
/// let placeholder = Value::Pending(pending.clone());
///
/// // Recorded: the pair does not exist yet.
/// tag.invoke(&placeholder, vec!["first".into()], &StandardConverter)?;
///
/// pending.set_arg(0, "1".into())?;
/// pending.set_arg(1, "2".into())?;
///
/// let pair = placeholder.as_object().unwrap();
/// let built = pair.with(|p: &Pair| (p.left, p.right, p.tags.clone()))?;
/// assert_eq!(built, (1, 2, vec!["first".to_owned()]));
/// # Ok::<(), xbind::BindError>(())
/// ```
#[derive(Clone)]
pub struct PendingRef(Rc<RefCell<PendingConstruction>>);

impl PendingRef {
    /// Start a construction. A constructor without parameters builds immediately.
    ///
    /// # Errors
    ///
    /// Failures of an immediate build.
    pub fn new(constructor: Constructor, converter: Arc<dyn Converter>) -> Result<Self, BindError> {
        let slots = ParamSlots::new(constructor.arity())?;
        let pending = Self(Rc::new(RefCell::new(PendingConstruction {
            constructor,
            slots,
            converter,
            built: None,
            log: Vec::new(),
        })));
        if pending.0.borrow().slots.is_empty() {
            pending.build()?;
        }
        Ok(pending)
    }

    /// Supply constructor argument `index`. Builds the object if this was the last one.
    ///
    /// # Errors
    ///
    /// [`BindError::IndexOutOfRange`], or failures while building and replaying.
    pub fn set_arg(&self, index: usize, value: Value) -> Result<(), BindError> {
        let fill = {
            let mut inner = self.borrow_mut()?;
            if inner.built.is_some() {
                log::warn!(
                    "constructor argument {index} of {} arrived after construction; ignored",
                    inner.constructor.name()
                );
                return Ok(());
            }
            inner.slots.fill(index, value)?
        };
        match fill {
            SlotFill::Filled { complete: true } => self.build(),
            SlotFill::Filled { complete: false } => Ok(()),
            SlotFill::Overwritten => {
                log::warn!("constructor argument {index} was already set; keeping the new value");
                Ok(())
            }
        }
    }

    /// Fill still-unset arguments from `defaults`. May build the object.
    ///
    /// # Errors
    ///
    /// Failures while building and replaying.
    pub fn set_defaults(&self, defaults: &[Option<Value>]) -> Result<(), BindError> {
        for (index, default) in defaults.iter().enumerate() {
            let Some(default) = default else { continue };
            let needed = {
                let inner = self.0.try_borrow().map_err(|_| BindError::ObjectBusy {
                    type_name: "PendingConstruction",
                })?;
                inner.built.is_none() && index < inner.slots.len() && !inner.slots.is_set(index)
            };
            if needed {
                self.set_arg(index, default.clone())?;
            }
        }
        Ok(())
    }

    /// Build now, passing unset arguments as [`Value::None`]. No-op once built.
    ///
    /// # Errors
    ///
    /// Failures while building and replaying.
    pub fn finish(&self) -> Result<Value, BindError> {
        if let Some(value) = self.built() {
            return Ok(value);
        }
        self.build()?;
        self.built().ok_or(BindError::Aborted)
    }

    /// The built object, if construction has happened.
    #[must_use]
    pub fn built(&self) -> Option<Value> {
        self.0.try_borrow().ok().and_then(|inner| inner.built.clone())
    }

    /// Returns `true` once the object exists.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.0.try_borrow().is_ok_and(|inner| inner.is_built())
    }

    /// Number of calls waiting for the object.
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.0.try_borrow().map_or(0, |inner| inner.recorded())
    }

    /// Returns `true` if both handles refer to the same construction.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn record(
        &self,
        target: Option<Value>,
        method: Method,
        args: Vec<Value>,
    ) -> Result<(), BindError> {
        self.borrow_mut()?.log.push(RecordedCall {
            target,
            method,
            args,
        });
        Ok(())
    }

    fn borrow_mut(&self) -> Result<std::cell::RefMut<'_, PendingConstruction>, BindError> {
        self.0.try_borrow_mut().map_err(|_| BindError::ObjectBusy {
            type_name: "PendingConstruction",
        })
    }

    fn build(&self) -> Result<(), BindError> {
        let (value, log, converter) = {
            let mut inner = self.borrow_mut()?;
            let args = inner.slots.values();
            let value = inner.constructor.build(args, inner.converter.as_ref())?;
            log::debug!(
                "built {} with {} recorded calls",
                inner.constructor.name(),
                inner.log.len()
            );
            inner.built = Some(value.clone());
            let log = std::mem::take(&mut inner.log);
            (value, log, Arc::clone(&inner.converter))
        };

        for call in log {
            let target = call.target.unwrap_or_else(|| value.clone());
            call.method.invoke(&target, call.args, converter.as_ref())?;
        }
        Ok(())
    }
}

impl fmt::Debug for PendingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(inner) => inner.fmt(f),
            Err(_) => f.write_str("PendingConstruction(<busy>)"),
        }
    }
}
