//! `Value` — The opaque values held on the session stacks
//!
//! Scalars stay inline. Domain objects are wrapped in an [`ObjectRef`], a shared, interior-mutable
//! handle that bindings downcast to the concrete type they expect. Objects still waiting for
//! constructor arguments travel as [`Value::Pending`] until they are built.
//!
//! Values are `Rc`-based and deliberately `!Send`: they belong to one parse session.

use crate::{BindError, PendingRef};
use std::any::{type_name, Any};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a domain object of any type.
///
/// # Example
///
/// ```
/// use xbind::ObjectRef;
///
/// let obj = ObjectRef::new(vec![1, 2]);
/// obj.with_mut(|v: &mut Vec<i32>| v.push(3))?;
/// assert_eq!(obj.with(|v: &Vec<i32>| v.len())?, 3);
/// assert!(obj.is::<Vec<i32>>());
/// # Ok::<(), xbind::BindError>(())
/// ```
#[derive(Clone)]
pub struct ObjectRef {
    inner: Rc<RefCell<dyn Any>>,
    type_name: &'static str,
}

impl ObjectRef {
    /// Wrap a new object.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the wrapped type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped object is a `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.try_borrow().is_ok_and(|guard| guard.is::<T>())
    }

    /// Borrow the object as `&T`.
    ///
    /// # Errors
    ///
    /// [`BindError::TypeMismatch`] if the object is not a `T`, [`BindError::ObjectBusy`] if it is
    /// currently borrowed mutably.
    pub fn with<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, BindError> {
        let guard = self.inner.try_borrow().map_err(|_| BindError::ObjectBusy {
            type_name: self.type_name,
        })?;
        let value = guard
            .downcast_ref::<T>()
            .ok_or(BindError::TypeMismatch {
                expected: type_name::<T>(),
                found: self.type_name,
            })?;
        Ok(f(value))
    }

    /// Borrow the object as `&mut T`.
    ///
    /// # Errors
    ///
    /// [`BindError::TypeMismatch`] if the object is not a `T`, [`BindError::ObjectBusy`] if it is
    /// currently borrowed.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, BindError> {
        let mut guard = self
            .inner
            .try_borrow_mut()
            .map_err(|_| BindError::ObjectBusy {
                type_name: self.type_name,
            })?;
        let value = guard
            .downcast_mut::<T>()
            .ok_or(BindError::TypeMismatch {
                expected: type_name::<T>(),
                found: self.type_name,
            })?;
        Ok(f(value))
    }

    /// Returns `true` if both handles point at the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectRef").field(&self.type_name).finish()
    }
}

/// A value on the object stack, a parameter, or a method result.
#[derive(Clone, Default)]
pub enum Value {
    /// No value (an unset parameter, a method without a result).
    #[default]
    None,
    /// Text, typically attribute values and body text.
    String(String),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Single character.
    Char(char),
    /// A domain object.
    Object(ObjectRef),
    /// An object whose construction waits for constructor arguments.
    Pending(PendingRef),
}

impl Value {
    /// Wrap a domain object.
    pub fn object<T: Any>(value: T) -> Self {
        Self::Object(ObjectRef::new(value))
    }

    /// Returns `true` if this is [`Value::None`].
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the string slice for [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer for [`Value::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number for [`Value::Float`] or [`Value::Int`].
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the boolean for [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the object handle, looking through a built [`Value::Pending`].
    #[must_use]
    pub fn as_object(&self) -> Option<ObjectRef> {
        match self.resolve() {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Render scalars as text. Objects and `None` have no text form.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(x) => Some(x.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Char(c) => Some(c.to_string()),
            Self::None | Self::Object(_) | Self::Pending(_) => None,
        }
    }

    /// Replace a built [`Value::Pending`] with the object it produced.
    ///
    /// Unbuilt pending values and everything else are returned unchanged.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            Self::Pending(pending) => pending.built().unwrap_or_else(|| self.clone()),
            other => other.clone(),
        }
    }

    /// Returns `true` for a [`Value::Pending`] that has not been built yet.
    #[must_use]
    pub fn is_unbuilt(&self) -> bool {
        matches!(self, Self::Pending(p) if !p.is_built())
    }

    /// Short name of the variant, or the object's type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Object(obj) => obj.type_name(),
            Self::Pending(_) => "pending",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Char(c) => f.debug_tuple("Char").field(c).finish(),
            Self::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
            Self::Pending(p) => f.debug_tuple("Pending").field(p).finish(),
        }
    }
}

// Objects compare by identity, like `MatchingData::Custom`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Pending(a), Self::Pending(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}
