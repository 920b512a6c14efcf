//! Invocation capabilities — the binding-time replacement for reflection
//!
//! - [`Invokable`] — anything that can be called with a target and arguments
//! - [`Method`] — a named, typed [`Invokable`] with declared parameter types
//! - [`Factory`] — creates the object an element stands for
//! - [`Constructor`] — creates an object from collected constructor arguments
//! - [`PropertySetter`] / [`Properties`] — named property assignment
//!
//! Each capability is built once, at configuration time, from ordinary closures. The concrete
//! target type is monomorphized into the closure and erased behind `Arc<dyn Fn>`.

use crate::convert::convert_args;
use crate::{Attributes, BindError, Converter, ParamType, Value};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// Invokable
// ═══════════════════════════════════════════════════════════════════════════════

/// Calls something on a target with positional arguments.
///
/// Implemented for every `Fn(&Value, &[Value]) -> Result<Value, BindError>` closure.
pub trait Invokable: Send + Sync {
    /// Invoke on `target`.
    ///
    /// # Errors
    ///
    /// Whatever the underlying call reports.
    fn invoke(&self, target: &Value, args: &[Value]) -> Result<Value, BindError>;
}

impl<F> Invokable for F
where
    F: Fn(&Value, &[Value]) -> Result<Value, BindError> + Send + Sync,
{
    fn invoke(&self, target: &Value, args: &[Value]) -> Result<Value, BindError> {
        self(target, args)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Method
// ═══════════════════════════════════════════════════════════════════════════════

/// A named method with declared parameter types.
///
/// Calls against an unbuilt [`Value::Pending`] target, or with an unbuilt pending argument, are
/// recorded on that pending construction and replayed once it is built.
///
/// # Example
///
/// ```
/// use xbind::{Method, ParamType, StandardConverter, Value};
///
/// #[derive(Default)]
/// struct Counter { total: i64 }
///
/// let add = Method::on::<Counter, _>("Counter.add", |c, args| {
///     c.total += args[0].as_int().unwrap_or(0);
///     Ok(())
/// })
/// .with_param_types([ParamType::Int]);
///
/// let counter = Value::object(Counter::default());
/// add.invoke(&counter, vec!["5".into()], &StandardConverter)?;
/// let total = counter.as_object().unwrap().with(|c: &Counter| c.total)?;
/// assert_eq!(total, 5);
/// # Ok::<(), xbind::BindError>(())
/// ```
#[derive(Clone)]
pub struct Method {
    name: Arc<str>,
    param_types: Arc<[ParamType]>,
    call: Arc<dyn Invokable>,
}

impl Method {
    /// Create a method from a raw [`Invokable`].
    pub fn new(name: &str, call: impl Invokable + 'static) -> Self {
        Self {
            name: Arc::from(name),
            param_types: Arc::from(Vec::new()),
            call: Arc::new(call),
        }
    }

    /// Create a method on objects of type `T`.
    ///
    /// The target is downcast to `T`; user failures are returned as `Err(message)` and surface
    /// as [`BindError::Invocation`].
    pub fn on<T, F>(name: &str, f: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, &[Value]) -> Result<(), String> + Send + Sync + 'static,
    {
        let label: Arc<str> = Arc::from(name);
        let method_name = Arc::clone(&label);
        let call = move |target: &Value, args: &[Value]| -> Result<Value, BindError> {
            let obj = target.as_object().ok_or(BindError::TypeMismatch {
                expected: type_name::<T>(),
                found: target.type_name(),
            })?;
            obj.with_mut(|t: &mut T| f(t, args))?
                .map_err(|message| BindError::Invocation {
                    method: method_name.to_string(),
                    message,
                })?;
            Ok(Value::None)
        };
        Self {
            name: label,
            param_types: Arc::from(Vec::new()),
            call: Arc::new(call),
        }
    }

    /// Declare parameter types; arguments are converted before the call.
    #[must_use]
    pub fn with_param_types(mut self, types: impl IntoIterator<Item = ParamType>) -> Self {
        self.param_types = types.into_iter().collect();
        self
    }

    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter types (empty when undeclared).
    #[must_use]
    pub fn param_types(&self) -> &[ParamType] {
        &self.param_types
    }

    /// Invoke on `target`, converting arguments to the declared types first.
    ///
    /// # Errors
    ///
    /// [`BindError::Conversion`] for arguments that do not convert, or whatever the method
    /// reports.
    pub fn invoke(
        &self,
        target: &Value,
        args: Vec<Value>,
        converter: &dyn Converter,
    ) -> Result<Value, BindError> {
        let target = target.resolve();
        let args: Vec<Value> = args.iter().map(Value::resolve).collect();

        if let Value::Pending(pending) = &target {
            log::debug!("recording {} against pending construction", self.name);
            pending.record(None, self.clone(), args)?;
            return Ok(Value::None);
        }
        if let Some(Value::Pending(pending)) = args.iter().find(|a| a.is_unbuilt()) {
            log::debug!("deferring {} until its pending argument is built", self.name);
            pending.record(Some(target.clone()), self.clone(), args.clone())?;
            return Ok(Value::None);
        }

        let args = convert_args(converter, &self.param_types, args)?;
        log::debug!("invoking {} on {}", self.name, target.type_name());
        self.call.invoke(&target, &args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("param_types", &self.param_types)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Factory
// ═══════════════════════════════════════════════════════════════════════════════

type FactoryFn = dyn Fn(&str, &Attributes) -> Result<Value, String> + Send + Sync;

/// Creates the object an element stands for.
///
/// The closure receives the match path and the element's attributes.
#[derive(Clone)]
pub struct Factory {
    name: Arc<str>,
    create: Arc<FactoryFn>,
}

impl Factory {
    /// A factory that ignores the element and calls a constructor function.
    pub fn new<T, F>(name: &str, f: F) -> Self
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            create: Arc::new(move |_: &str, _: &Attributes| Ok(Value::object(f()))),
        }
    }

    /// A factory that builds from the match path and attributes.
    pub fn from_element<F>(name: &str, f: F) -> Self
    where
        F: Fn(&str, &Attributes) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            create: Arc::new(f),
        }
    }

    /// The factory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create an object.
    ///
    /// # Errors
    ///
    /// [`BindError::Invocation`] if the closure fails.
    pub fn create(&self, path: &str, attributes: &Attributes) -> Result<Value, BindError> {
        (self.create)(path, attributes).map_err(|message| BindError::Invocation {
            method: self.name.to_string(),
            message,
        })
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Factory").field(&self.name).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constructor
// ═══════════════════════════════════════════════════════════════════════════════

type ConstructorFn = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// Creates an object from constructor arguments.
#[derive(Clone)]
pub struct Constructor {
    name: Arc<str>,
    param_types: Arc<[ParamType]>,
    build: Arc<ConstructorFn>,
}

impl Constructor {
    /// A constructor producing a `T` from converted arguments.
    pub fn new<T, F>(name: &str, param_types: impl IntoIterator<Item = ParamType>, f: F) -> Self
    where
        T: Any,
        F: Fn(&[Value]) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            param_types: param_types.into_iter().collect(),
            build: Arc::new(move |args: &[Value]| f(args).map(Value::object)),
        }
    }

    /// The constructor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    /// Convert the arguments and build.
    ///
    /// # Errors
    ///
    /// [`BindError::Conversion`] or [`BindError::Invocation`].
    pub fn build(&self, args: Vec<Value>, converter: &dyn Converter) -> Result<Value, BindError> {
        let args = convert_args(converter, &self.param_types, args)?;
        (self.build)(&args).map_err(|message| BindError::Invocation {
            method: self.name.to_string(),
            message,
        })
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("param_types", &self.param_types)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════════

/// Assigns named properties on a target object.
pub trait PropertySetter: Send + Sync + fmt::Debug {
    /// Set `name` to `value` on `target`.
    ///
    /// Returns `Ok(false)` if the target has no such property.
    ///
    /// # Errors
    ///
    /// Conversion or setter failures.
    fn set_property(
        &self,
        target: &Value,
        name: &str,
        value: Value,
        converter: &dyn Converter,
    ) -> Result<bool, BindError>;
}

/// A table of typed property setters, keyed by property name.
///
/// # Example
///
/// ```
/// use xbind::{ParamType, Properties, PropertySetter, StandardConverter, Value};
///
/// #[derive(Default)]
/// struct Server { port: i64 }
///
/// let props = Properties::new().property::<Server, _>("port", ParamType::Int, |s, v| {
///     s.port = v.as_int().unwrap_or_default();
///     Ok(())
/// });
///
/// let server = Value::object(Server::default());
/// assert!(props.set_property(&server, "port", "8080".into(), &StandardConverter)?);
/// assert!(!props.set_property(&server, "host", "x".into(), &StandardConverter)?);
/// # Ok::<(), xbind::BindError>(())
/// ```
#[derive(Clone, Default)]
pub struct Properties {
    setters: HashMap<String, Method>,
}

impl Properties {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a setter for `name` taking one value of type `ty`.
    #[must_use]
    pub fn property<T, F>(mut self, name: &str, ty: ParamType, f: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, Value) -> Result<(), String> + Send + Sync + 'static,
    {
        let method = Method::on::<T, _>(name, move |t, args| {
            f(t, args.first().cloned().unwrap_or_default())
        })
        .with_param_types([ty]);
        self.setters.insert(name.to_owned(), method);
        self
    }

    /// Returns `true` if a setter is registered for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.setters.contains_key(name)
    }
}

impl PropertySetter for Properties {
    fn set_property(
        &self,
        target: &Value,
        name: &str,
        value: Value,
        converter: &dyn Converter,
    ) -> Result<bool, BindError> {
        match self.setters.get(name) {
            Some(method) => method.invoke(target, vec![value], converter).map(|_| true),
            None => Ok(false),
        }
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.setters.keys().collect();
        names.sort_unstable();
        f.debug_struct("Properties").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StandardConverter;

    #[derive(Debug, Default)]
    struct Point {
        x: i64,
        y: i64,
    }

    fn move_to() -> Method {
        Method::on::<Point, _>("Point.move_to", |p, args| {
            p.x = args[0].as_int().ok_or("x must be an int")?;
            p.y = args[1].as_int().ok_or("y must be an int")?;
            Ok(())
        })
        .with_param_types([ParamType::Int, ParamType::Int])
    }

    #[test]
    fn method_converts_and_calls() {
        let point = Value::object(Point::default());
        move_to()
            .invoke(&point, vec!["3".into(), "4".into()], &StandardConverter)
            .unwrap();
        let (x, y) = point
            .as_object()
            .unwrap()
            .with(|p: &Point| (p.x, p.y))
            .unwrap();
        assert_eq!((x, y), (3, 4));
    }

    #[test]
    fn method_on_wrong_target_type_fails() {
        let err = move_to()
            .invoke(
                &Value::object(String::new()),
                vec![Value::Int(1), Value::Int(2)],
                &StandardConverter,
            )
            .unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn method_on_scalar_target_fails() {
        let err = move_to()
            .invoke(&Value::from("x"), vec![], &StandardConverter)
            .unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { found: "string", .. }));
    }

    #[test]
    fn user_failure_becomes_invocation_error() {
        let fail = Method::on::<Point, _>("Point.fail", |_, _| Err("nope".into()));
        let err = fail
            .invoke(&Value::object(Point::default()), vec![], &StandardConverter)
            .unwrap_err();
        assert_eq!(
            err,
            BindError::Invocation {
                method: "Point.fail".into(),
                message: "nope".into()
            }
        );
    }

    #[test]
    fn raw_invokable_closure() {
        let echo = Method::new("echo", |_: &Value, args: &[Value]| -> Result<Value, BindError> {
            Ok(args[0].clone())
        });
        let out = echo
            .invoke(&Value::None, vec![Value::Int(9)], &StandardConverter)
            .unwrap();
        assert_eq!(out, Value::Int(9));
    }

    #[test]
    fn factory_from_element_sees_attributes() {
        let factory = Factory::from_element("point", |_, attrs| {
            let x = attrs.get("x").unwrap_or("0").parse().map_err(|_| "bad x")?;
            Ok(Value::object(Point { x, y: 0 }))
        });
        let value = factory
            .create("p", &Attributes::new().with("x", "12"))
            .unwrap();
        assert_eq!(value.as_object().unwrap().with(|p: &Point| p.x).unwrap(), 12);

        let err = factory
            .create("p", &Attributes::new().with("x", "z"))
            .unwrap_err();
        assert!(matches!(err, BindError::Invocation { .. }));
    }

    #[test]
    fn constructor_converts_arguments() {
        let ctor = Constructor::new::<Point, _>(
            "Point.new",
            [ParamType::Int, ParamType::Int],
            |args| {
                Ok(Point {
                    x: args[0].as_int().unwrap_or_default(),
                    y: args[1].as_int().unwrap_or_default(),
                })
            },
        );
        assert_eq!(ctor.arity(), 2);
        let value = ctor
            .build(vec!["1".into(), "2".into()], &StandardConverter)
            .unwrap();
        assert_eq!(
            value.as_object().unwrap().with(|p: &Point| p.y).unwrap(),
            2
        );
    }
}
