//! `Catalog` — Named capabilities for configuration-driven bindings
//!
//! Rules loaded from configuration refer to factories, methods, property setters and
//! constructors by name. A domain fills a catalog once at startup; lookups of unknown names fail
//! with the list of names that are registered.

use crate::{BindError, Constructor, Factory, Method, PropertySetter};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name → capability tables.
///
/// # Example
///
/// ```
/// use xbind::{Catalog, Factory, Method};
///
/// #[derive(Default)]
/// struct Doc { title: String }
///
/// let catalog = Catalog::new()
///     .factory(Factory::new("doc", Doc::default))
///     .method(Method::on::<Doc, _>("Doc.title", |d, args| {
///         d.title = args[0].to_text().unwrap_or_default();
///         Ok(())
///     }));
///
/// assert!(catalog.get_factory("doc").is_ok());
/// let err = catalog.get_method("Doc.body").unwrap_err();
/// assert!(err.to_string().contains("registered: Doc.title"));
/// ```
#[derive(Clone, Default)]
pub struct Catalog {
    factories: HashMap<String, Factory>,
    methods: HashMap<String, Method>,
    properties: HashMap<String, Arc<dyn PropertySetter>>,
    constructors: HashMap<String, Constructor>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its own name.
    #[must_use]
    pub fn factory(mut self, factory: Factory) -> Self {
        self.factories.insert(factory.name().to_owned(), factory);
        self
    }

    /// Register a method under its own name.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.insert(method.name().to_owned(), method);
        self
    }

    /// Register a property setter under `name`.
    #[must_use]
    pub fn properties(mut self, name: &str, setter: impl PropertySetter + 'static) -> Self {
        self.properties.insert(name.to_owned(), Arc::new(setter));
        self
    }

    /// Register a constructor under its own name.
    #[must_use]
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors
            .insert(constructor.name().to_owned(), constructor);
        self
    }

    /// Look up a factory.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownName`] listing the registered factories.
    pub fn get_factory(&self, name: &str) -> Result<&Factory, BindError> {
        self.factories
            .get(name)
            .ok_or_else(|| BindError::unknown_name("factory", name, self.factories.keys()))
    }

    /// Look up a method.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownName`] listing the registered methods.
    pub fn get_method(&self, name: &str) -> Result<&Method, BindError> {
        self.methods
            .get(name)
            .ok_or_else(|| BindError::unknown_name("method", name, self.methods.keys()))
    }

    /// Look up a property setter.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownName`] listing the registered property setters.
    pub fn get_properties(&self, name: &str) -> Result<Arc<dyn PropertySetter>, BindError> {
        self.properties.get(name).cloned().ok_or_else(|| {
            BindError::unknown_name("property setter", name, self.properties.keys())
        })
    }

    /// Look up a constructor.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownName`] listing the registered constructors.
    pub fn get_constructor(&self, name: &str) -> Result<&Constructor, BindError> {
        self.constructors
            .get(name)
            .ok_or_else(|| BindError::unknown_name("constructor", name, self.constructors.keys()))
    }

    /// Registered factory names (sorted).
    #[must_use]
    pub fn factory_names(&self) -> Vec<&str> {
        sorted(self.factories.keys())
    }

    /// Registered method names (sorted).
    #[must_use]
    pub fn method_names(&self) -> Vec<&str> {
        sorted(self.methods.keys())
    }

    /// Registered property setter names (sorted).
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        sorted(self.properties.keys())
    }

    /// Registered constructor names (sorted).
    #[must_use]
    pub fn constructor_names(&self) -> Vec<&str> {
        sorted(self.constructors.keys())
    }
}

fn sorted<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut names: Vec<&str> = keys.map(String::as_str).collect();
    names.sort_unstable();
    names
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("factories", &self.factory_names())
            .field("methods", &self.method_names())
            .field("properties", &self.property_names())
            .field("constructors", &self.constructor_names())
            .finish()
    }
}
