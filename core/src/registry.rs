//! Type registry for config-driven rule loading.
//!
//! The registry turns a [`RulesConfig`] (JSON/YAML) into a [`BinderBuilder`] without
//! domain-specific glue code.
//!
//! # Architecture (axum `BoxedIntoRoute` pattern)
//!
//! Each action type registers itself via [`IntoAction`]. At registration time the concrete type
//! `T` is monomorphized into a closure and erased behind `Box<dyn Fn>`: early type erasure at
//! registration, late invocation at load time.
//!
//! Actions never reference domain types directly. Their payloads name capabilities (factories,
//! methods, property setters, constructors) that are looked up in a [`Catalog`] handed to
//! [`ActionRegistry::load_rules`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use xbind::{register_core_actions, ActionRegistryBuilder, Binder, Catalog, Factory, Method};
//!
//! #[derive(Default)]
//! struct Doc { title: String }
//!
//! let catalog = Arc::new(
//!     Catalog::new()
//!         .factory(Factory::new("doc", Doc::default))
//!         .method(Method::on::<Doc, _>("Doc.title", |d, args| {
//!             d.title = args[0].to_text().unwrap_or_default();
//!             Ok(())
//!         })),
//! );
//! let registry = register_core_actions(ActionRegistryBuilder::new()).build();
//!
//! let config = serde_json::from_value(serde_json::json!({ "rules": [
//!     { "pattern": "doc",
//!       "action": { "type_url": "xbind.core.v1.ObjectCreate", "config": { "factory": "doc" } } },
//!     { "pattern": "doc/title",
//!       "action": { "type_url": "xbind.core.v1.CallMethod",
//!                   "config": { "method": "Doc.title", "body_text": true } } }
//! ]}))?;
//! let binder = registry.load_rules(&config, catalog, Binder::builder())?.build();
//!
//! let root = binder.parse_str("<doc><title>Notes</title></doc>")?.unwrap();
//! assert_eq!(root.as_object().unwrap().with(|d: &Doc| d.title.clone())?, "Notes");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::actions::{
    BeanPropertySetterAction, CallHandle, CallMethodAction, CallParamAction, ConstructAction,
    ObjectCreateAction, ParamSource, SetNextAction, SetPropertiesAction, SetPropertyAction,
    SetRootAction, SetTopAction,
};
use crate::config::{
    BeanPropertyConfig, CallMethodConfig, CallParamConfig, ConstructConfig, LinkConfig,
    ObjectCreateConfig, ParamSourceConfig, RulesConfig, SetPropertiesConfig, SetPropertyConfig,
    TypedConfig,
};
use crate::{Action, BindError, BinderBuilder, Catalog, ParamType, MAX_PARAMS};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for action types that can be constructed from configuration.
///
/// Each action type knows its own config shape via the associated `Config` type. The registry
/// deserializes the payload and calls [`from_config`](Self::from_config) at load time.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use xbind::{Action, BindError, IntoAction, LoadEnv, UnitConfig};
///
/// #[derive(Debug)]
/// struct Ignore;
/// impl Action for Ignore {}
///
/// impl IntoAction for Ignore {
///     type Config = UnitConfig;
///     fn from_config(_: UnitConfig, _: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
///         Ok(Arc::new(Ignore))
///     }
/// }
/// ```
pub trait IntoAction: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct the action from deserialized configuration.
    ///
    /// # Errors
    ///
    /// [`BindError::InvalidConfig`] if the config is semantically invalid, or
    /// [`BindError::UnknownName`] if it names something the catalog lacks.
    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError>;
}

/// What an [`IntoAction`] can see while loading: the catalog and the call ids declared so far.
///
/// Call ids connect a `CallParam` rule to the `CallMethod` or `Construct` rule it feeds. An id
/// must be declared by an earlier rule of the same document.
#[derive(Debug)]
pub struct LoadEnv {
    catalog: Arc<Catalog>,
    calls: HashSet<String>,
}

impl LoadEnv {
    /// Start loading against `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            calls: HashSet::new(),
        }
    }

    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// A shared handle to the catalog, for actions that look names up while parsing.
    #[must_use]
    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Declare call id `id` and return its handle.
    pub fn declare_call(&mut self, id: &str) -> CallHandle {
        self.calls.insert(id.to_owned());
        CallHandle::named(id)
    }

    /// The handle of a previously declared call id.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownName`] if no earlier rule declared `id`.
    pub fn call(&self, id: &str) -> Result<CallHandle, BindError> {
        if self.calls.contains(id) {
            Ok(CallHandle::named(id))
        } else {
            Err(BindError::unknown_name("call id", id, self.calls.iter()))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ActionRegistry
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-erased action factory closure.
type BoxedActionFactory = Box<
    dyn Fn(&serde_json::Value, &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> + Send + Sync,
>;

/// Builder for constructing an [`ActionRegistry`].
///
/// The registry is immutable after [`build()`](Self::build); no runtime registration is possible.
pub struct ActionRegistryBuilder {
    factories: HashMap<String, BoxedActionFactory>,
}

impl ActionRegistryBuilder {
    /// Create a new empty action registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register an action type with a type URL.
    ///
    /// At load time the payload is deserialized as `T::Config` and passed to `T::from_config()`.
    #[must_use]
    pub fn action<T: IntoAction>(mut self, type_url: &str) -> Self {
        self.factories.insert(
            type_url.to_owned(),
            Box::new(|value: &serde_json::Value, env: &mut LoadEnv| {
                let config: T::Config = serde_json::from_value(value.clone()).map_err(|e| {
                    BindError::InvalidConfig {
                        source: e.to_string(),
                    }
                })?;
                T::from_config(config, env)
            }),
        );
        self
    }

    /// Freeze the action registry. No further registration is possible.
    #[must_use]
    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            factories: self.factories,
        }
    }
}

impl Default for ActionRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the built-in actions under `xbind.core.v1.*`.
///
/// Call this in domain `register()` functions, then add domain-specific actions on top.
#[must_use]
pub fn register_core_actions(builder: ActionRegistryBuilder) -> ActionRegistryBuilder {
    builder
        .action::<ObjectCreateAction>("xbind.core.v1.ObjectCreate")
        .action::<SetPropertiesAction>("xbind.core.v1.SetProperties")
        .action::<SetPropertyAction>("xbind.core.v1.SetProperty")
        .action::<BeanPropertySetterAction>("xbind.core.v1.BeanPropertySetter")
        .action::<SetNextAction>("xbind.core.v1.SetNext")
        .action::<SetTopAction>("xbind.core.v1.SetTop")
        .action::<SetRootAction>("xbind.core.v1.SetRoot")
        .action::<CallMethodAction>("xbind.core.v1.CallMethod")
        .action::<CallParamAction>("xbind.core.v1.CallParam")
        .action::<ConstructAction>("xbind.core.v1.Construct")
}

/// Immutable registry of action factories.
pub struct ActionRegistry {
    factories: HashMap<String, BoxedActionFactory>,
}

impl ActionRegistry {
    /// Returns the number of registered action types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no action types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns `true` if the given action type URL is registered.
    #[must_use]
    pub fn contains(&self, type_url: &str) -> bool {
        self.factories.contains_key(type_url)
    }

    /// Returns the registered action type URLs, sorted.
    #[must_use]
    pub fn type_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    /// Build one action.
    ///
    /// # Errors
    ///
    /// [`BindError::UnknownTypeUrl`] listing the registered URLs, or whatever the action's
    /// `from_config` reports.
    pub fn resolve(
        &self,
        config: &TypedConfig,
        env: &mut LoadEnv,
    ) -> Result<Arc<dyn Action>, BindError> {
        let factory =
            self.factories
                .get(&config.type_url)
                .ok_or_else(|| BindError::UnknownTypeUrl {
                    type_url: config.type_url.clone(),
                    available: self.type_urls().into_iter().map(str::to_owned).collect(),
                })?;
        factory(&config.config, env)
    }

    /// Register every rule of `config` on `builder`, in document order.
    ///
    /// # Errors
    ///
    /// The first failing rule's error: unknown type URL, invalid payload, unknown catalog name or
    /// call id, or a malformed pattern.
    pub fn load_rules(
        &self,
        config: &RulesConfig,
        catalog: Arc<Catalog>,
        mut builder: BinderBuilder,
    ) -> Result<BinderBuilder, BindError> {
        let mut env = LoadEnv::new(catalog);
        for rule in &config.rules {
            let action = self.resolve(&rule.action, &mut env)?;
            log::debug!("loaded {} for \"{}\"", rule.action.type_url, rule.pattern);
            builder = builder.rule_shared(&rule.pattern, rule.namespace.as_deref(), action)?;
        }
        Ok(builder)
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("type_urls", &self.type_urls())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Built-in actions
// ═══════════════════════════════════════════════════════════════════════════════

fn invalid(source: impl Into<String>) -> BindError {
    BindError::InvalidConfig {
        source: source.into(),
    }
}

fn check_count(what: &str, count: usize) -> Result<(), BindError> {
    if count > MAX_PARAMS {
        return Err(invalid(format!(
            "{what} declares {count} parameters, limit is {MAX_PARAMS}"
        )));
    }
    Ok(())
}

impl IntoAction for ObjectCreateAction {
    type Config = ObjectCreateConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let factory = env.catalog().get_factory(&config.factory)?.clone();
        let mut action = ObjectCreateAction::from_factory(factory);
        if let Some(attribute) = &config.override_attribute {
            action = action.with_override(attribute, env.shared_catalog());
        }
        Ok(Arc::new(action))
    }
}

impl IntoAction for SetPropertiesAction {
    type Config = SetPropertiesConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let setter = env.catalog().get_properties(&config.setter)?;
        let mut action = SetPropertiesAction::from_shared(setter);
        for (attribute, property) in &config.aliases {
            action = action.alias(attribute, property);
        }
        for attribute in &config.ignore {
            action = action.ignore(attribute);
        }
        Ok(Arc::new(action.ignore_missing(config.ignore_missing)))
    }
}

impl IntoAction for SetPropertyAction {
    type Config = SetPropertyConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let setter = env.catalog().get_properties(&config.setter)?;
        Ok(Arc::new(SetPropertyAction::from_shared(
            setter,
            config.name_attribute.as_deref().unwrap_or("name"),
            config.value_attribute.as_deref().unwrap_or("value"),
        )))
    }
}

impl IntoAction for BeanPropertySetterAction {
    type Config = BeanPropertyConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let setter = env.catalog().get_properties(&config.setter)?;
        let mut action = BeanPropertySetterAction::from_shared(setter).trim(config.trim);
        if let Some(property) = &config.property {
            action = action.property(property);
        }
        Ok(Arc::new(action))
    }
}

impl IntoAction for SetNextAction {
    type Config = LinkConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let method = env.catalog().get_method(&config.method)?.clone();
        Ok(Arc::new(SetNextAction::new(method)))
    }
}

impl IntoAction for SetTopAction {
    type Config = LinkConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let method = env.catalog().get_method(&config.method)?.clone();
        Ok(Arc::new(SetTopAction::new(method)))
    }
}

impl IntoAction for SetRootAction {
    type Config = LinkConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let method = env.catalog().get_method(&config.method)?.clone();
        Ok(Arc::new(SetRootAction::new(method)))
    }
}

impl IntoAction for CallMethodAction {
    type Config = CallMethodConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let mut method = env.catalog().get_method(&config.method)?.clone();
        if let Some(names) = &config.param_types {
            let types = names
                .iter()
                .map(|name| {
                    ParamType::from_name(name)
                        .ok_or_else(|| invalid(format!("unknown parameter type \"{name}\"")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            method = method.with_param_types(types);
        }

        let mut action = if config.body_text {
            if config.params > 0 {
                return Err(invalid(format!(
                    "{}: body_text calls take the body as their only parameter; drop \"params\"",
                    config.method
                )));
            }
            CallMethodAction::body_text(method)
        } else {
            check_count(&config.method, config.params)?;
            CallMethodAction::new(method, config.params)
        };

        action = action
            .target_offset(config.target_offset)
            .trim(config.trim)
            .fire_incomplete(config.fire_incomplete);
        for (index, default) in config.defaults.iter().enumerate() {
            if let Some(default) = default {
                action = action.with_default(index, default);
            }
        }
        if let Some(id) = &config.call {
            action = action.with_handle(env.declare_call(id));
        }
        Ok(Arc::new(action))
    }
}

impl IntoAction for CallParamAction {
    type Config = CallParamConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let handle = env.call(&config.call)?;
        let source = match config.from {
            ParamSourceConfig::Attribute(name) => ParamSource::Attribute(name),
            ParamSourceConfig::BodyText => ParamSource::BodyText,
            ParamSourceConfig::Stack(offset) => ParamSource::Stack(offset),
            ParamSourceConfig::Literal(value) => ParamSource::Literal(value),
            ParamSourceConfig::MatchPath => ParamSource::MatchPath,
        };
        Ok(Arc::new(
            CallParamAction::new(handle, config.index, source).trim(config.trim),
        ))
    }
}

impl IntoAction for ConstructAction {
    type Config = ConstructConfig;

    fn from_config(config: Self::Config, env: &mut LoadEnv) -> Result<Arc<dyn Action>, BindError> {
        let constructor = env.catalog().get_constructor(&config.constructor)?.clone();
        check_count(constructor.name(), constructor.arity())?;
        let mut action = ConstructAction::new(constructor);
        for (index, default) in config.defaults.iter().enumerate() {
            if let Some(default) = default {
                action = action.with_default(index, default);
            }
        }
        if let Some(id) = &config.call {
            action = action.with_handle(env.declare_call(id));
        }
        Ok(Arc::new(action))
    }
}
