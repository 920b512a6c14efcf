//! xbind - pattern-driven XML-to-object binding engine
//!
//! Walks a stream of SAX-like events and, driven by pattern/action bindings registered up front,
//! builds or mutates an object graph held on a value stack.
//!
//! # Architecture
//!
//! - [`Pattern`] / [`matches`] — Element path patterns (`a/b/c`, `*/c`)
//! - [`RuleRegistry`] — Two-tier index from pattern to ordered [`Action`]s
//! - [`MatchPath`] — Path segments maintained as elements open and close
//! - [`ObjectStack`] / [`NamedStacks`] — Default value stack plus named staging stacks
//! - [`Session`] — Per-parse event loop: one frame per open element, hooks fired in order
//! - [`DeferredInvocation`] — Method call that fires once all its parameters have arrived
//! - [`PendingRef`] — Two-phase construction with a replayed command log
//!
//! # Key Design Insights
//!
//! 1. **Immutable configuration, fresh session state**: a [`Binder`] is `Send + Sync` and can be
//!    shared; every parse gets its own [`Session`] whose values are `Rc`-based.
//!
//! 2. **Registration order is the only ordering**: lookup never reorders by specificity.
//!    `begin`/`body` fire in registration order, `end` fires in reverse.
//!
//! 3. **Capabilities instead of reflection**: [`Method`], [`Factory`], [`Constructor`] and
//!    [`PropertySetter`] are plain values built at configuration time; type coercion goes through
//!    a pluggable [`Converter`].
//!
//! # Example
//!
//! ```
//! use xbind::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Greeting { value: String }
//!
//! let set_value = Method::on::<Greeting, _>("Greeting.set_value", |g, args| {
//!     g.value = args[0].to_text().unwrap_or_default();
//!     Ok(())
//! });
//!
//! let binder = Binder::builder()
//!     .rule("root", ObjectCreateAction::new("greeting", Greeting::default))?
//!     .rule("root/foo", CallMethodAction::body_text(set_value))?
//!     .build();
//!
//! let root = binder.parse_str("<root><foo>hello</foo></root>")?.unwrap();
//! let value = root.as_object().unwrap().with(|g: &Greeting| g.value.clone())?;
//! assert_eq!(value, "hello");
//! # Ok::<(), xbind::BindError>(())
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod action;
pub mod actions;
mod attributes;
mod binder;
mod catalog;
mod context;
mod convert;
mod invocation;
mod match_path;
mod method;
mod pattern;
mod pending;
mod rules;
mod session;
mod stack;
mod trace;
mod value;
mod xml;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use action::Action;
pub use attributes::{Attribute, Attributes};
pub use binder::{Binder, BinderBuilder};
pub use catalog::Catalog;
pub use context::Context;
pub use convert::{Converter, ParamType, StandardConverter};
pub use invocation::{DeferredInvocation, ParamSlots};
pub use match_path::{MatchPath, Segment};
pub use method::{Constructor, Factory, Invokable, Method, Properties, PropertySetter};
pub use pattern::{matches, Pattern};
pub use pending::{PendingConstruction, PendingRef};
pub use rules::{Rule, RuleRegistry};
pub use session::{Session, SessionState};
pub use stack::{NamedStacks, ObjectStack};
pub use trace::{Hook, TraceStep};
pub use value::{ObjectRef, Value};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{
    BeanPropertyConfig, CallMethodConfig, CallParamConfig, ConstructConfig, LinkConfig,
    ObjectCreateConfig, ParamSourceConfig, RuleConfig, RulesConfig, SetPropertiesConfig,
    SetPropertyConfig, TypedConfig, UnitConfig,
};
#[cfg(feature = "registry")]
pub use registry::{
    register_core_actions, ActionRegistry, ActionRegistryBuilder, IntoAction, LoadEnv,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use xbind::prelude::*;
/// ```
pub mod prelude {
    pub use crate::actions::{
        BeanPropertySetterAction, CallHandle, CallMethodAction, CallParamAction, ConstructAction,
        FnAction, ObjectCreateAction, ParamSource, SetNextAction, SetPropertiesAction,
        SetPropertyAction, SetRootAction, SetTopAction,
    };
    pub use crate::{
        // Traits
        Action,
        // Core types
        Attribute,
        Attributes,
        // Errors
        BindError,
        Binder,
        BinderBuilder,
        Catalog,
        Constructor,
        Context,
        Converter,
        DeferredInvocation,
        Factory,
        Invokable,
        MatchPath,
        Method,
        ObjectRef,
        ParamType,
        Pattern,
        PendingRef,
        Properties,
        PropertySetter,
        RuleRegistry,
        Session,
        StandardConverter,
        Value,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length of a registered pattern.
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Maximum number of parameters a deferred call or pending construction may declare.
///
/// Catches nonsensical configuration (e.g. a negative count parsed as unsigned) before any
/// slot storage is allocated.
pub const MAX_PARAMS: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from rule registration, parsing and action execution.
///
/// Registration errors ([`PatternSyntax`](Self::PatternSyntax), config errors) are raised before
/// any document is read. Everything else aborts the running parse; the session keeps its state for
/// inspection but accepts no further events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A pattern was rejected at registration time.
    PatternSyntax {
        /// The pattern as written.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Pop or peek went past the bottom of a stack.
    StackEmpty {
        /// Name of the stack, `None` for the default stack.
        stack: Option<String>,
        /// Offset that was requested (0 = top).
        offset: usize,
        /// Depth of the stack at the time.
        depth: usize,
    },
    /// A parameter index outside the declared count.
    IndexOutOfRange {
        /// The index that was supplied.
        index: usize,
        /// The declared parameter count.
        count: usize,
    },
    /// A call target offset does not address an element of the stack.
    TargetResolution {
        /// The requested offset (negative offsets count from the bottom).
        offset: isize,
        /// Depth of the stack at the time.
        depth: usize,
    },
    /// The document ended, or an element closed, without matching structure.
    UnbalancedDocument {
        /// What did not line up.
        detail: String,
    },
    /// An action callback failed. Wraps the original error with the dispatch context.
    Action {
        /// The lifecycle hook that failed (`"begin"`, `"body"`, ...).
        hook: &'static str,
        /// Match path at the time of failure.
        path: String,
        /// Depth of the default object stack at the time of failure.
        depth: usize,
        /// Pattern of the rule whose action failed.
        pattern: String,
        /// The underlying error.
        source: Box<BindError>,
    },
    /// A user-supplied method, factory or constructor reported a failure.
    Invocation {
        /// Name of the method or factory.
        method: String,
        /// The failure message returned by user code.
        message: String,
    },
    /// A value could not be converted to the requested parameter type.
    Conversion {
        /// Debug rendering of the value.
        value: String,
        /// The requested type name.
        target: &'static str,
    },
    /// An object was not of the type the binding expected.
    TypeMismatch {
        /// The type the binding asked for.
        expected: &'static str,
        /// The type actually held.
        found: &'static str,
    },
    /// An object was already borrowed when a binding tried to access it.
    ObjectBusy {
        /// Type of the object.
        type_name: &'static str,
    },
    /// A required attribute was absent from the matched element.
    MissingAttribute {
        /// The attribute name.
        attribute: String,
    },
    /// The XML tokenizer rejected the input.
    Xml {
        /// Byte offset into the input.
        position: u64,
        /// The tokenizer's message.
        message: String,
    },
    /// An event arrived in a state that cannot accept it.
    UnexpectedEvent {
        /// The event (`"start_element"`, ...).
        event: &'static str,
        /// The session state.
        state: &'static str,
    },
    /// An event arrived after the parse already failed.
    Aborted,
    /// Configuration deserialization or construction failed.
    InvalidConfig {
        /// The underlying error message.
        source: String,
    },
    /// A type URL was not found in the action registry.
    UnknownTypeUrl {
        /// The unregistered type URL.
        type_url: String,
        /// Type URLs that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },
    /// A named capability (factory, method, property setter, constructor, call id) is unknown.
    UnknownName {
        /// What kind of name was looked up.
        kind: &'static str,
        /// The name that was not found.
        name: String,
        /// Names that ARE known.
        available: Vec<String>,
    },
}

impl BindError {
    /// Returns the innermost error, unwrapping any [`BindError::Action`] context layers.
    #[must_use]
    pub fn root_cause(&self) -> &BindError {
        match self {
            Self::Action { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn stack_empty(stack: Option<&str>, offset: usize, depth: usize) -> Self {
        Self::StackEmpty {
            stack: stack.map(str::to_owned),
            offset,
            depth,
        }
    }

    pub(crate) fn unknown_name<'a>(
        kind: &'static str,
        name: &str,
        available: impl Iterator<Item = &'a String>,
    ) -> Self {
        let mut available: Vec<String> = available.cloned().collect();
        available.sort_unstable();
        Self::UnknownName {
            kind,
            name: name.to_owned(),
            available,
        }
    }
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PatternSyntax { pattern, reason } => {
                write!(f, "invalid pattern \"{pattern}\": {reason}")
            }
            Self::StackEmpty {
                stack,
                offset,
                depth,
            } => {
                let name = stack.as_deref().unwrap_or("default");
                write!(
                    f,
                    "{name} stack has depth {depth}, cannot access offset {offset} \
                     — check that a rule pushed an object before this one reads it"
                )
            }
            Self::IndexOutOfRange { index, count } => {
                write!(
                    f,
                    "parameter index {index} is out of range for a call with {count} parameters"
                )
            }
            Self::TargetResolution { offset, depth } => {
                write!(
                    f,
                    "target offset {offset} does not address an object on a stack of depth {depth}"
                )
            }
            Self::UnbalancedDocument { detail } => write!(f, "unbalanced document: {detail}"),
            Self::Action {
                hook,
                path,
                depth,
                pattern,
                source,
            } => {
                write!(
                    f,
                    "action for pattern \"{pattern}\" failed in {hook} at \"{path}\" \
                     (stack depth {depth}): {source}"
                )
            }
            Self::Invocation { method, message } => write!(f, "{method} failed: {message}"),
            Self::Conversion { value, target } => {
                write!(f, "cannot convert {value} to {target}")
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected object of type {expected}, found {found}")
            }
            Self::ObjectBusy { type_name } => {
                write!(f, "object of type {type_name} is already borrowed")
            }
            Self::MissingAttribute { attribute } => {
                write!(f, "required attribute \"{attribute}\" is missing")
            }
            Self::Xml { position, message } => {
                write!(f, "XML error at byte {position}: {message}")
            }
            Self::UnexpectedEvent { event, state } => {
                write!(f, "{event} is not valid while the session is {state}")
            }
            Self::Aborted => write!(f, "the parse already failed; no further events are accepted"),
            Self::InvalidConfig { source } => write!(f, "invalid config: {source}"),
            Self::UnknownTypeUrl {
                type_url,
                available,
            } => {
                write!(f, "unknown action type URL \"{type_url}\"")?;
                if available.is_empty() {
                    write!(f, " — no action types are registered")
                } else {
                    write!(f, " — registered: {}", available.join(", "))
                }
            }
            Self::UnknownName {
                kind,
                name,
                available,
            } => {
                write!(f, "unknown {kind} \"{name}\"")?;
                if available.is_empty() {
                    write!(f, " — no {kind} names are registered")
                } else {
                    write!(f, " — registered: {}", available.join(", "))
                }
            }
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Action { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
