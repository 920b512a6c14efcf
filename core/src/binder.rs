//! `Binder` — Immutable binding configuration, shareable across threads
//!
//! The builder collects rules and the converter; [`BinderBuilder::build`] freezes them. After
//! that, the only way to use a binder is to open [`Session`]s over it.

use crate::{Action, BindError, Converter, RuleRegistry, Session, StandardConverter, Value};
use std::io::BufRead;
use std::sync::Arc;

/// Builder for a [`Binder`].
///
/// Registration is fallible: malformed patterns are rejected here, before any document is read.
#[derive(Debug)]
pub struct BinderBuilder {
    rules: RuleRegistry,
    converter: Arc<dyn Converter>,
}

impl BinderBuilder {
    /// Create an empty builder using the [`StandardConverter`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: RuleRegistry::new(),
            converter: Arc::new(StandardConverter),
        }
    }

    /// Bind `action` to elements matching `pattern`, in any namespace.
    ///
    /// # Errors
    ///
    /// [`BindError::PatternSyntax`] if the pattern is malformed.
    pub fn rule(self, pattern: &str, action: impl Action + 'static) -> Result<Self, BindError> {
        self.rule_shared(pattern, None, Arc::new(action))
    }

    /// Bind `action` to elements matching `pattern` in the namespace `namespace`.
    ///
    /// # Errors
    ///
    /// [`BindError::PatternSyntax`] if the pattern is malformed.
    pub fn rule_ns(
        self,
        pattern: &str,
        namespace: &str,
        action: impl Action + 'static,
    ) -> Result<Self, BindError> {
        self.rule_shared(pattern, Some(namespace), Arc::new(action))
    }

    /// Bind an already shared action. The same action may be bound under several patterns.
    ///
    /// # Errors
    ///
    /// [`BindError::PatternSyntax`] if the pattern is malformed.
    pub fn rule_shared(
        mut self,
        pattern: &str,
        namespace: Option<&str>,
        action: Arc<dyn Action>,
    ) -> Result<Self, BindError> {
        self.rules.register(pattern, namespace, action)?;
        Ok(self)
    }

    /// Replace the converter used for parameter coercion.
    #[must_use]
    pub fn converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    /// Number of rules registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freeze the configuration. No further registration is possible.
    #[must_use]
    pub fn build(self) -> Binder {
        log::debug!("binder built with {} rules", self.rules.len());
        Binder {
            rules: self.rules,
            converter: self.converter,
        }
    }
}

impl Default for BinderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen rules plus converter. `Send + Sync`: share one binder across threads and give every
/// parse its own [`Session`].
#[derive(Debug)]
pub struct Binder {
    rules: RuleRegistry,
    converter: Arc<dyn Converter>,
}

impl Binder {
    /// Start building a binder.
    #[must_use]
    pub fn builder() -> BinderBuilder {
        BinderBuilder::new()
    }

    /// The registered rules.
    #[must_use]
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// The converter sessions will use.
    #[must_use]
    pub fn converter(&self) -> &Arc<dyn Converter> {
        &self.converter
    }

    /// Open a fresh session for one parse.
    #[must_use]
    pub fn session(&self) -> Session<'_> {
        Session::new(&self.rules, Arc::clone(&self.converter))
    }

    /// Parse a document and return its root object.
    ///
    /// # Errors
    ///
    /// Any XML, dispatch or action failure.
    pub fn parse_str(&self, xml: &str) -> Result<Option<Value>, BindError> {
        let mut session = self.session();
        session.feed_str(xml)?;
        Ok(session.into_root())
    }

    /// Parse a document from a buffered reader and return its root object.
    ///
    /// # Errors
    ///
    /// Any XML, I/O, dispatch or action failure.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Option<Value>, BindError> {
        let mut session = self.session();
        session.feed_reader(reader)?;
        Ok(session.into_root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::FnAction;

    #[test]
    fn malformed_pattern_fails_at_registration() {
        let err = Binder::builder().rule("a/", FnAction::new()).unwrap_err();
        assert!(matches!(err, BindError::PatternSyntax { .. }));
    }

    #[test]
    fn empty_document_has_no_root() {
        let binder = Binder::builder().build();
        assert_eq!(binder.parse_str("<a><b/></a>").unwrap(), None);
    }

    #[test]
    fn one_binder_many_threads() {
        let binder = Arc::new(
            Binder::builder()
                .rule(
                    "n",
                    FnAction::new().on_body(|ctx, _, text| {
                        ctx.push(Value::from(text));
                        Ok(())
                    }),
                )
                .unwrap()
                .build(),
        );

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let binder = Arc::clone(&binder);
                std::thread::spawn(move || {
                    let root = binder.parse_str(&format!("<n>{i}</n>")).unwrap();
                    root.and_then(|v| v.to_text())
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Some(i.to_string()));
        }
    }
}
