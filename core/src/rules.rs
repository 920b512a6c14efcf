//! `RuleRegistry` — Pattern → ordered actions, with two-tier lookup
//!
//! Exact patterns are indexed by their last literal segment, so a lookup only examines rules that
//! could possibly match the element's local name. Wildcard patterns go in a fallback list that is
//! scanned linearly. Both candidate lists are kept in registration order and merged, so the result
//! is ordered by registration alone, never by specificity.

use crate::pattern::last_segment;
use crate::{Action, BindError, Pattern};
use std::collections::HashMap;
use std::sync::Arc;

/// A registered binding: pattern, optional namespace filter, action, registration order.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Pattern,
    namespace: Option<String>,
    action: Arc<dyn Action>,
    order: usize,
}

impl Rule {
    /// The pattern this rule was registered under.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Namespace URI the element must be in, or `None` for any namespace.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The bound action.
    #[must_use]
    pub fn action(&self) -> &dyn Action {
        self.action.as_ref()
    }

    /// Zero-based registration index.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    fn applies_to(&self, path: &str, namespace: &str) -> bool {
        self.namespace.as_deref().map_or(true, |ns| ns == namespace) && self.pattern.matches(path)
    }
}

/// Indexed, append-only store of rules. Read-only once the owning [`Binder`](crate::Binder) is
/// built.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use xbind::{Action, RuleRegistry};
///
/// #[derive(Debug)]
/// struct Noop;
/// impl Action for Noop {}
///
/// let mut rules = RuleRegistry::new();
/// rules.register("*/item", None, Arc::new(Noop))?;
/// rules.register("catalog/item", None, Arc::new(Noop))?;
///
/// let found: Vec<&str> = rules
///     .lookup("catalog/item", "")
///     .map(|r| r.pattern().as_str())
///     .collect();
/// assert_eq!(found, ["*/item", "catalog/item"]);
/// # Ok::<(), xbind::BindError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    exact: HashMap<String, Vec<usize>>,
    wildcard: Vec<usize>,
}

impl RuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `pattern`, optionally restricted to elements in `namespace`.
    ///
    /// # Errors
    ///
    /// [`BindError::PatternSyntax`] if the pattern is malformed.
    pub fn register(
        &mut self,
        pattern: &str,
        namespace: Option<&str>,
        action: Arc<dyn Action>,
    ) -> Result<(), BindError> {
        let pattern = Pattern::parse(pattern)?;
        let order = self.rules.len();

        if pattern.is_wildcard() {
            self.wildcard.push(order);
        } else {
            self.exact
                .entry(pattern.last_segment().to_owned())
                .or_default()
                .push(order);
        }

        log::debug!("registered rule #{order} for \"{pattern}\"");
        self.rules.push(Rule {
            pattern,
            namespace: namespace.map(str::to_owned),
            action,
            order,
        });
        Ok(())
    }

    /// Every rule matching `path` for an element in `namespace`, in registration order.
    pub fn lookup<'a>(
        &'a self,
        path: &'a str,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a Rule> + 'a {
        let exact = self
            .exact
            .get(last_segment(path))
            .map_or(&[][..], Vec::as_slice);
        MergeOrdered::new(exact, &self.wildcard)
            .map(|i| &self.rules[i])
            .filter(move |rule| rule.applies_to(path, namespace))
    }

    /// Indices of the rules matching `path`, in registration order.
    pub(crate) fn lookup_indices(&self, path: &str, namespace: &str) -> Vec<usize> {
        self.lookup(path, namespace).map(Rule::order).collect()
    }

    /// All rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The rule registered at `order`.
    #[must_use]
    pub fn get(&self, order: usize) -> Option<&Rule> {
        self.rules.get(order)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Merges two ascending index lists into one ascending sequence.
struct MergeOrdered<'a> {
    left: &'a [usize],
    right: &'a [usize],
}

impl<'a> MergeOrdered<'a> {
    fn new(left: &'a [usize], right: &'a [usize]) -> Self {
        Self { left, right }
    }
}

impl Iterator for MergeOrdered<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let take_left = match (self.left.first(), self.right.first()) {
            (Some(l), Some(r)) => l < r,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };
        let side = if take_left {
            &mut self.left
        } else {
            &mut self.right
        };
        let (first, rest) = std::mem::take(side).split_first()?;
        *side = rest;
        Some(*first)
    }
}
