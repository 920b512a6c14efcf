//! `Pattern` — Element path specifications and the pure path matcher
//!
//! Two forms are supported:
//!
//! - Exact: `a/b/c` (a single leading `/` is optional and ignored)
//! - Leading wildcard: `*/c` or `*/b/c`, matching any path that ends with the suffix at a
//!   segment boundary, including the suffix itself as a top-level path
//!
//! [`matches`] never fails. Malformed patterns are rejected by [`Pattern::parse`], which the
//! registry calls at registration time.

use crate::{BindError, MAX_PATTERN_LENGTH};
use std::fmt;

/// A validated, immutable path pattern.
///
/// # Example
///
/// ```
/// use xbind::Pattern;
///
/// let pattern = Pattern::parse("*/item")?;
/// assert!(pattern.is_wildcard());
/// assert!(pattern.matches("catalog/section/item"));
/// assert!(!pattern.matches("catalog/section/lineitem"));
/// # Ok::<(), xbind::BindError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    source: String,
    kind: PatternKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PatternKind {
    /// Normalized path without a leading `/`.
    Exact(String),
    /// The part after the leading `*/`.
    Suffix(String),
}

impl Pattern {
    /// Parse and validate a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::PatternSyntax`] for an empty pattern, an empty segment (`a//b`,
    /// trailing `/`), a `*` anywhere other than a leading `*/`, or a pattern longer than
    /// [`MAX_PATTERN_LENGTH`].
    pub fn parse(source: &str) -> Result<Self, BindError> {
        let reject = |reason: &str| BindError::PatternSyntax {
            pattern: source.to_owned(),
            reason: reason.to_owned(),
        };

        if source.len() > MAX_PATTERN_LENGTH {
            return Err(reject(&format!(
                "pattern length is {}, but maximum allowed is {MAX_PATTERN_LENGTH}",
                source.len()
            )));
        }

        let (wildcard, body) = match source.strip_prefix("*/") {
            Some(rest) => (true, rest),
            None => (false, strip_root(source)),
        };

        if body.is_empty() {
            return Err(reject("pattern has no path segments"));
        }

        for segment in body.split('/') {
            if segment.is_empty() {
                return Err(reject("empty path segment"));
            }
            if segment.contains('*') {
                return Err(reject("wildcards are only supported as a leading \"*/\""));
            }
        }

        let kind = if wildcard {
            PatternKind::Suffix(body.to_owned())
        } else {
            PatternKind::Exact(body.to_owned())
        };

        Ok(Self {
            source: source.to_owned(),
            kind,
        })
    }

    /// The pattern as it was written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` for `*/suffix` patterns.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, PatternKind::Suffix(_))
    }

    /// The last literal segment, used as the registry's index key.
    #[must_use]
    pub fn last_segment(&self) -> &str {
        let body = match &self.kind {
            PatternKind::Exact(p) | PatternKind::Suffix(p) => p.as_str(),
        };
        last_segment(body)
    }

    /// Match a rendered element path against this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path = strip_root(path);
        match &self.kind {
            PatternKind::Exact(exact) => path == exact,
            PatternKind::Suffix(suffix) => matches_suffix(path, suffix),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Match a candidate path against a raw pattern string.
///
/// Stateless and total: patterns that [`Pattern::parse`] would reject simply match by their
/// literal rules (an empty pattern matches only the empty path).
///
/// ```
/// use xbind::matches;
///
/// assert!(matches("a/b/c", "*/c"));
/// assert!(matches("c", "*/c"));
/// assert!(!matches("xc", "*/c"));
/// assert!(matches("/a/b", "a/b"));
/// assert!(!matches("a", ""));
/// ```
#[must_use]
pub fn matches(candidate: &str, pattern: &str) -> bool {
    let candidate = strip_root(candidate);
    match pattern.strip_prefix("*/") {
        Some(suffix) => matches_suffix(candidate, suffix),
        None => candidate == strip_root(pattern),
    }
}

fn matches_suffix(candidate: &str, suffix: &str) -> bool {
    if suffix.is_empty() {
        return false;
    }
    if candidate == suffix {
        return true;
    }
    candidate.len() > suffix.len()
        && candidate.ends_with(suffix)
        && candidate.as_bytes()[candidate.len() - suffix.len() - 1] == b'/'
}

#[inline]
fn strip_root(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

#[inline]
pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
