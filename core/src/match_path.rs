//! `MatchPath` — The current element path as a stack of segments
//!
//! The rendered `/`-joined string is kept incrementally: each push records the rendered length
//! before it, each pop truncates back to that mark. Empty local names are elided, so pushing `""`
//! leaves the rendering untouched and popping it restores the exact prior string.

use std::fmt;

/// One element on the match path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Namespace URI, empty when the element is not in a namespace.
    pub namespace: String,
    /// Local element name.
    pub local_name: String,
}

/// Stack of path segments maintained as elements open and close.
///
/// # Example
///
/// ```
/// use xbind::MatchPath;
///
/// let mut path = MatchPath::new();
/// path.push("", "catalog");
/// path.push("", "book");
/// assert_eq!(path.as_str(), "catalog/book");
///
/// path.push("", "");
/// assert_eq!(path.as_str(), "catalog/book");
/// path.pop();
/// path.pop();
/// assert_eq!(path.as_str(), "catalog");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatchPath {
    segments: Vec<Segment>,
    rendered: String,
    marks: Vec<usize>,
}

impl MatchPath {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a segment for an opening element.
    pub fn push(&mut self, namespace: &str, local_name: &str) {
        self.marks.push(self.rendered.len());
        if !local_name.is_empty() {
            if !self.rendered.is_empty() {
                self.rendered.push('/');
            }
            self.rendered.push_str(local_name);
        }
        self.segments.push(Segment {
            namespace: namespace.to_owned(),
            local_name: local_name.to_owned(),
        });
    }

    /// Pop the innermost segment, restoring the previous rendering.
    pub fn pop(&mut self) -> Option<Segment> {
        let mark = self.marks.pop()?;
        self.rendered.truncate(mark);
        self.segments.pop()
    }

    /// The rendered `/`-joined path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Number of open segments (including elided empty ones).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` when no element is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The innermost segment.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// All segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.segments.clear();
        self.rendered.clear();
        self.marks.clear();
    }
}

impl fmt::Display for MatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}
