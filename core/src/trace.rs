//! Dispatch trace types for debugging binding behavior.
//!
//! A session created with [`Session::with_trace`](crate::Session::with_trace) records one
//! [`TraceStep`] per action hook it fires, in firing order. The trace shows exactly which rule ran
//! at which path, which is usually the fastest way to see why an object ended up where it did.
//!
//! # Example
//!
//! ```ignore
//! let mut session = binder.session().with_trace();
//! session.feed_str(xml)?;
//! for step in session.trace() {
//!     println!("{:>10} {} <- {}", step.hook, step.path, step.pattern);
//! }
//! ```

use std::fmt;

/// The lifecycle hook an action was fired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Document start, once per registered action.
    ParseStart,
    /// Element start.
    Begin,
    /// A chunk of character data inside the element.
    BodyText,
    /// Element close, with the accumulated body text. Fires before `End`.
    Body,
    /// Element close, in reverse registration order.
    End,
    /// Document end, once per registered action.
    ParseEnd,
}

impl Hook {
    /// The hook name used in error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParseStart => "on_parse_start",
            Self::Begin => "begin",
            Self::BodyText => "body_text",
            Self::Body => "body",
            Self::End => "end",
            Self::ParseEnd => "on_parse_end",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One fired hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Which hook fired.
    pub hook: Hook,
    /// Match path when it fired (empty for document hooks).
    pub path: String,
    /// Pattern of the rule whose action ran.
    pub pattern: String,
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} <- {}", self.hook, self.path, self.pattern)
    }
}
