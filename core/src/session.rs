//! `Session` — The per-parse event loop
//!
//! A session receives SAX-like events, keeps the match path and one frame per open element, and
//! fires the matched actions' hooks in order. The rules matched at open time are cached on the
//! frame, so the same actions see `begin`, `body_text`, `body` and `end`.
//!
//! ```text
//!             start_document              end_document
//!   Idle ─────────────────────▶ InDocument ─────────────▶ Idle
//!                                   │
//!                                   │ any error
//!                                   ▼
//!                                 Failed   (every later event: Aborted)
//! ```

use crate::trace::{Hook, TraceStep};
use crate::xml;
use crate::{Action, Attributes, BindError, Context, Converter, RuleRegistry, Value};
use std::io::BufRead;
use std::sync::Arc;

/// Where a session is in its document lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for `start_document`.
    Idle,
    /// Between `start_document` and `end_document`.
    InDocument,
    /// A previous event failed; no further events are accepted.
    Failed,
}

impl SessionState {
    /// State name used in error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InDocument => "in a document",
            Self::Failed => "failed",
        }
    }
}

/// One open element.
#[derive(Debug)]
struct Frame {
    rules: Vec<usize>,
    namespace: String,
    local_name: String,
    text: String,
}

/// Per-parse state over a shared, read-only [`RuleRegistry`].
///
/// Sessions are cheap to create and hold `Rc`-based values, so each parse (and each thread) uses
/// its own. A session that finished a document cleanly can be reused for the next one.
///
/// # Example
///
/// ```
/// use xbind::prelude::*;
///
/// let binder = Binder::builder()
///     .rule("*/n", FnAction::new().on_begin(|ctx, _, _| {
///         ctx.push(Value::Int(ctx.depth() as i64));
///         Ok(())
///     }))?
///     .build();
///
/// let mut session = binder.session();
/// session.start_document()?;
/// session.start_element("", "n", &Attributes::new())?;
/// session.start_element("", "n", &Attributes::new())?;
/// session.end_element("", "n")?;
/// session.end_element("", "n")?;
/// session.end_document()?;
///
/// assert_eq!(session.context().depth(), 2);
/// assert_eq!(session.root(), Some(Value::Int(0)));
/// # Ok::<(), xbind::BindError>(())
/// ```
#[derive(Debug)]
pub struct Session<'r> {
    rules: &'r RuleRegistry,
    state: SessionState,
    frames: Vec<Frame>,
    ctx: Context,
    trace: Option<Vec<TraceStep>>,
}

impl<'r> Session<'r> {
    /// Create a session over `rules`.
    #[must_use]
    pub fn new(rules: &'r RuleRegistry, converter: Arc<dyn Converter>) -> Self {
        Self {
            rules,
            state: SessionState::Idle,
            frames: Vec::new(),
            ctx: Context::new(converter),
            trace: None,
        }
    }

    /// Record every fired hook; see [`Session::trace`].
    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The action context (stacks, match path).
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Number of currently open elements.
    #[must_use]
    pub fn open_elements(&self) -> usize {
        self.frames.len()
    }

    /// Hooks fired so far, if tracing is on. Empty otherwise.
    #[must_use]
    pub fn trace(&self) -> &[TraceStep] {
        self.trace.as_deref().unwrap_or_default()
    }

    /// The first value pushed onto the default stack, with pending constructions resolved.
    #[must_use]
    pub fn root(&self) -> Option<Value> {
        self.ctx.root().map(Value::resolve)
    }

    /// Consume the session, returning [`Session::root`].
    #[must_use]
    pub fn into_root(self) -> Option<Value> {
        self.root()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════════════

    /// Begin a document. Fires `on_parse_start` on every registered action.
    ///
    /// # Errors
    ///
    /// [`BindError::UnexpectedEvent`] if a document is already open, [`BindError::Aborted`] after
    /// a failure, or an action failure.
    pub fn start_document(&mut self) -> Result<(), BindError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Failed => return Err(BindError::Aborted),
            SessionState::InDocument => {
                return Err(BindError::UnexpectedEvent {
                    event: "start_document",
                    state: self.state.as_str(),
                })
            }
        }

        self.ctx.reset();
        self.frames.clear();
        if let Some(trace) = &mut self.trace {
            trace.clear();
        }
        self.state = SessionState::InDocument;
        log::debug!("document started with {} rules", self.rules.len());

        let result = self.for_every_rule(Hook::ParseStart, |action, ctx| action.on_parse_start(ctx));
        self.settle(result)
    }

    /// An element opened.
    ///
    /// # Errors
    ///
    /// [`BindError::Action`] wrapping the first failing `begin`, or a state error.
    pub fn start_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        attributes: &Attributes,
    ) -> Result<(), BindError> {
        self.expect_document("start_element")?;
        let result = self.open(namespace, local_name, attributes);
        self.settle(result)
    }

    /// Character data arrived. Text outside every element is ignored.
    ///
    /// # Errors
    ///
    /// [`BindError::Action`] wrapping the first failing `body_text`, or a state error.
    pub fn characters(&mut self, text: &str) -> Result<(), BindError> {
        self.expect_document("characters")?;
        let result = self.text(text);
        self.settle(result)
    }

    /// An element closed.
    ///
    /// # Errors
    ///
    /// [`BindError::UnbalancedDocument`] if nothing is open or the name does not match the open
    /// element, [`BindError::Action`] wrapping the first failing `body` or `end`, or a state
    /// error.
    pub fn end_element(&mut self, namespace: &str, local_name: &str) -> Result<(), BindError> {
        self.expect_document("end_element")?;
        let result = self.close(namespace, local_name);
        self.settle(result)
    }

    /// End the document. Fires `on_parse_end` on every registered action.
    ///
    /// # Errors
    ///
    /// [`BindError::UnbalancedDocument`] if elements are still open, an action failure, or a state
    /// error.
    pub fn end_document(&mut self) -> Result<(), BindError> {
        self.expect_document("end_document")?;
        let result = self.finish();
        self.settle(result)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // XML input
    // ═══════════════════════════════════════════════════════════════════════════

    /// Parse a complete document from a string.
    ///
    /// # Errors
    ///
    /// [`BindError::Xml`] for malformed input, or any event error.
    pub fn feed_str(&mut self, xml: &str) -> Result<(), BindError> {
        self.feed_reader(xml.as_bytes())
    }

    /// Parse a complete document from a buffered reader.
    ///
    /// # Errors
    ///
    /// [`BindError::Xml`] for malformed input or I/O failures, or any event error.
    pub fn feed_reader<R: BufRead>(&mut self, reader: R) -> Result<(), BindError> {
        let result = xml::drive(self, reader);
        if result.is_err() && self.state == SessionState::InDocument {
            self.state = SessionState::Failed;
        }
        result
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════════════

    fn open(
        &mut self,
        namespace: &str,
        local_name: &str,
        attributes: &Attributes,
    ) -> Result<(), BindError> {
        self.ctx.path_mut().push(namespace, local_name);
        let path = self.ctx.match_path().as_str().to_owned();
        let matched = self.rules.lookup_indices(&path, namespace);
        log::debug!("open {path}: {} rules matched", matched.len());

        self.frames.push(Frame {
            rules: matched.clone(),
            namespace: namespace.to_owned(),
            local_name: local_name.to_owned(),
            text: String::new(),
        });

        for order in matched {
            self.dispatch(Hook::Begin, order, |action, ctx| {
                action.begin(ctx, &path, attributes)
            })?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), BindError> {
        let Some(frame) = self.frames.last_mut() else {
            log::trace!("ignoring {} bytes of text outside any element", text.len());
            return Ok(());
        };
        frame.text.push_str(text);

        let count = frame.rules.len();
        for k in 0..count {
            let order = self.frames[self.frames.len() - 1].rules[k];
            self.dispatch(Hook::BodyText, order, |action, ctx| action.body_text(ctx, text))?;
        }
        Ok(())
    }

    fn close(&mut self, namespace: &str, local_name: &str) -> Result<(), BindError> {
        let frame = match self.frames.pop() {
            None => {
                return Err(BindError::UnbalancedDocument {
                    detail: format!("</{local_name}> closes an element that was never opened"),
                })
            }
            Some(open) if open.local_name != local_name || open.namespace != namespace => {
                let detail = format!("expected </{}>, found </{local_name}>", open.local_name);
                self.frames.push(open);
                return Err(BindError::UnbalancedDocument { detail });
            }
            Some(open) => open,
        };

        let path = self.ctx.match_path().as_str().to_owned();
        log::debug!("close {path}: {} rules", frame.rules.len());

        for &order in &frame.rules {
            self.dispatch(Hook::Body, order, |action, ctx| {
                action.body(ctx, &path, &frame.text)
            })?;
        }
        for &order in frame.rules.iter().rev() {
            self.dispatch(Hook::End, order, |action, ctx| action.end(ctx, &path))?;
        }

        self.ctx.path_mut().pop();
        Ok(())
    }

    fn finish(&mut self) -> Result<(), BindError> {
        if !self.frames.is_empty() {
            return Err(BindError::UnbalancedDocument {
                detail: format!(
                    "document ended with {} open elements at \"{}\"",
                    self.frames.len(),
                    self.ctx.match_path()
                ),
            });
        }
        self.for_every_rule(Hook::ParseEnd, |action, ctx| action.on_parse_end(ctx))?;
        self.state = SessionState::Idle;
        log::debug!("document ended");
        Ok(())
    }

    fn for_every_rule(
        &mut self,
        hook: Hook,
        f: impl Fn(&dyn Action, &mut Context) -> Result<(), BindError>,
    ) -> Result<(), BindError> {
        for order in 0..self.rules.len() {
            self.dispatch(hook, order, &f)?;
        }
        Ok(())
    }

    /// Fire one hook of one rule, recording it and wrapping failures with the dispatch context.
    fn dispatch(
        &mut self,
        hook: Hook,
        order: usize,
        f: impl FnOnce(&dyn Action, &mut Context) -> Result<(), BindError>,
    ) -> Result<(), BindError> {
        let rules = self.rules;
        let Some(rule) = rules.get(order) else {
            return Ok(());
        };

        if let Some(trace) = &mut self.trace {
            trace.push(TraceStep {
                hook,
                path: self.ctx.match_path().as_str().to_owned(),
                pattern: rule.pattern().as_str().to_owned(),
            });
        }

        f(rule.action(), &mut self.ctx).map_err(|source| BindError::Action {
            hook: hook.as_str(),
            path: self.ctx.match_path().as_str().to_owned(),
            depth: self.ctx.depth(),
            pattern: rule.pattern().as_str().to_owned(),
            source: Box::new(source),
        })
    }

    fn expect_document(&self, event: &'static str) -> Result<(), BindError> {
        match self.state {
            SessionState::InDocument => Ok(()),
            SessionState::Failed => Err(BindError::Aborted),
            SessionState::Idle => Err(BindError::UnexpectedEvent {
                event,
                state: self.state.as_str(),
            }),
        }
    }

    fn settle(&mut self, result: Result<(), BindError>) -> Result<(), BindError> {
        if let Err(err) = &result {
            log::debug!("parse failed: {err}");
            self.state = SessionState::Failed;
        }
        result
    }
}
