use crate::{Action, Attributes, BindError, Context};
use std::fmt;

type BeginFn = dyn Fn(&mut Context, &str, &Attributes) -> Result<(), BindError> + Send + Sync;
type TextFn = dyn Fn(&mut Context, &str) -> Result<(), BindError> + Send + Sync;
type BodyFn = dyn Fn(&mut Context, &str, &str) -> Result<(), BindError> + Send + Sync;
type ParseFn = dyn Fn(&mut Context) -> Result<(), BindError> + Send + Sync;

/// An action assembled from closures, one per hook. Unset hooks do nothing.
///
/// ```
/// use xbind::prelude::*;
///
/// let count_items = FnAction::new()
///     .on_parse_start(|ctx| {
///         ctx.push(Value::Int(0));
///         Ok(())
///     })
///     .on_end(|ctx, _| {
///         let n = ctx.pop()?.as_int().unwrap_or(0);
///         ctx.push(Value::Int(n + 1));
///         Ok(())
///     });
///
/// let binder = Binder::builder().rule("*/item", count_items)?.build();
/// let mut session = binder.session();
/// session.feed_str("<list><item/><item/></list>")?;
/// assert_eq!(session.context().peek(0)?, &Value::Int(2));
/// # Ok::<(), xbind::BindError>(())
/// ```
#[derive(Default)]
pub struct FnAction {
    begin: Option<Box<BeginFn>>,
    body_text: Option<Box<TextFn>>,
    body: Option<Box<BodyFn>>,
    end: Option<Box<TextFn>>,
    parse_start: Option<Box<ParseFn>>,
    parse_end: Option<Box<ParseFn>>,
}

impl FnAction {
    /// An action with no hooks set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on `begin(ctx, path, attributes)`.
    #[must_use]
    pub fn on_begin<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context, &str, &Attributes) -> Result<(), BindError> + Send + Sync + 'static,
    {
        self.begin = Some(Box::new(f));
        self
    }

    /// Run `f` on `body_text(ctx, text)`.
    #[must_use]
    pub fn on_body_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context, &str) -> Result<(), BindError> + Send + Sync + 'static,
    {
        self.body_text = Some(Box::new(f));
        self
    }

    /// Run `f` on `body(ctx, path, text)`.
    #[must_use]
    pub fn on_body<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context, &str, &str) -> Result<(), BindError> + Send + Sync + 'static,
    {
        self.body = Some(Box::new(f));
        self
    }

    /// Run `f` on `end(ctx, path)`.
    #[must_use]
    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context, &str) -> Result<(), BindError> + Send + Sync + 'static,
    {
        self.end = Some(Box::new(f));
        self
    }

    /// Run `f` at document start.
    #[must_use]
    pub fn on_parse_start<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context) -> Result<(), BindError> + Send + Sync + 'static,
    {
        self.parse_start = Some(Box::new(f));
        self
    }

    /// Run `f` at document end.
    #[must_use]
    pub fn on_parse_end<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context) -> Result<(), BindError> + Send + Sync + 'static,
    {
        self.parse_end = Some(Box::new(f));
        self
    }
}

impl Action for FnAction {
    fn begin(
        &self,
        ctx: &mut Context,
        path: &str,
        attributes: &Attributes,
    ) -> Result<(), BindError> {
        self.begin.as_ref().map_or(Ok(()), |f| f(ctx, path, attributes))
    }

    fn body_text(&self, ctx: &mut Context, text: &str) -> Result<(), BindError> {
        self.body_text.as_ref().map_or(Ok(()), |f| f(ctx, text))
    }

    fn body(&self, ctx: &mut Context, path: &str, text: &str) -> Result<(), BindError> {
        self.body.as_ref().map_or(Ok(()), |f| f(ctx, path, text))
    }

    fn end(&self, ctx: &mut Context, path: &str) -> Result<(), BindError> {
        self.end.as_ref().map_or(Ok(()), |f| f(ctx, path))
    }

    fn on_parse_start(&self, ctx: &mut Context) -> Result<(), BindError> {
        self.parse_start.as_ref().map_or(Ok(()), |f| f(ctx))
    }

    fn on_parse_end(&self, ctx: &mut Context) -> Result<(), BindError> {
        self.parse_end.as_ref().map_or(Ok(()), |f| f(ctx))
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction")
            .field("begin", &self.begin.is_some())
            .field("body_text", &self.body_text.is_some())
            .field("body", &self.body.is_some())
            .field("end", &self.end.is_some())
            .field("parse_start", &self.parse_start.is_some())
            .field("parse_end", &self.parse_end.is_some())
            .finish()
    }
}
