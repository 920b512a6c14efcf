use super::{text_value, CallHandle};
use crate::{Action, Attributes, BindError, Context, DeferredInvocation, Value};

/// Where a [`CallParamAction`] takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSource {
    /// An attribute of the matched element, by qualified name. Absent attributes supply nothing.
    Attribute(String),
    /// The element's body text, delivered when the body is complete.
    BodyText,
    /// The default stack at this offset (0 = top) when the element opens.
    Stack(usize),
    /// A fixed string.
    Literal(String),
    /// The match path when the element opens.
    MatchPath,
}

/// Supplies one parameter to the innermost call or construction staged on a [`CallHandle`].
///
/// Works with both [`CallMethodAction`](super::CallMethodAction) and
/// [`ConstructAction`](super::ConstructAction). Register it after the action that owns the handle,
/// so the call is staged by the time the parameter arrives.
#[derive(Debug, Clone)]
pub struct CallParamAction {
    handle: CallHandle,
    index: usize,
    source: ParamSource,
    trim: bool,
}

impl CallParamAction {
    /// Supply parameter `index` from `source`.
    #[must_use]
    pub fn new(handle: CallHandle, index: usize, source: ParamSource) -> Self {
        Self {
            handle,
            index,
            source,
            trim: true,
        }
    }

    /// From the attribute `name`.
    #[must_use]
    pub fn attribute(handle: CallHandle, index: usize, name: &str) -> Self {
        Self::new(handle, index, ParamSource::Attribute(name.to_owned()))
    }

    /// From the element's body text.
    #[must_use]
    pub fn body_text(handle: CallHandle, index: usize) -> Self {
        Self::new(handle, index, ParamSource::BodyText)
    }

    /// From the default stack, `offset` below the top.
    #[must_use]
    pub fn stack(handle: CallHandle, index: usize, offset: usize) -> Self {
        Self::new(handle, index, ParamSource::Stack(offset))
    }

    /// A fixed value.
    #[must_use]
    pub fn literal(handle: CallHandle, index: usize, value: &str) -> Self {
        Self::new(handle, index, ParamSource::Literal(value.to_owned()))
    }

    /// The current match path.
    #[must_use]
    pub fn match_path(handle: CallHandle, index: usize) -> Self {
        Self::new(handle, index, ParamSource::MatchPath)
    }

    /// Whether body text is trimmed (default `true`).
    #[must_use]
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    fn deliver(&self, ctx: &mut Context, path: &str, value: Value) -> Result<(), BindError> {
        let staged = ctx.peek_named(self.handle.stack_name(), 0)?.clone();
        log::debug!("[CallParam] {path}: param {} = {value:?}", self.index);
        match &staged {
            Value::Pending(pending) => pending.set_arg(self.index, value),
            Value::Object(obj) => {
                obj.with_mut(|call: &mut DeferredInvocation| call.set_param(self.index, value))?
            }
            other => Err(BindError::TypeMismatch {
                expected: "DeferredInvocation",
                found: other.type_name(),
            }),
        }
    }
}

impl Action for CallParamAction {
    fn begin(
        &self,
        ctx: &mut Context,
        path: &str,
        attributes: &Attributes,
    ) -> Result<(), BindError> {
        let value = match &self.source {
            ParamSource::BodyText => return Ok(()),
            ParamSource::Attribute(name) => match attributes.get(name) {
                Some(value) => Value::from(value),
                None => {
                    log::debug!("[CallParam] {path}: no attribute \"{name}\"; nothing supplied");
                    return Ok(());
                }
            },
            ParamSource::Stack(offset) => ctx.peek(*offset)?.clone(),
            ParamSource::Literal(value) => Value::from(value.as_str()),
            ParamSource::MatchPath => Value::from(path),
        };
        self.deliver(ctx, path, value)
    }

    fn body(&self, ctx: &mut Context, path: &str, text: &str) -> Result<(), BindError> {
        if self.source != ParamSource::BodyText {
            return Ok(());
        }
        self.deliver(ctx, path, text_value(text, self.trim))
    }
}
