//! `Action` — The lifecycle callbacks bound to a pattern

use crate::{Attributes, BindError, Context};
use std::fmt::Debug;

/// Callbacks fired for elements whose path matches the action's pattern.
///
/// Every hook has a no-op default, so an action implements only what it needs. Actions are
/// shared, immutable configuration: anything that varies per parse belongs in the [`Context`]
/// (the object stack or a named stack), never in `self`.
///
/// For the actions matched by one element:
///
/// - `begin` fires in registration order when the element opens
/// - `body_text` fires for every chunk of character data directly inside the element
/// - `body` fires in registration order when the element closes, with all of its text
/// - `end` fires in *reverse* registration order after every `body`
///
/// `on_parse_start` and `on_parse_end` fire once per registered action at the document
/// boundaries, whether or not the action ever matched.
pub trait Action: Send + Sync + Debug {
    /// The element opened.
    ///
    /// # Errors
    ///
    /// Any failure aborts the parse.
    fn begin(
        &self,
        _ctx: &mut Context,
        _path: &str,
        _attributes: &Attributes,
    ) -> Result<(), BindError> {
        Ok(())
    }

    /// A chunk of character data arrived inside the element.
    ///
    /// # Errors
    ///
    /// Any failure aborts the parse.
    fn body_text(&self, _ctx: &mut Context, _text: &str) -> Result<(), BindError> {
        Ok(())
    }

    /// The element closed; `text` is all character data directly inside it.
    ///
    /// # Errors
    ///
    /// Any failure aborts the parse.
    fn body(&self, _ctx: &mut Context, _path: &str, _text: &str) -> Result<(), BindError> {
        Ok(())
    }

    /// The element closed, after every matched action's `body`.
    ///
    /// # Errors
    ///
    /// Any failure aborts the parse.
    fn end(&self, _ctx: &mut Context, _path: &str) -> Result<(), BindError> {
        Ok(())
    }

    /// The document started.
    ///
    /// # Errors
    ///
    /// Any failure aborts the parse.
    fn on_parse_start(&self, _ctx: &mut Context) -> Result<(), BindError> {
        Ok(())
    }

    /// The document ended.
    ///
    /// # Errors
    ///
    /// Any failure aborts the parse.
    fn on_parse_end(&self, _ctx: &mut Context) -> Result<(), BindError> {
        Ok(())
    }
}
