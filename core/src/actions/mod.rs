//! Built-in actions
//!
//! | Action | Hook | Effect |
//! |--------|------|--------|
//! | [`ObjectCreateAction`] | begin / end | push a new object / pop it |
//! | [`SetPropertiesAction`] | begin | attributes → properties of the top object |
//! | [`SetPropertyAction`] | begin | one property named by an attribute |
//! | [`BeanPropertySetterAction`] | body | element text → property of the top object |
//! | [`SetNextAction`] / [`SetTopAction`] / [`SetRootAction`] | end | link the top object to its parent or the root |
//! | [`CallMethodAction`] | begin / body / end | stage a [`DeferredInvocation`](crate::DeferredInvocation) |
//! | [`CallParamAction`] | begin / body | supply one parameter to a staged call or construction |
//! | [`ConstructAction`] | begin / end | two-phase construction via [`PendingRef`](crate::PendingRef) |
//! | [`FnAction`] | any | closures |
//!
//! Actions that cooperate (a call and its parameters) share a [`CallHandle`]: the call pushes its
//! staged invocation onto the handle's named stack, parameter actions fill the innermost one.

mod bean_property;
mod call_method;
mod call_param;
mod construct;
mod fn_action;
mod object_create;
mod set_next;
mod set_properties;
mod set_property;

pub use bean_property::BeanPropertySetterAction;
pub use call_method::{CallHandle, CallMethodAction};
pub use call_param::{CallParamAction, ParamSource};
pub use construct::ConstructAction;
pub use fn_action::FnAction;
pub use object_create::ObjectCreateAction;
pub use set_next::{SetNextAction, SetRootAction, SetTopAction};
pub use set_properties::SetPropertiesAction;
pub use set_property::SetPropertyAction;

use crate::Value;

/// Body text as a parameter value, optionally trimmed.
fn text_value(text: &str, trim: bool) -> Value {
    if trim {
        Value::from(text.trim())
    } else {
        Value::from(text)
    }
}
