use crate::{Action, Attributes, BindError, Context, PropertySetter, Value};
use std::sync::Arc;

/// Sets one property of the top object: one attribute names the property, another holds the value.
///
/// `<param name="timeout" value="30"/>` sets `timeout` to `"30"` with the default attribute names.
#[derive(Debug, Clone)]
pub struct SetPropertyAction {
    setter: Arc<dyn PropertySetter>,
    name_attribute: String,
    value_attribute: String,
}

impl SetPropertyAction {
    /// Read the property name from `name` and the value from `value`.
    pub fn new(setter: impl PropertySetter + 'static) -> Self {
        Self::from_shared(Arc::new(setter), "name", "value")
    }

    /// Read the property name and value from the given attributes.
    #[must_use]
    pub fn from_shared(
        setter: Arc<dyn PropertySetter>,
        name_attribute: &str,
        value_attribute: &str,
    ) -> Self {
        Self {
            setter,
            name_attribute: name_attribute.to_owned(),
            value_attribute: value_attribute.to_owned(),
        }
    }
}

impl Action for SetPropertyAction {
    fn begin(
        &self,
        ctx: &mut Context,
        path: &str,
        attributes: &Attributes,
    ) -> Result<(), BindError> {
        let required = |attribute: &str| {
            attributes
                .get(attribute)
                .ok_or_else(|| BindError::MissingAttribute {
                    attribute: attribute.to_owned(),
                })
        };
        let property = required(&self.name_attribute)?;
        let value = required(&self.value_attribute)?;

        let target = ctx.peek(0)?.clone();
        log::debug!("[SetProperty] {path}: {property} = {value:?}");
        if self
            .setter
            .set_property(&target, property, Value::from(value), ctx.converter())?
        {
            Ok(())
        } else {
            Err(BindError::Invocation {
                method: format!("{}.{property}", target.type_name()),
                message: "no such property".to_owned(),
            })
        }
    }
}
