use super::text_value;
use crate::{Action, BindError, Context, PropertySetter};
use std::sync::Arc;

/// Sets a property of the top object from the element's body text.
///
/// The property is named after the element unless [`property`](Self::property) names it
/// explicitly: `<host>example.org</host>` sets `host`.
#[derive(Debug, Clone)]
pub struct BeanPropertySetterAction {
    setter: Arc<dyn PropertySetter>,
    property: Option<String>,
    trim: bool,
}

impl BeanPropertySetterAction {
    /// Set properties through `setter`, named after the element.
    pub fn new(setter: impl PropertySetter + 'static) -> Self {
        Self::from_shared(Arc::new(setter))
    }

    /// Set properties through a shared setter.
    #[must_use]
    pub fn from_shared(setter: Arc<dyn PropertySetter>) -> Self {
        Self {
            setter,
            property: None,
            trim: true,
        }
    }

    /// Always set `property`, whatever the element is called.
    #[must_use]
    pub fn property(mut self, property: &str) -> Self {
        self.property = Some(property.to_owned());
        self
    }

    /// Whether surrounding whitespace is removed from the text (default `true`).
    #[must_use]
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

impl Action for BeanPropertySetterAction {
    fn body(&self, ctx: &mut Context, path: &str, text: &str) -> Result<(), BindError> {
        let property = match &self.property {
            Some(p) => p.clone(),
            None => ctx.current_element().unwrap_or_default().to_owned(),
        };
        let target = ctx.peek(0)?.clone();
        let value = text_value(text, self.trim);

        log::debug!("[BeanPropertySetter] {path}: {property} = {value:?}");
        if self
            .setter
            .set_property(&target, &property, value, ctx.converter())?
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ObjectCreateAction;
    use crate::{Binder, ParamType, Properties, Value};

    #[derive(Debug, Default)]
    struct Endpoint {
        host: String,
        label: String,
    }

    fn props() -> Properties {
        Properties::new()
            .property::<Endpoint, _>("host", ParamType::String, |e, v| {
                e.host = v.to_text().unwrap_or_default();
                Ok(())
            })
            .property::<Endpoint, _>("label", ParamType::String, |e, v| {
                e.label = v.to_text().unwrap_or_default();
                Ok(())
            })
    }

    fn endpoint(root: &Value) -> (String, String) {
        root.as_object()
            .unwrap()
            .with(|e: &Endpoint| (e.host.clone(), e.label.clone()))
            .unwrap()
    }

    #[test]
    fn element_name_is_the_property() {
        let binder = Binder::builder()
            .rule("endpoint", ObjectCreateAction::new("endpoint", Endpoint::default))
            .unwrap()
            .rule("endpoint/host", BeanPropertySetterAction::new(props()))
            .unwrap()
            .rule(
                "endpoint/name",
                BeanPropertySetterAction::new(props())
                    .property("label")
                    .trim(false),
            )
            .unwrap()
            .build();

        let root = binder
            .parse_str("<endpoint><host>\n  example.org\n</host><name> a b </name></endpoint>")
            .unwrap()
            .unwrap();
        assert_eq!(
            endpoint(&root),
            ("example.org".to_owned(), " a b ".to_owned())
        );
    }

    #[test]
    fn unknown_property_fails() {
        let binder = Binder::builder()
            .rule("endpoint", ObjectCreateAction::new("endpoint", Endpoint::default))
            .unwrap()
            .rule("endpoint/port", BeanPropertySetterAction::new(props()))
            .unwrap()
            .build();
        let err = binder
            .parse_str("<endpoint><port>80</port></endpoint>")
            .unwrap_err();
        assert!(matches!(err.root_cause(), BindError::Invocation { .. }));
    }
}
