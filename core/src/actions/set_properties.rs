use crate::{Action, Attributes, BindError, Context, PropertySetter, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Copies the element's attributes onto properties of the top object.
///
/// Attributes are matched by local name. Aliases rename an attribute to a differently named
/// property; ignored attributes are skipped. Attributes without a matching property are logged
/// and skipped unless [`ignore_missing(false)`](Self::ignore_missing) makes them an error.
#[derive(Debug, Clone)]
pub struct SetPropertiesAction {
    setter: Arc<dyn PropertySetter>,
    aliases: HashMap<String, String>,
    ignored: HashSet<String>,
    ignore_missing: bool,
}

impl SetPropertiesAction {
    /// Set properties through `setter`.
    pub fn new(setter: impl PropertySetter + 'static) -> Self {
        Self::from_shared(Arc::new(setter))
    }

    /// Set properties through a shared setter.
    #[must_use]
    pub fn from_shared(setter: Arc<dyn PropertySetter>) -> Self {
        Self {
            setter,
            aliases: HashMap::new(),
            ignored: HashSet::new(),
            ignore_missing: true,
        }
    }

    /// Map `attribute` onto `property`.
    #[must_use]
    pub fn alias(mut self, attribute: &str, property: &str) -> Self {
        self.aliases.insert(attribute.to_owned(), property.to_owned());
        self
    }

    /// Never copy `attribute`.
    #[must_use]
    pub fn ignore(mut self, attribute: &str) -> Self {
        self.ignored.insert(attribute.to_owned());
        self
    }

    /// Whether attributes without a matching property are skipped (default) or fail the parse.
    #[must_use]
    pub fn ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }
}

impl Action for SetPropertiesAction {
    fn begin(
        &self,
        ctx: &mut Context,
        path: &str,
        attributes: &Attributes,
    ) -> Result<(), BindError> {
        let target = ctx.peek(0)?.clone();

        for attribute in attributes {
            let name = attribute.local_name.as_str();
            if self.ignored.contains(name) {
                continue;
            }
            let property = self.aliases.get(name).map_or(name, String::as_str);
            let value = Value::from(attribute.value.as_str());

            if self
                .setter
                .set_property(&target, property, value, ctx.converter())?
            {
                log::debug!("[SetProperties] {path}: {property} = {:?}", attribute.value);
            } else if self.ignore_missing {
                log::debug!("[SetProperties] {path}: no property \"{property}\"; skipped");
            } else {
                return Err(BindError::Invocation {
                    method: format!("{}.{property}", target.type_name()),
                    message: format!("no such property (from attribute \"{name}\")"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ObjectCreateAction;
    use crate::{Binder, ParamType, Properties};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Server {
        host: String,
        port: i64,
        secure: bool,
    }

    fn server_properties() -> Properties {
        Properties::new()
            .property::<Server, _>("host", ParamType::String, |s, v| {
                s.host = v.to_text().unwrap_or_default();
                Ok(())
            })
            .property::<Server, _>("port", ParamType::Int, |s, v| {
                s.port = v.as_int().unwrap_or_default();
                Ok(())
            })
            .property::<Server, _>("secure", ParamType::Bool, |s, v| {
                s.secure = v.as_bool().unwrap_or_default();
                Ok(())
            })
    }

    fn bind(action: SetPropertiesAction, xml: &str) -> Result<Server, BindError> {
        let binder = Binder::builder()
            .rule("server", ObjectCreateAction::new("server", Server::default))?
            .rule("server", action)?
            .build();
        let root = binder.parse_str(xml)?.ok_or(BindError::Aborted)?;
        root.as_object()
            .ok_or(BindError::Aborted)?
            .with(|s: &Server| s.clone())
    }

    #[test]
    fn attributes_become_typed_properties() {
        let server = bind(
            SetPropertiesAction::new(server_properties()),
            r#"<server host="example.org" port="8443" secure="yes" extra="x"/>"#,
        )
        .unwrap();
        assert_eq!(
            server,
            Server {
                host: "example.org".into(),
                port: 8443,
                secure: true
            }
        );
    }

    #[test]
    fn aliases_and_ignored_attributes() {
        let action = SetPropertiesAction::new(server_properties())
            .alias("address", "host")
            .ignore("port");
        let server = bind(action, r#"<server address="h" port="1"/>"#).unwrap();
        assert_eq!(server.host, "h");
        assert_eq!(server.port, 0);
    }

    #[test]
    fn missing_property_can_be_fatal() {
        let action = SetPropertiesAction::new(server_properties()).ignore_missing(false);
        let err = bind(action, r#"<server extra="x"/>"#).unwrap_err();
        assert!(matches!(err.root_cause(), BindError::Invocation { .. }));
    }

    #[test]
    fn bad_value_is_a_conversion_error() {
        let err = bind(
            SetPropertiesAction::new(server_properties()),
            r#"<server port="eighty"/>"#,
        )
        .unwrap_err();
        assert!(matches!(err.root_cause(), BindError::Conversion { .. }));
    }
}
