//! xbind-test: Dynamic record domain for conformance testing
//!
//! Fixtures describe bindings in configuration, so they need a domain whose capabilities exist
//! under fixed names. [`Record`] is that domain: a tagged bag of ordered string fields, optional
//! body text and child values. [`register`] installs its factory, methods, property setter and
//! constructors into a [`Catalog`].
//!
//! # Example
//!
//! ```
//! use xbind_test::prelude::*;
//!
//! let catalog = xbind_test::register(Catalog::new());
//! let add_child = catalog.get_method("Record.add_child")?.clone();
//!
//! let binder = Binder::builder()
//!     .rule("*/item", ObjectCreateAction::from_factory(catalog.get_factory("record")?.clone()))?
//!     .rule("*/item/item", SetNextAction::new(add_child))?
//!     .build();
//!
//! let root = binder.parse_str("<item><item/><item/></item>")?.unwrap();
//! let children = root.as_object().unwrap().with(|r: &Record| r.children().len())?;
//! assert_eq!(children, 2);
//! # Ok::<(), xbind::BindError>(())
//! ```

use xbind::prelude::*;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// A generic domain object.
///
/// `kind` is the element name it was created for (or the name a constructor was given). Field
/// order is first-assignment order; assigning an existing field replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct Record {
    kind: String,
    fields: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Get a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Assign a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Fields in assignment order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[Value] {
        &self.children
    }

    pub fn add_child(&mut self, child: Value) {
        self.children.push(child);
    }
}

/// Property setter accepting any property name on a [`Record`].
///
/// `None` values are skipped so an absent source leaves the field unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFields;

impl PropertySetter for RecordFields {
    fn set_property(
        &self,
        target: &Value,
        name: &str,
        value: Value,
        _: &dyn Converter,
    ) -> Result<bool, BindError> {
        let object = target.as_object().ok_or(BindError::TypeMismatch {
            expected: "Record",
            found: target.type_name(),
        })?;
        if let Some(text) = value.to_text() {
            object.with_mut(|r: &mut Record| r.set(name, text))?;
        }
        Ok(true)
    }
}

fn text_or_default(value: Option<&Value>) -> String {
    value.and_then(Value::to_text).unwrap_or_default()
}

/// Register the record domain with `catalog`.
///
/// - factory `record`: a [`Record`] whose kind is the element's local name
/// - property setter `record`: [`RecordFields`]
/// - method `Record.set(name, value)`
/// - method `Record.set_text(text)`
/// - method `Record.add_child(child)`
/// - method `Record.adopt(parent)`: records the parent's kind in field `parent`
/// - constructor `Record(kind)`
/// - constructor `Record.sized(kind, size: int)`: missing size renders as `none`
#[must_use]
pub fn register(catalog: Catalog) -> Catalog {
    catalog
        .factory(Factory::from_element("record", |path, _| {
            let kind = path.rsplit('/').next().unwrap_or(path);
            Ok(Value::object(Record::new(kind)))
        }))
        .properties("record", RecordFields)
        .method(
            Method::on::<Record, _>("Record.set", |r, args| {
                let name = text_or_default(args.first());
                if name.is_empty() {
                    return Err("field name is empty".into());
                }
                r.set(name, text_or_default(args.get(1)));
                Ok(())
            })
            .with_param_types([ParamType::String, ParamType::String]),
        )
        .method(
            Method::on::<Record, _>("Record.set_text", |r, args| {
                r.set_text(text_or_default(args.first()));
                Ok(())
            })
            .with_param_types([ParamType::String]),
        )
        .method(Method::on::<Record, _>("Record.add_child", |r, args| {
            r.add_child(args.first().cloned().unwrap_or_default());
            Ok(())
        }))
        .method(
            Method::on::<Record, _>("Record.adopt", |r, args| {
                let parent = args.first().and_then(Value::as_object).ok_or("no parent")?;
                let kind = parent
                    .with(|p: &Record| p.kind.clone())
                    .map_err(|e| e.to_string())?;
                r.set("parent", kind);
                Ok(())
            })
            .with_param_types([ParamType::Object]),
        )
        .constructor(Constructor::new("Record", [ParamType::String], |args| {
            Ok(Record::new(text_or_default(args.first())))
        }))
        .constructor(Constructor::new(
            "Record.sized",
            [ParamType::String, ParamType::Int],
            |args| {
                let mut record = Record::new(text_or_default(args.first()));
                let size = args
                    .get(1)
                    .and_then(Value::as_int)
                    .map_or_else(|| "none".to_owned(), |n| n.to_string());
                record.set("size", size);
                Ok(record)
            },
        ))
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON rendering (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

/// Render a bound value as JSON.
///
/// Records become `{ "type", "fields"?, "text"?, "children"? }` with empty parts omitted.
/// Scalars become strings, `None` and unbuilt constructions become `null`, and other objects
/// render as their type name.
#[cfg(feature = "registry")]
#[must_use]
pub fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::{json, Map, Value as Json};

    if let Some(object) = value.as_object() {
        return object
            .with(|r: &Record| {
                let mut out = Map::new();
                out.insert("type".into(), json!(r.kind));
                if !r.fields.is_empty() {
                    let fields: Map<String, Json> = r
                        .fields
                        .iter()
                        .map(|(n, v)| (n.clone(), json!(v)))
                        .collect();
                    out.insert("fields".into(), Json::Object(fields));
                }
                if let Some(text) = &r.text {
                    out.insert("text".into(), json!(text));
                }
                if !r.children.is_empty() {
                    let children = r.children.iter().map(to_json).collect();
                    out.insert("children".into(), Json::Array(children));
                }
                Json::Object(out)
            })
            .unwrap_or_else(|_| json!(object.type_name()));
    }
    value.to_text().map_or(Json::Null, Json::String)
}

/// The registry with core actions, ready to load record rules.
#[cfg(feature = "registry")]
#[must_use]
pub fn registry() -> xbind::ActionRegistry {
    xbind::register_core_actions(xbind::ActionRegistryBuilder::new()).build()
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Record, RecordFields};
    pub use xbind::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        register(Catalog::new())
    }

    fn record(value: &Value) -> Record {
        value
            .as_object()
            .unwrap()
            .with(|r: &Record| r.clone())
            .unwrap()
    }

    #[test]
    fn fields_keep_first_assignment_order() {
        let mut r = Record::new("x");
        r.set("b", "1");
        r.set("a", "2");
        r.set("b", "3");
        assert_eq!(r.get("b"), Some("3"));
        assert_eq!(r.get("c"), None);
        let names: Vec<&str> = r.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn factory_names_record_after_element() {
        let created = catalog()
            .get_factory("record")
            .unwrap()
            .create("library/book", &Attributes::new())
            .unwrap();
        assert_eq!(record(&created).kind(), "book");
    }

    #[test]
    fn record_fields_accept_any_name() {
        let target = Value::object(Record::new("x"));
        let setter = catalog().get_properties("record").unwrap();
        assert!(setter
            .set_property(&target, "color", "red".into(), &StandardConverter)
            .unwrap());
        assert!(setter
            .set_property(&target, "size", Value::None, &StandardConverter)
            .unwrap());
        let r = record(&target);
        assert_eq!(r.get("color"), Some("red"));
        assert_eq!(r.get("size"), None);
    }

    #[test]
    fn record_fields_reject_scalars() {
        let setter = RecordFields;
        let err = setter
            .set_property(&Value::from("x"), "a", "b".into(), &StandardConverter)
            .unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn methods_by_name() {
        let catalog = catalog();
        let parent = Value::object(Record::new("shelf"));
        let child = Value::object(Record::new("book"));

        catalog
            .get_method("Record.set")
            .unwrap()
            .invoke(&child, vec!["title".into(), "Dune".into()], &StandardConverter)
            .unwrap();
        catalog
            .get_method("Record.adopt")
            .unwrap()
            .invoke(&child, vec![parent.clone()], &StandardConverter)
            .unwrap();
        catalog
            .get_method("Record.add_child")
            .unwrap()
            .invoke(&parent, vec![child.clone()], &StandardConverter)
            .unwrap();

        let book = record(&child);
        assert_eq!(book.get("title"), Some("Dune"));
        assert_eq!(book.get("parent"), Some("shelf"));
        assert_eq!(record(&parent).children().len(), 1);
    }

    #[test]
    fn empty_field_name_is_an_invocation_error() {
        let err = catalog()
            .get_method("Record.set")
            .unwrap()
            .invoke(
                &Value::object(Record::new("x")),
                vec![Value::None, "v".into()],
                &StandardConverter,
            )
            .unwrap_err();
        assert!(matches!(err, BindError::Invocation { .. }));
    }

    #[test]
    fn sized_constructor_converts_size() {
        let catalog = catalog();
        let sized = catalog.get_constructor("Record.sized").unwrap();
        let built = sized
            .build(vec!["box".into(), " 12 ".into()], &StandardConverter)
            .unwrap();
        assert_eq!(record(&built).get("size"), Some("12"));

        let built = sized
            .build(vec!["box".into(), Value::None], &StandardConverter)
            .unwrap();
        assert_eq!(record(&built).get("size"), Some("none"));
    }

    #[cfg(feature = "registry")]
    #[test]
    fn renders_nested_records() {
        let mut parent = Record::new("shelf");
        let mut child = Record::new("book");
        child.set("title", "Dune");
        child.set_text("sand");
        parent.add_child(Value::object(child));
        parent.add_child(Value::Int(3));
        parent.add_child(Value::None);

        assert_eq!(
            to_json(&Value::object(parent)),
            serde_json::json!({
                "type": "shelf",
                "children": [
                    { "type": "book", "fields": { "title": "Dune" }, "text": "sand" },
                    "3",
                    null
                ]
            })
        );
    }
}
