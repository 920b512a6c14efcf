use crate::{Action, Attributes, BindError, Catalog, Context, Factory};
use std::any::Any;
use std::sync::Arc;

/// Pushes a new object when the element opens and pops it when the element closes.
///
/// With [`with_override`](Self::with_override), an attribute of the element may name a different
/// factory from a [`Catalog`]; an absent attribute falls back to the default factory.
#[derive(Debug, Clone)]
pub struct ObjectCreateAction {
    factory: Factory,
    override_from: Option<(String, Arc<Catalog>)>,
}

impl ObjectCreateAction {
    /// Create objects of type `T` with `f`.
    pub fn new<T, F>(name: &str, f: F) -> Self
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_factory(Factory::new(name, f))
    }

    /// Create objects with an existing factory.
    #[must_use]
    pub fn from_factory(factory: Factory) -> Self {
        Self {
            factory,
            override_from: None,
        }
    }

    /// Let `attribute` name the factory to use instead, looked up in `catalog`.
    #[must_use]
    pub fn with_override(mut self, attribute: &str, catalog: Arc<Catalog>) -> Self {
        self.override_from = Some((attribute.to_owned(), catalog));
        self
    }

    fn select<'a>(&'a self, attributes: &Attributes) -> Result<&'a Factory, BindError> {
        let Some((attribute, catalog)) = &self.override_from else {
            return Ok(&self.factory);
        };
        match attributes.get(attribute) {
            Some(name) => catalog.get_factory(name),
            None => Ok(&self.factory),
        }
    }
}

impl Action for ObjectCreateAction {
    fn begin(
        &self,
        ctx: &mut Context,
        path: &str,
        attributes: &Attributes,
    ) -> Result<(), BindError> {
        let factory = self.select(attributes)?;
        let value = factory.create(path, attributes)?;
        log::debug!("[ObjectCreate] {path}: push {}", value.type_name());
        ctx.push(value);
        Ok(())
    }

    fn end(&self, ctx: &mut Context, path: &str) -> Result<(), BindError> {
        let value = ctx.pop()?;
        log::debug!("[ObjectCreate] {path}: pop {}", value.type_name());
        Ok(())
    }
}
