//! `Attributes` — Ordered element attributes with qualified and namespace-aware lookup

/// A single attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written (`prefix:local` or `local`).
    pub qname: String,
    /// Resolved namespace URI, empty when unqualified.
    pub namespace: String,
    /// Local part of the name.
    pub local_name: String,
    /// Unescaped value.
    pub value: String,
}

impl Attribute {
    /// Create an attribute without a namespace. The local name is derived from `qname`.
    pub fn new(qname: impl Into<String>, value: impl Into<String>) -> Self {
        let qname = qname.into();
        let local_name = qname
            .split_once(':')
            .map_or(qname.as_str(), |(_, local)| local)
            .to_owned();
        Self {
            qname,
            namespace: String::new(),
            local_name,
            value: value.into(),
        }
    }

    /// Create a namespaced attribute.
    pub fn namespaced(
        qname: impl Into<String>,
        namespace: impl Into<String>,
        local_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            qname: qname.into(),
            namespace: namespace.into(),
            local_name: local_name.into(),
            value: value.into(),
        }
    }
}

/// Ordered attribute list of one element.
///
/// # Example
///
/// ```
/// use xbind::Attributes;
///
/// let attrs = Attributes::new().with("id", "7").with("name", "widget");
/// assert_eq!(attrs.get("name"), Some("widget"));
/// assert_eq!(attrs.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unqualified attribute (builder pattern).
    #[must_use]
    pub fn with(mut self, qname: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.push(Attribute::new(qname, value));
        self
    }

    /// Append an attribute.
    pub fn push(&mut self, attribute: Attribute) {
        self.items.push(attribute);
    }

    /// Value by qualified name.
    #[must_use]
    pub fn get(&self, qname: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| a.qname == qname)
            .map(|a| a.value.as_str())
    }

    /// Value by namespace URI and local name.
    #[must_use]
    pub fn get_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| a.namespace == namespace && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// Iterate in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_and_namespaced_lookup() {
        let mut attrs = Attributes::new().with("id", "1");
        attrs.push(Attribute::namespaced("x:lang", "urn:x", "lang", "en"));

        assert_eq!(attrs.get("id"), Some("1"));
        assert_eq!(attrs.get("x:lang"), Some("en"));
        assert_eq!(attrs.get("lang"), None);
        assert_eq!(attrs.get_ns("urn:x", "lang"), Some("en"));
        assert_eq!(attrs.get_ns("", "id"), Some("1"));
        assert_eq!(attrs.get_ns("urn:y", "lang"), None);
    }

    #[test]
    fn local_name_derived_from_qname() {
        let attr = Attribute::new("p:name", "v");
        assert_eq!(attr.local_name, "name");
        assert_eq!(Attribute::new("plain", "v").local_name, "plain");
    }

    #[test]
    fn preserves_document_order() {
        let attrs = Attributes::new().with("b", "2").with("a", "1");
        let names: Vec<&str> = attrs.iter().map(|a| a.qname.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
