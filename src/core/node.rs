//! XML element tree
//!
//! The RDF codec reads a packet into a small element tree first and then
//! walks it. Each element keeps its qualified name as written plus the
//! namespace URI its prefix resolved to at parse time, so the walk can match
//! on URIs regardless of which prefixes a writer chose.

use crate::core::namespace::ns;

/// An attribute with its resolved namespace
#[derive(Debug, Clone, PartialEq)]
pub struct XmlAttribute {
    /// Prefix as written (empty when unprefixed)
    pub prefix: String,
    /// Local name
    pub local: String,
    /// Namespace URI, `None` for unprefixed attributes
    pub namespace: Option<String>,
    /// Unescaped value
    pub value: String,
}

impl XmlAttribute {
    /// Whether this attribute is in the given namespace with the given local name
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }
}

/// An element with its children and concatenated text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Prefix as written (empty when unprefixed)
    pub prefix: String,
    /// Local name
    pub local: String,
    /// Namespace URI, `None` when the prefix was not declared
    pub namespace: Option<String>,
    /// Attributes other than `xmlns` declarations
    pub attributes: Vec<XmlAttribute>,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
    /// Character data directly inside this element
    pub text: String,
}

impl XmlElement {
    /// Create an element from its qualified name parts
    pub fn new(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            local: local.into(),
            ..Self::default()
        }
    }

    /// Qualified name as written
    pub fn qualified_name(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    /// Whether this element is in the given namespace with the given local name
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }

    /// Whether this element is an RDF element
    pub fn is_rdf(&self) -> bool {
        self.namespace.as_deref() == Some(ns::RDF)
    }

    /// Whether this element is `rdf:Bag`, `rdf:Seq` or `rdf:Alt`
    pub fn is_rdf_container(&self) -> bool {
        self.is_rdf() && matches!(self.local.as_str(), "Bag" | "Seq" | "Alt")
    }

    /// Whether this element is `rdf:Description`
    pub fn is_description(&self) -> bool {
        self.is(ns::RDF, "Description")
    }

    /// Look up an attribute by namespace and local name
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.is(namespace, local))
            .map(|attr| attr.value.as_str())
    }

    /// Whether the element declares `rdf:parseType="Resource"`
    pub fn is_resource(&self) -> bool {
        self.attribute(ns::RDF, "parseType") == Some("Resource")
    }

    /// Attributes carrying data (not in the RDF or XML namespaces)
    pub fn data_attributes(&self) -> impl Iterator<Item = &XmlAttribute> {
        self.attributes.iter().filter(|attr| {
            !matches!(attr.namespace.as_deref(), Some(ns::RDF) | Some(ns::XML) | None)
        })
    }

    /// Depth-first search for every element matching the predicate
    ///
    /// Matching elements are not searched further.
    pub fn find_all<'a, F>(&'a self, predicate: &F, found: &mut Vec<&'a XmlElement>)
    where
        F: Fn(&XmlElement) -> bool,
    {
        if predicate(self) {
            found.push(self);
            return;
        }
        for child in &self.children {
            child.find_all(predicate, found);
        }
    }
}
