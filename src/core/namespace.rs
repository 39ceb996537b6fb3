//! Namespace tables for AVM packets
//!
//! AVM packets use five fixed XML namespaces for their fields plus the RDF,
//! XML and `adobe:ns:meta/` namespaces for structure. The tables here are
//! immutable and shared process-wide.
//!
//! Packets written by other tools may bind these URIs to different prefixes,
//! so parsing resolves prefixes through a [`NamespaceScope`] built from the
//! `xmlns` declarations actually present in the document.

use std::collections::HashMap;
use std::fmt;

/// Namespace URIs and default prefixes
pub mod ns {
    /// AVM namespace
    pub const AVM: &str = "http://www.communicatingastronomy.org/avm/1.0/";
    /// Dublin Core namespace
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// Photoshop namespace
    pub const PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
    /// IPTC Core namespace
    pub const IPTC_CORE: &str = "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/";
    /// XMP Rights namespace
    pub const XMP_RIGHTS: &str = "http://ns.adobe.com/xap/1.0/rights/";
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XML namespace (for xml:lang)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// x:xmpmeta wrapper namespace
    pub const X: &str = "adobe:ns:meta/";

    /// AVM prefix
    pub const AVM_PREFIX: &str = "avm";
    /// Dublin Core prefix
    pub const DC_PREFIX: &str = "dc";
    /// Photoshop prefix
    pub const PHOTOSHOP_PREFIX: &str = "photoshop";
    /// IPTC Core prefix
    pub const IPTC_CORE_PREFIX: &str = "Iptc4xmpCore";
    /// XMP Rights prefix as written by AVM tools
    pub const XAP_RIGHTS_PREFIX: &str = "xapRights";
    /// XMP Rights prefix used by newer XMP writers
    pub const XMP_RIGHTS_PREFIX: &str = "xmpRights";
    /// RDF prefix
    pub const RDF_PREFIX: &str = "rdf";
    /// XML prefix
    pub const XML_PREFIX: &str = "xml";
    /// x:xmpmeta prefix
    pub const X_PREFIX: &str = "x";
}

/// One of the namespaces AVM fields live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AvmNamespace {
    /// `avm:` domain fields
    Avm,
    /// `dc:` Dublin Core
    Dc,
    /// `photoshop:`
    Photoshop,
    /// `Iptc4xmpCore:`
    Iptc4xmpCore,
    /// `xapRights:` (also written as `xmpRights:`)
    XapRights,
}

impl AvmNamespace {
    /// All field namespaces, in the order they are declared on output
    pub const ALL: [AvmNamespace; 5] = [
        AvmNamespace::Avm,
        AvmNamespace::Dc,
        AvmNamespace::Photoshop,
        AvmNamespace::Iptc4xmpCore,
        AvmNamespace::XapRights,
    ];

    /// Namespace URI
    pub fn uri(self) -> &'static str {
        match self {
            AvmNamespace::Avm => ns::AVM,
            AvmNamespace::Dc => ns::DC,
            AvmNamespace::Photoshop => ns::PHOTOSHOP,
            AvmNamespace::Iptc4xmpCore => ns::IPTC_CORE,
            AvmNamespace::XapRights => ns::XMP_RIGHTS,
        }
    }

    /// Prefix used when writing packets
    pub fn prefix(self) -> &'static str {
        match self {
            AvmNamespace::Avm => ns::AVM_PREFIX,
            AvmNamespace::Dc => ns::DC_PREFIX,
            AvmNamespace::Photoshop => ns::PHOTOSHOP_PREFIX,
            AvmNamespace::Iptc4xmpCore => ns::IPTC_CORE_PREFIX,
            AvmNamespace::XapRights => ns::XAP_RIGHTS_PREFIX,
        }
    }

    /// Look up a field namespace by URI
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|namespace| namespace.uri() == uri)
    }

    /// Whether dotted tags in this namespace denote a struct member
    ///
    /// AVM tags contain dots as part of their name (`Spatial.Scale`), while
    /// `Iptc4xmpCore:CreatorContactInfo.CiEmailWork` is the `CiEmailWork`
    /// member of the `CreatorContactInfo` struct.
    pub fn nests_dotted_tags(self) -> bool {
        !matches!(self, AvmNamespace::Avm)
    }
}

impl fmt::Display for AvmNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Default prefix for a URI, if it is one of the known namespaces
pub fn default_prefix(uri: &str) -> Option<&'static str> {
    if let Some(namespace) = AvmNamespace::from_uri(uri) {
        return Some(namespace.prefix());
    }
    match uri {
        ns::RDF => Some(ns::RDF_PREFIX),
        ns::XML => Some(ns::XML_PREFIX),
        ns::X => Some(ns::X_PREFIX),
        _ => None,
    }
}

/// Stack of in-scope prefix declarations
///
/// Each element pushes one frame holding its own `xmlns:*` attributes;
/// lookups walk from the innermost frame outwards. The `xml` prefix is
/// always bound.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    frames: Vec<HashMap<String, String>>,
}

impl NamespaceScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a frame for a new element
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Close the innermost frame
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Bind a prefix in the innermost frame
    ///
    /// The empty prefix stands for the default namespace (`xmlns="..."`).
    pub fn declare(&mut self, prefix: &str, uri: &str) {
        if self.frames.is_empty() {
            self.push_frame();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(prefix.to_string(), uri.to_string());
        }
    }

    /// Resolve a prefix to its URI
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        if prefix == ns::XML_PREFIX {
            return Some(ns::XML);
        }
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(prefix))
            .map(|uri| uri.as_str())
    }

    /// Nesting depth
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_lookup() {
        assert_eq!(AvmNamespace::from_uri(ns::AVM), Some(AvmNamespace::Avm));
        assert_eq!(
            AvmNamespace::from_uri(ns::XMP_RIGHTS),
            Some(AvmNamespace::XapRights)
        );
        assert_eq!(AvmNamespace::from_uri("http://example.com/ns"), None);
        assert_eq!(AvmNamespace::Iptc4xmpCore.prefix(), "Iptc4xmpCore");
        assert_eq!(default_prefix(ns::RDF), Some("rdf"));
    }

    #[test]
    fn test_dotted_tags() {
        assert!(!AvmNamespace::Avm.nests_dotted_tags());
        assert!(AvmNamespace::Iptc4xmpCore.nests_dotted_tags());
    }

    #[test]
    fn test_scope_shadowing() {
        let mut scope = NamespaceScope::new();
        scope.push_frame();
        scope.declare("a", ns::AVM);
        scope.push_frame();
        scope.declare("a", ns::DC);
        assert_eq!(scope.resolve("a"), Some(ns::DC));
        scope.pop_frame();
        assert_eq!(scope.resolve("a"), Some(ns::AVM));
        assert_eq!(scope.resolve("xml"), Some(ns::XML));
        assert_eq!(scope.resolve("missing"), None);
    }
}
