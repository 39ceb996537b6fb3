//! AVM Core module
//!
//! This module contains the core functionality for AVM metadata processing,
//! including XMP parsing, the metadata tree, and serialization.

pub mod error;
pub mod metadata;
pub mod namespace;
pub mod node;
pub mod parser;
pub mod serializer;
pub mod warning;

pub use error::{AvmError, AvmResult};
pub use metadata::{AvmMeta, Entry, Group, ProjectionConverter, SpatialFields};
pub use namespace::{ns, AvmNamespace, NamespaceScope};
pub use node::{XmlAttribute, XmlElement};
pub use parser::{FieldMap, XmpParser};
pub use serializer::XmpSerializer;
pub use warning::AvmWarning;
