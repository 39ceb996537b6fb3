//! # avmkit
//!
//! Read and write AVM (Astronomy Visualization Metadata) in the XMP packets
//! of JPEG and PNG images.
//!
//! The crate is layered:
//!
//! - [`files`]: JPEG segment and PNG chunk containers, packet location,
//!   embedding and raw packet scanning for other formats
//! - [`core`]: the XMP/RDF parser and serializer and the [`AvmMeta`]
//!   metadata tree
//! - [`schema`]: the field tables of every AVM version, with validation and
//!   normalization per field
//!
//! ## Example
//!
//! ```rust,no_run
//! use avmkit::{AvmMeta, EmbedOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut meta = AvmMeta::from_image("eso1723a.png")?;
//! for warning in meta.take_warnings() {
//!     eprintln!("{}", warning);
//! }
//! println!("{}", meta.get("ID")?.map(|v| v.to_string()).unwrap_or_default());
//!
//! meta.set("Type", "simulation")?;
//! meta.set("Spatial.Scale", [-0.000763, 0.000763])?;
//! meta.embed("eso1723a.png", "eso1723a-tagged.png", EmbedOptions::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `jpeg`, `png`: structural container support (default)
//! - `verify`: decode embedded images with the `image` crate when
//!   [`EmbedOptions::verify`] is set (default)
//! - `serde`: `Serialize` for [`AvmValue`]

pub mod core;
pub mod files;
pub mod schema;
pub mod types;
pub mod utils;

pub use crate::core::error::{AvmError, AvmResult};
pub use crate::core::metadata::{AvmMeta, Entry, Group, ProjectionConverter, SpatialFields};
pub use crate::core::namespace::{ns, AvmNamespace};
pub use crate::core::parser::{FieldMap, XmpParser};
pub use crate::core::serializer::XmpSerializer;
pub use crate::core::warning::AvmWarning;
pub use crate::files::{
    AvmFile, ContainerKind, EmbedOptions, Embedded, ExtractOptions, Extracted, XmpContainer,
};
pub use crate::schema::{FieldDescriptor, Spec, SpecVersion, ValueKind};
pub use crate::types::value::{AvmValue, FieldKey, WireValue};
pub use crate::utils::datetime::AvmDateTime;
