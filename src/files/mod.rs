//! Image container support for AVM
//!
//! This module locates, extracts and embeds XMP packets in image files.
//! JPEG and PNG are handled structurally; other data is scanned for raw
//! packets when reading. All implementations are pure Rust.

pub mod file;
pub mod formats;
pub mod handler;
pub mod packet;
pub mod registry;
pub mod verify;

pub use file::AvmFile;
#[cfg(feature = "jpeg")]
pub use formats::jpeg::{JpegContainer, Segment};
#[cfg(feature = "png")]
pub use formats::png::{Chunk, PngContainer};
pub use formats::scan::scan_packets;
pub use handler::{EmbedOptions, ExtractOptions, XmpContainer};
pub use packet::{embed, extract, Embedded, Extracted};
pub use registry::ContainerKind;
#[cfg(feature = "verify")]
pub use verify::DecodeVerifier;
pub use verify::{ImageVerifier, StructureVerifier};
