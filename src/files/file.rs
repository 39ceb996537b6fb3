//! AVM File API
//!
//! This module provides a high-level API for reading and writing AVM metadata
//! in image files or in-memory image bytes.

use crate::core::error::{AvmError, AvmResult};
use crate::core::metadata::AvmMeta;
use crate::core::parser::XmpParser;
use crate::core::warning::AvmWarning;
use crate::files::handler::{EmbedOptions, ExtractOptions};
use crate::files::packet::{self, Embedded, Extracted};
use crate::files::registry::ContainerKind;
use crate::files::verify::ImageVerifier;
use std::path::{Path, PathBuf};

/// High-level API for AVM metadata in image files
///
/// An `AvmFile` holds the bytes of one image. Reading never changes them;
/// embedding returns new bytes that can be written with [`AvmFile::save`]
/// or kept in memory.
///
/// # Example
///
/// ```rust,no_run
/// use avmkit::{AvmFile, EmbedOptions, ExtractOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut file = AvmFile::open("image.jpg")?;
/// let mut meta = file.read_meta(ExtractOptions::default())?;
/// meta.set("Title", "The Pillars of Creation")?;
/// file.update(&meta, EmbedOptions::default())?;
/// file.save("image-tagged.jpg")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AvmFile {
    data: Vec<u8>,
    kind: ContainerKind,
    /// Original file path, if opened from disk
    path: Option<PathBuf>,
}

impl AvmFile {
    /// Open a file from a path
    pub fn open<P: AsRef<Path>>(path: P) -> AvmResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut file = Self::from_bytes(data);
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Wrap image bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let kind = ContainerKind::detect(&data);
        Self {
            data,
            kind,
            path: None,
        }
    }

    /// Image bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the file, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Detected container format
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Path the file was opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Extract the raw XMP packet
    pub fn extract(&self, options: ExtractOptions) -> AvmResult<Extracted> {
        packet::extract(&self.data, &options)
    }

    /// Read the AVM metadata
    ///
    /// Warnings raised while locating the packet come first in the
    /// returned tree's warning buffer.
    pub fn read_meta(&self, options: ExtractOptions) -> AvmResult<AvmMeta> {
        let extracted = self.extract(options)?;
        let fields = XmpParser::new().parse_bytes(&extracted.packet)?;
        let mut meta = AvmMeta::from_fields(fields)?;
        meta.prepend_warnings(extracted.warnings);
        Ok(meta)
    }

    /// Embed metadata, returning the new image bytes
    ///
    /// The file itself is left unchanged; see [`AvmFile::update`].
    pub fn embed(&self, meta: &AvmMeta, options: EmbedOptions) -> AvmResult<Embedded> {
        let xmp = meta.to_xmp()?;
        packet::embed(&self.data, xmp.as_bytes(), &options)
    }

    /// Embed metadata and check the result with a custom verifier
    pub fn embed_with_verifier<V: ImageVerifier>(
        &self,
        meta: &AvmMeta,
        verifier: &V,
    ) -> AvmResult<Embedded> {
        let embedded = self.embed(meta, EmbedOptions::default())?;
        verifier.verify(&embedded.data)?;
        Ok(embedded)
    }

    /// Embed metadata, replacing the held bytes
    pub fn update(
        &mut self,
        meta: &AvmMeta,
        options: EmbedOptions,
    ) -> AvmResult<Vec<AvmWarning>> {
        let embedded = self.embed(meta, options)?;
        self.data = embedded.data;
        Ok(embedded.warnings)
    }

    /// Write the held bytes to a path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AvmResult<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Write the held bytes back to the path the file was opened from
    pub fn save_in_place(&self) -> AvmResult<()> {
        match &self.path {
            Some(path) => self.save(path),
            None => Err(AvmError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "file was not opened from a path",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::AvmValue;

    #[test]
    fn test_from_bytes_unknown() {
        let file = AvmFile::from_bytes(vec![0, 1, 2, 3]);
        assert_eq!(file.kind(), ContainerKind::Unknown);
        assert!(file.path().is_none());
        assert!(matches!(
            file.read_meta(ExtractOptions::default()),
            Err(AvmError::NoXmpPacketFound)
        ));
        assert!(file.save_in_place().is_err());
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn test_update_and_read_back() {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x4A, 0x46, 0xFF, 0xD9];
        let mut file = AvmFile::from_bytes(jpeg);
        assert_eq!(file.kind(), ContainerKind::Jpeg);

        let mut meta = AvmMeta::new();
        meta.set("ID", "eso1723a").unwrap();
        let warnings = file.update(&meta, EmbedOptions::default()).unwrap();
        assert!(warnings.is_empty());

        let read = file.read_meta(ExtractOptions::default()).unwrap();
        assert_eq!(read.get("ID").unwrap(), Some(&AvmValue::from("eso1723a")));
        assert!(read.warnings().is_empty());
    }
}
