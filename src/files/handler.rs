//! Container trait for XMP packets
//!
//! This module defines the trait that every structurally understood image
//! container implements, along with the options controlling extraction and
//! embedding.

use crate::core::error::AvmResult;

/// Options for extracting an XMP packet.
///
/// Use the builder pattern to configure options.
///
/// # Example
///
/// ```rust,no_run
/// use avmkit::{AvmFile, ExtractOptions};
///
/// let file = AvmFile::open("image.png")?;
/// let meta = file.read_meta(ExtractOptions::default().packet_index(1))?;
/// # Ok::<(), avmkit::AvmError>(())
/// ```
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Packet to select when the container holds several
    pub packet_index: Option<usize>,
    /// Scan the raw bytes even when the container format is recognized
    pub use_packet_scanning: bool,
}

impl ExtractOptions {
    /// Select a packet by index.
    ///
    /// Without an index the first packet is used, with a warning if there
    /// are several.
    pub fn packet_index(mut self, index: usize) -> Self {
        self.packet_index = Some(index);
        self
    }

    /// Force raw packet scanning.
    ///
    /// Do not use the JPEG/PNG container structure.
    pub fn use_packet_scanning(mut self) -> Self {
        self.use_packet_scanning = true;
        self
    }
}

/// Options for embedding an XMP packet.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Re-open the produced bytes as an image before returning them
    pub verify: bool,
}

impl EmbedOptions {
    /// Verify the produced image.
    ///
    /// With the `verify` feature the image is fully decoded; otherwise only
    /// its container structure is re-parsed.
    pub fn verify(mut self) -> Self {
        self.verify = true;
        self
    }
}

/// Trait for image containers holding XMP packets
///
/// A container is an ordered list of binary records plus the framing of its
/// format. Parsing and serializing an unmodified container reproduces the
/// input bytes.
pub trait XmpContainer: Sized {
    /// Name of the format (e.g., "JPEG", "PNG")
    const FORMAT: &'static str;

    /// File extensions of the format
    const EXTENSIONS: &'static [&'static str];

    /// Check the leading signature of the data
    fn can_handle(data: &[u8]) -> bool;

    /// Parse a container
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` on success
    /// * `Err(AvmError::MalformedContainer)` if the signature does not match
    ///   or a record is truncated
    fn parse(data: &[u8]) -> AvmResult<Self>;

    /// Serialize the container, recomputing length and checksum fields
    fn serialize(&self) -> Vec<u8>;

    /// Payloads of all XMP records, in record order
    fn xmp_packets(&self) -> AvmResult<Vec<&[u8]>>;

    /// Remove every XMP record
    ///
    /// # Returns
    ///
    /// The number of records removed
    fn remove_xmp_packets(&mut self) -> usize;

    /// Insert a new XMP record at the format's insertion point
    fn insert_xmp_packet(&mut self, packet: &[u8]) -> AvmResult<()>;
}
