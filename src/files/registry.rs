//! Container format detection
//!
//! This module maps image bytes or file extensions to the container formats
//! that are understood structurally.

#[cfg(feature = "jpeg")]
use crate::files::formats::jpeg::JpegContainer;
#[cfg(feature = "png")]
use crate::files::formats::png::PngContainer;
#[cfg(any(feature = "jpeg", feature = "png"))]
use crate::files::handler::XmpContainer;
use std::fmt;

/// Enum of container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ContainerKind {
    #[cfg(feature = "jpeg")]
    Jpeg,
    #[cfg(feature = "png")]
    Png,
    /// Not understood structurally; only raw scanning applies
    Unknown,
}

impl ContainerKind {
    /// All structurally understood formats
    pub const SUPPORTED: &'static [ContainerKind] = &[
        #[cfg(feature = "jpeg")]
        ContainerKind::Jpeg,
        #[cfg(feature = "png")]
        ContainerKind::Png,
    ];

    /// Detect the format from the leading signature
    pub fn detect(data: &[u8]) -> Self {
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|kind| kind.can_handle(data))
            .unwrap_or(ContainerKind::Unknown)
    }

    /// Find a format by file extension
    ///
    /// # Arguments
    ///
    /// * `extension` - File extension (e.g., "jpg", "png")
    ///
    /// # Returns
    ///
    /// * `Some(ContainerKind)` if a format matches
    /// * `None` otherwise
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext_lower = extension.to_lowercase();
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|kind| kind.extensions().iter().any(|e| *e == ext_lower))
    }

    /// Name of the format (e.g., "JPEG", "PNG")
    pub fn format_name(self) -> &'static str {
        match self {
            #[cfg(feature = "jpeg")]
            ContainerKind::Jpeg => JpegContainer::FORMAT,
            #[cfg(feature = "png")]
            ContainerKind::Png => PngContainer::FORMAT,
            ContainerKind::Unknown => "unknown",
        }
    }

    /// File extensions of the format
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "jpeg")]
            ContainerKind::Jpeg => JpegContainer::EXTENSIONS,
            #[cfg(feature = "png")]
            ContainerKind::Png => PngContainer::EXTENSIONS,
            ContainerKind::Unknown => &[],
        }
    }

    /// Whether the format is understood structurally
    pub fn is_supported(self) -> bool {
        self != ContainerKind::Unknown
    }

    fn can_handle(self, data: &[u8]) -> bool {
        match self {
            #[cfg(feature = "jpeg")]
            ContainerKind::Jpeg => JpegContainer::can_handle(data),
            #[cfg(feature = "png")]
            ContainerKind::Png => PngContainer::can_handle(data),
            ContainerKind::Unknown => {
                let _ = data;
                false
            }
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_extension() {
        #[cfg(feature = "jpeg")]
        {
            assert_eq!(ContainerKind::from_extension("jpg"), Some(ContainerKind::Jpeg));
            assert_eq!(ContainerKind::from_extension("JPEG"), Some(ContainerKind::Jpeg));
        }

        #[cfg(feature = "png")]
        assert_eq!(ContainerKind::from_extension("png"), Some(ContainerKind::Png));

        // Unknown extension
        assert_eq!(ContainerKind::from_extension("tiff"), None);
        assert_eq!(ContainerKind::from_extension("xyz"), None);
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn test_detect_jpeg() {
        let jpeg_data = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(ContainerKind::detect(&jpeg_data), ContainerKind::Jpeg);
        assert_eq!(ContainerKind::Jpeg.to_string(), "JPEG");
    }

    #[cfg(feature = "png")]
    #[test]
    fn test_detect_png() {
        let png_data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ContainerKind::detect(&png_data), ContainerKind::Png);
    }

    #[test]
    fn test_detect_unknown() {
        // Random data that doesn't match any format
        let unknown_data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert_eq!(ContainerKind::detect(&unknown_data), ContainerKind::Unknown);
        assert!(!ContainerKind::Unknown.is_supported());
        // GIF is only scanned
        assert_eq!(ContainerKind::detect(b"GIF89a"), ContainerKind::Unknown);
    }
}
