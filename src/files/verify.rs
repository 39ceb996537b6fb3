//! Post-embed verification
//!
//! After embedding, the produced bytes can be re-opened as an image to make
//! sure the container was not corrupted. With the `verify` feature the image
//! is decoded by the `image` crate; without it only the container structure
//! is re-parsed.

use crate::core::error::{AvmError, AvmResult};
#[cfg(feature = "jpeg")]
use crate::files::formats::jpeg::JpegContainer;
#[cfg(feature = "png")]
use crate::files::formats::png::PngContainer;
#[cfg(any(feature = "jpeg", feature = "png"))]
use crate::files::handler::XmpContainer;
use crate::files::registry::ContainerKind;

/// Trait for checks run on embedded image bytes
pub trait ImageVerifier {
    /// Fail with [`AvmError::VerificationFailed`] if the data is not a
    /// readable image
    fn verify(&self, data: &[u8]) -> AvmResult<()>;
}

/// Re-parses the container structure
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureVerifier;

impl ImageVerifier for StructureVerifier {
    fn verify(&self, data: &[u8]) -> AvmResult<()> {
        let result = match ContainerKind::detect(data) {
            #[cfg(feature = "jpeg")]
            ContainerKind::Jpeg => JpegContainer::parse(data).map(drop),
            #[cfg(feature = "png")]
            ContainerKind::Png => PngContainer::parse(data).map(drop),
            ContainerKind::Unknown => Err(AvmError::UnsupportedContainerFormat(
                "unrecognized image signature".to_string(),
            )),
        };
        result.map_err(|e| AvmError::VerificationFailed(e.to_string()))
    }
}

/// Decodes the full image with the `image` crate
#[cfg(feature = "verify")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeVerifier;

#[cfg(feature = "verify")]
impl ImageVerifier for DecodeVerifier {
    fn verify(&self, data: &[u8]) -> AvmResult<()> {
        image::load_from_memory(data)
            .map(drop)
            .map_err(|e| AvmError::VerificationFailed(e.to_string()))
    }
}

/// Verifier used by [`EmbedOptions::verify`](crate::files::handler::EmbedOptions::verify)
pub fn default_verifier() -> &'static dyn ImageVerifier {
    #[cfg(feature = "verify")]
    {
        &DecodeVerifier
    }
    #[cfg(not(feature = "verify"))]
    {
        &StructureVerifier
    }
}
