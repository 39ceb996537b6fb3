//! Packet location and embedding
//!
//! [`extract`] finds the XMP packets of an image and selects one;
//! [`embed`] replaces every existing packet with a new one.

use crate::core::error::{AvmError, AvmResult};
use crate::core::warning::{raise, AvmWarning};
#[cfg(feature = "jpeg")]
use crate::files::formats::jpeg::JpegContainer;
#[cfg(feature = "png")]
use crate::files::formats::png::PngContainer;
use crate::files::formats::scan::scan_packets;
use crate::files::handler::{EmbedOptions, ExtractOptions, XmpContainer};
use crate::files::registry::ContainerKind;
use crate::files::verify::default_verifier;

/// A packet selected from an image
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// Packet bytes
    pub packet: Vec<u8>,
    /// Detected container format
    pub kind: ContainerKind,
    /// Number of packets found
    pub count: usize,
    /// Warnings raised while locating the packet
    pub warnings: Vec<AvmWarning>,
}

/// Image bytes with a packet embedded
#[derive(Debug, Clone, PartialEq)]
pub struct Embedded {
    /// Complete image
    pub data: Vec<u8>,
    /// Warnings raised while embedding
    pub warnings: Vec<AvmWarning>,
}

/// Extract one XMP packet from image bytes
///
/// JPEG and PNG containers are read structurally. Other data, or any data
/// when [`ExtractOptions::use_packet_scanning`] is set, is scanned for raw
/// packets.
///
/// # Returns
///
/// * `Ok(Extracted)` with the selected packet
/// * `Err(AvmError::NoXmpPacketFound)` if there is none
/// * `Err(AvmError::IndexOutOfRange)` if the requested packet does not exist
pub fn extract(data: &[u8], options: &ExtractOptions) -> AvmResult<Extracted> {
    let mut warnings = Vec::new();
    let kind = ContainerKind::detect(data);

    let packets: Vec<Vec<u8>> = if options.use_packet_scanning {
        scan_packets(data).into_iter().map(<[u8]>::to_vec).collect()
    } else {
        match kind {
            #[cfg(feature = "jpeg")]
            ContainerKind::Jpeg => owned(JpegContainer::parse(data)?.xmp_packets()?),
            #[cfg(feature = "png")]
            ContainerKind::Png => owned(PngContainer::parse(data)?.xmp_packets()?),
            ContainerKind::Unknown => {
                raise(&mut warnings, AvmWarning::UnsupportedContainerFormat);
                scan_packets(data).into_iter().map(<[u8]>::to_vec).collect()
            }
        }
    };

    let count = packets.len();
    let packet = select(packets, options.packet_index, &mut warnings)?;
    log::debug!("selected XMP packet of {} bytes from {} container", packet.len(), kind);
    Ok(Extracted {
        packet,
        kind,
        count,
        warnings,
    })
}

/// Embed an XMP packet into image bytes
///
/// All existing packets are removed first; a single
/// [`AvmWarning::DuplicatePacketDiscarded`] reports how many. Nothing is
/// returned if any step fails.
///
/// # Returns
///
/// * `Ok(Embedded)` with the new image bytes
/// * `Err(AvmError::UnsupportedContainerFormat)` if the data is neither JPEG nor PNG
/// * `Err(AvmError::VerificationFailed)` if verification was requested and failed
pub fn embed(data: &[u8], packet: &[u8], options: &EmbedOptions) -> AvmResult<Embedded> {
    let mut warnings = Vec::new();
    let data = match ContainerKind::detect(data) {
        #[cfg(feature = "jpeg")]
        ContainerKind::Jpeg => {
            embed_into(&mut JpegContainer::parse(data)?, packet, &mut warnings)?
        }
        #[cfg(feature = "png")]
        ContainerKind::Png => embed_into(&mut PngContainer::parse(data)?, packet, &mut warnings)?,
        ContainerKind::Unknown => {
            return Err(AvmError::UnsupportedContainerFormat(
                "embedding requires a JPEG or PNG container".to_string(),
            ))
        }
    };

    if options.verify {
        default_verifier().verify(&data)?;
    }
    Ok(Embedded { data, warnings })
}

/// Replace the packets of a parsed container and serialize it
pub fn embed_into<C: XmpContainer>(
    container: &mut C,
    packet: &[u8],
    warnings: &mut Vec<AvmWarning>,
) -> AvmResult<Vec<u8>> {
    let removed = container.remove_xmp_packets();
    container.insert_xmp_packet(packet)?;
    if removed > 0 {
        raise(
            warnings,
            AvmWarning::DuplicatePacketDiscarded {
                format: C::FORMAT,
                count: removed,
            },
        );
    }
    Ok(container.serialize())
}

#[cfg(any(feature = "jpeg", feature = "png"))]
fn owned(packets: Vec<&[u8]>) -> Vec<Vec<u8>> {
    packets.into_iter().map(<[u8]>::to_vec).collect()
}

/// Apply the index and ambiguity rules
fn select(
    mut packets: Vec<Vec<u8>>,
    index: Option<usize>,
    warnings: &mut Vec<AvmWarning>,
) -> AvmResult<Vec<u8>> {
    let count = packets.len();
    if count == 0 {
        return Err(AvmError::NoXmpPacketFound);
    }
    match index {
        Some(index) if index >= count => Err(AvmError::IndexOutOfRange { index, count }),
        Some(index) => Ok(packets.swap_remove(index)),
        None => {
            if count > 1 {
                raise(warnings, AvmWarning::MultiplePacketsAmbiguous { count });
            }
            Ok(packets.swap_remove(0))
        }
    }
}
