//! JPEG container
//!
//! This module models a JPEG file as the list of marker segments between the
//! SOI marker and the first SOS (or EOI) marker. Everything from SOS onwards
//! (scan data, EOI and any trailing bytes) is kept verbatim.
//!
//! JPEG XMP Storage:
//! - XMP Packet is stored in APP1 segment with identifier `http://ns.adobe.com/xap/1.0/\0`
//! - Segment length field: 2 bytes big-endian, counting itself (payload + 2)
//! - Standard APP1 payload limit: 65533 bytes

use crate::core::error::{AvmError, AvmResult};
use crate::files::handler::XmpContainer;

/// JPEG segment markers
const MARKER_SOI: u8 = 0xD8; // Start of Image
const MARKER_APP0: u8 = 0xE0;
const MARKER_APP1: u8 = 0xE1;
const MARKER_SOS: u8 = 0xDA; // Start of Scan
const MARKER_EOI: u8 = 0xD9; // End of Image

/// XMP namespace identifier in APP1 segment
const XMP_NAMESPACE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// Exclusive upper bound of an APP1 payload (64KB - 2 bytes for length)
const MAX_APP1_SIZE: usize = 65533;

/// Exclusive upper bound of any segment payload the length field can encode
const MAX_SEGMENT_SIZE: usize = 65534;

/// One marker segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Marker byte following 0xFF
    pub marker: u8,
    /// Segment content without marker and length field
    pub payload: Vec<u8>,
    /// Number of 0xFF fill bytes preceding the marker
    pub fill: usize,
}

impl Segment {
    /// Create a segment
    pub fn new(marker: u8, payload: Vec<u8>) -> Self {
        Self {
            marker,
            payload,
            fill: 0,
        }
    }

    /// Whether this is an APP1 segment carrying an XMP packet
    pub fn is_xmp(&self) -> bool {
        self.marker == MARKER_APP1 && self.payload.starts_with(XMP_NAMESPACE)
    }

    /// Whether this is a start-of-frame segment
    pub fn is_sof(&self) -> bool {
        is_sof_marker(self.marker)
    }
}

/// SOF0-SOF15, excluding DHT (C4), JPG (C8) and DAC (CC)
fn is_sof_marker(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// JPEG file as an ordered list of segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegContainer {
    segments: Vec<Segment>,
    /// SOS onwards, verbatim
    tail: Vec<u8>,
}

impl JpegContainer {
    /// Segments before the first scan
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Insert a segment at a given index
    ///
    /// Fails with [`AvmError::PacketTooLarge`] if the payload does not fit
    /// the 16-bit length field.
    pub fn insert_segment(&mut self, index: usize, segment: Segment) -> AvmResult<()> {
        let size = segment.payload.len();
        if size >= MAX_SEGMENT_SIZE {
            return Err(AvmError::PacketTooLarge {
                size,
                limit: MAX_SEGMENT_SIZE,
            });
        }
        self.segments.insert(index, segment);
        Ok(())
    }

    /// Remove the segment at a given index
    pub fn remove_segment(&mut self, index: usize) -> Segment {
        self.segments.remove(index)
    }

    /// Index a new XMP segment goes to
    ///
    /// After the last APP1, else after the last APP0, else before the first
    /// SOF segment.
    fn insertion_index(&self) -> AvmResult<usize> {
        let last = |marker: u8| self.segments.iter().rposition(|s| s.marker == marker);
        if let Some(index) = last(MARKER_APP1).or_else(|| last(MARKER_APP0)) {
            return Ok(index + 1);
        }
        self.segments
            .iter()
            .position(Segment::is_sof)
            .ok_or_else(|| {
                AvmError::NoInsertionPoint(format!(
                    "no APP1, APP0 or SOF segment among {} segments",
                    self.segments.len()
                ))
            })
    }

    /// Read segment length (2 bytes, big-endian)
    fn read_segment_length(data: &[u8], pos: usize) -> AvmResult<usize> {
        match data.get(pos..pos + 2) {
            Some(bytes) => Ok(u16::from_be_bytes([bytes[0], bytes[1]]) as usize),
            None => Err(AvmError::MalformedContainer(format!(
                "JPEG segment length truncated at offset {}",
                pos
            ))),
        }
    }
}

impl XmpContainer for JpegContainer {
    const FORMAT: &'static str = "JPEG";
    const EXTENSIONS: &'static [&'static str] = &["jpg", "jpeg"];

    fn can_handle(data: &[u8]) -> bool {
        data.len() >= 2 && data[0] == 0xFF && data[1] == MARKER_SOI
    }

    fn parse(data: &[u8]) -> AvmResult<Self> {
        if !Self::can_handle(data) {
            return Err(AvmError::MalformedContainer(
                "Not a valid JPEG file: missing SOI marker".to_string(),
            ));
        }

        let mut segments = Vec::new();
        let mut pos = 2;
        while pos < data.len() {
            if data[pos] != 0xFF || pos + 1 >= data.len() {
                return Err(AvmError::MalformedContainer(format!(
                    "expected JPEG marker at offset {}",
                    pos
                )));
            }

            // Fill bytes before a marker
            let start = pos;
            while pos + 1 < data.len() && data[pos + 1] == 0xFF {
                pos += 1;
            }
            if pos + 1 >= data.len() {
                return Err(AvmError::MalformedContainer(format!(
                    "fill bytes at offset {} run to the end of the data",
                    start
                )));
            }
            let fill = pos - start;

            let marker = data[pos + 1];
            if marker == MARKER_SOS || marker == MARKER_EOI {
                return Ok(Self {
                    segments,
                    tail: data[start..].to_vec(),
                });
            }

            let length = Self::read_segment_length(data, pos + 2)?;
            let end = pos + 2 + length;
            if length < 2 || end > data.len() {
                return Err(AvmError::MalformedContainer(format!(
                    "JPEG segment 0x{:02X} at offset {} has invalid length {}",
                    marker, pos, length
                )));
            }
            segments.push(Segment {
                marker,
                payload: data[pos + 4..end].to_vec(),
                fill,
            });
            pos = end;
        }

        Ok(Self {
            segments,
            tail: Vec::new(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let size = self
            .segments
            .iter()
            .map(|s| s.fill + s.payload.len() + 4)
            .sum::<usize>();
        let mut out = Vec::with_capacity(2 + size + self.tail.len());
        out.extend_from_slice(&[0xFF, MARKER_SOI]);
        for segment in &self.segments {
            out.resize(out.len() + segment.fill, 0xFF);
            out.extend_from_slice(&[0xFF, segment.marker]);
            out.extend_from_slice(&((segment.payload.len() + 2) as u16).to_be_bytes());
            out.extend_from_slice(&segment.payload);
        }
        out.extend_from_slice(&self.tail);
        out
    }

    fn xmp_packets(&self) -> AvmResult<Vec<&[u8]>> {
        Ok(self
            .segments
            .iter()
            .filter(|s| s.is_xmp())
            .map(|s| &s.payload[XMP_NAMESPACE.len()..])
            .collect())
    }

    fn remove_xmp_packets(&mut self) -> usize {
        let before = self.segments.len();
        self.segments.retain(|s| !s.is_xmp());
        before - self.segments.len()
    }

    fn insert_xmp_packet(&mut self, packet: &[u8]) -> AvmResult<()> {
        let size = XMP_NAMESPACE.len() + packet.len();
        if size >= MAX_APP1_SIZE {
            return Err(AvmError::PacketTooLarge {
                size,
                limit: MAX_APP1_SIZE,
            });
        }

        let index = self.insertion_index()?;
        let mut payload = Vec::with_capacity(size);
        payload.extend_from_slice(XMP_NAMESPACE);
        payload.extend_from_slice(packet);
        self.insert_segment(index, Segment::new(MARKER_APP1, payload))
    }
}
