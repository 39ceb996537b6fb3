//! PNG container
//!
//! This module models a PNG file as its signature followed by an ordered list
//! of chunks. Bytes after IEND are kept verbatim.
//!
//! PNG XMP Storage:
//! - XMP Packet is stored in iTXt chunk with keyword "XML:com.adobe.xmp"
//! - iTXt chunk format: keyword (null-terminated) + compression flag + compression method + language tag + translated keyword + text
//! - For XMP, compression flag is 0 (uncompressed)

use crate::core::error::{AvmError, AvmResult};
use crate::files::handler::XmpContainer;

/// PNG file signature
const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// XMP keyword in iTXt chunk, followed by a null separator
const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";

/// PNG chunk type for iTXt
const CHUNK_TYPE_ITXT: &[u8; 4] = b"iTXt";

/// PNG chunk type for IHDR (header, always first)
const CHUNK_TYPE_IHDR: &[u8; 4] = b"IHDR";

/// PNG chunk type for IEND (end of file)
const CHUNK_TYPE_IEND: &[u8; 4] = b"IEND";

/// Largest chunk data length allowed by the format
const MAX_CHUNK_SIZE: usize = 0x7FFF_FFFF;

/// One PNG chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Four-byte chunk type
    pub chunk_type: [u8; 4],
    /// Chunk data
    pub data: Vec<u8>,
}

impl Chunk {
    /// Create a chunk
    pub fn new(chunk_type: [u8; 4], data: Vec<u8>) -> Self {
        Self { chunk_type, data }
    }

    /// Chunk type as text, for messages
    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }

    /// Whether this is an iTXt chunk carrying an XMP packet
    pub fn is_xmp(&self) -> bool {
        self.chunk_type == *CHUNK_TYPE_ITXT && PngContainer::is_xmp_itxt(&self.data)
    }

    /// CRC-32 over type and data
    pub fn crc(&self) -> u32 {
        let mut crc = Crc32::new();
        crc.update(&self.chunk_type);
        crc.update(&self.data);
        crc.finish()
    }
}

/// PNG file as an ordered list of chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngContainer {
    chunks: Vec<Chunk>,
    /// Bytes after IEND, verbatim
    trailing: Vec<u8>,
}

impl PngContainer {
    /// All chunks in file order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Insert a chunk at a given index
    pub fn insert_chunk(&mut self, index: usize, chunk: Chunk) {
        self.chunks.insert(index, chunk);
    }

    /// Remove the chunk at a given index
    pub fn remove_chunk(&mut self, index: usize) -> Chunk {
        self.chunks.remove(index)
    }

    /// Check if an iTXt chunk contains XMP data
    fn is_xmp_itxt(data: &[u8]) -> bool {
        data.starts_with(XMP_KEYWORD) && data.get(XMP_KEYWORD.len()) == Some(&0)
    }

    /// Extract XMP data from an iTXt chunk
    fn extract_xmp_from_itxt(data: &[u8]) -> AvmResult<&[u8]> {
        // keyword + compression flag + compression method + language tag + translated keyword
        let keyword_len = XMP_KEYWORD.len() + 1;
        if data.len() < keyword_len + 2 {
            return Err(AvmError::MalformedContainer(
                "truncated XMP iTXt chunk".to_string(),
            ));
        }

        if data[keyword_len] != 0 {
            return Err(AvmError::MalformedContainer(
                "compressed XMP iTXt chunk".to_string(),
            ));
        }

        let mut text_start = keyword_len + 2;
        // Language tag, then translated keyword, both null-terminated
        for _ in 0..2 {
            let Some(end) = data[text_start..].iter().position(|&b| b == 0) else {
                return Err(AvmError::MalformedContainer(
                    "unterminated field in XMP iTXt chunk".to_string(),
                ));
            };
            text_start += end + 1;
        }

        Ok(&data[text_start..])
    }

    /// Build the data of an XMP iTXt chunk
    fn xmp_itxt_data(packet: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(XMP_KEYWORD.len() + 5 + packet.len());
        data.extend_from_slice(XMP_KEYWORD);
        data.push(0); // keyword separator
        data.push(0); // compression flag (0 = uncompressed)
        data.push(0); // compression method
        data.push(0); // language tag (empty, null-terminated)
        data.push(0); // translated keyword (empty, null-terminated)
        data.extend_from_slice(packet);
        data
    }

    /// Read a big-endian u32
    fn read_u32(data: &[u8], pos: usize) -> AvmResult<u32> {
        match data.get(pos..pos + 4) {
            Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
            None => Err(AvmError::MalformedContainer(format!(
                "PNG chunk truncated at offset {}",
                pos
            ))),
        }
    }
}

impl XmpContainer for PngContainer {
    const FORMAT: &'static str = "PNG";
    const EXTENSIONS: &'static [&'static str] = &["png"];

    fn can_handle(data: &[u8]) -> bool {
        data.starts_with(PNG_SIGNATURE)
    }

    fn parse(data: &[u8]) -> AvmResult<Self> {
        if !Self::can_handle(data) {
            return Err(AvmError::MalformedContainer(
                "Not a valid PNG file: bad signature".to_string(),
            ));
        }

        let mut chunks = Vec::new();
        let mut pos = PNG_SIGNATURE.len();
        while pos < data.len() {
            let length = Self::read_u32(data, pos)? as usize;
            let data_start = pos + 8;
            let data_end = data_start + length;
            if data_end + 4 > data.len() {
                return Err(AvmError::MalformedContainer(format!(
                    "PNG chunk at offset {} runs past the end of the file",
                    pos
                )));
            }

            let mut chunk_type = [0u8; 4];
            chunk_type.copy_from_slice(&data[pos + 4..data_start]);
            let chunk = Chunk::new(chunk_type, data[data_start..data_end].to_vec());
            if chunk.crc() != Self::read_u32(data, data_end)? {
                log::debug!("CRC mismatch in PNG chunk {}", chunk.type_name());
            }

            let is_end = chunk.chunk_type == *CHUNK_TYPE_IEND;
            chunks.push(chunk);
            pos = data_end + 4;
            if is_end {
                break;
            }
        }

        Ok(Self {
            chunks,
            trailing: data[pos.min(data.len())..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let size = self.chunks.iter().map(|c| c.data.len() + 12).sum::<usize>();
        let mut out = Vec::with_capacity(PNG_SIGNATURE.len() + size + self.trailing.len());
        out.extend_from_slice(PNG_SIGNATURE);
        for chunk in &self.chunks {
            out.extend_from_slice(&(chunk.data.len() as u32).to_be_bytes());
            out.extend_from_slice(&chunk.chunk_type);
            out.extend_from_slice(&chunk.data);
            out.extend_from_slice(&chunk.crc().to_be_bytes());
        }
        out.extend_from_slice(&self.trailing);
        out
    }

    fn xmp_packets(&self) -> AvmResult<Vec<&[u8]>> {
        self.chunks
            .iter()
            .filter(|c| c.is_xmp())
            .map(|c| Self::extract_xmp_from_itxt(&c.data))
            .collect()
    }

    fn remove_xmp_packets(&mut self) -> usize {
        let before = self.chunks.len();
        self.chunks.retain(|c| !c.is_xmp());
        before - self.chunks.len()
    }

    fn insert_xmp_packet(&mut self, packet: &[u8]) -> AvmResult<()> {
        match self.chunks.first() {
            Some(first) if first.chunk_type == *CHUNK_TYPE_IHDR => {}
            Some(first) => return Err(AvmError::MissingHeaderChunk(first.type_name())),
            None => return Err(AvmError::MissingHeaderChunk("nothing".to_string())),
        }

        let data = Self::xmp_itxt_data(packet);
        if data.len() > MAX_CHUNK_SIZE {
            return Err(AvmError::PacketTooLarge {
                size: data.len(),
                limit: MAX_CHUNK_SIZE + 1,
            });
        }
        self.insert_chunk(1, Chunk::new(*CHUNK_TYPE_ITXT, data));
        Ok(())
    }
}

/// PNG CRC-32
///
/// PNG uses CRC-32 with polynomial 0xEDB88320
struct Crc32 {
    value: u32,
}

impl Crc32 {
    const TABLE: [u32; 256] = Self::table();

    fn new() -> Self {
        Self { value: 0xFFFF_FFFF }
    }

    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let index = ((self.value ^ u32::from(byte)) & 0xFF) as usize;
            self.value = (self.value >> 8) ^ Self::TABLE[index];
        }
    }

    fn finish(&self) -> u32 {
        self.value ^ 0xFFFF_FFFF
    }

    /// Generate CRC-32 lookup table
    const fn table() -> [u32; 256] {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut bit = 0;
            while bit < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                bit += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_bytes(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let chunk = Chunk::new(*chunk_type, data.to_vec());
        let mut out = (data.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(data);
        out.extend_from_slice(&chunk.crc().to_be_bytes());
        out
    }

    fn create_png(extra: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(chunk_bytes(CHUNK_TYPE_IHDR, &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
        for (chunk_type, body) in extra {
            data.extend(chunk_bytes(chunk_type, body));
        }
        data.extend(chunk_bytes(b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01]));
        data.extend(chunk_bytes(CHUNK_TYPE_IEND, &[]));
        data
    }

    #[test]
    fn test_crc_calculation() {
        // Known CRC of an empty IEND chunk
        assert_eq!(Chunk::new(*CHUNK_TYPE_IEND, Vec::new()).crc(), 0xAE42_6082);
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let mut data = create_png(&[(b"tEXt", b"Comment\0hello")]);
        data.extend_from_slice(b"trailing");
        let container = PngContainer::parse(&data).unwrap();
        assert_eq!(container.chunks().len(), 4);
        assert_eq!(container.serialize(), data);
    }

    #[test]
    fn test_invalid_png() {
        assert!(matches!(
            PngContainer::parse(b"GIF89a.."),
            Err(AvmError::MalformedContainer(_))
        ));
        let mut data = create_png(&[]);
        data.truncate(data.len() - 6);
        assert!(matches!(
            PngContainer::parse(&data),
            Err(AvmError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_extract_xmp_from_itxt() {
        let data = PngContainer::xmp_itxt_data(b"<rdf:RDF>test</rdf:RDF>");
        assert!(PngContainer::is_xmp_itxt(&data));
        let extracted = PngContainer::extract_xmp_from_itxt(&data).unwrap();
        assert_eq!(extracted, b"<rdf:RDF>test</rdf:RDF>");

        let other_data = b"Other keyword\0";
        assert!(!PngContainer::is_xmp_itxt(other_data));
    }

    #[test]
    fn test_xmp_keyword_needs_separator() {
        assert!(PngContainer::is_xmp_itxt(b"XML:com.adobe.xmp\0\0\0\0\0<x/>"));
        assert!(!PngContainer::is_xmp_itxt(b"XML:com.adobe.xmp"));
        assert!(!PngContainer::is_xmp_itxt(b"XML:com.adobe.xmp.extra\0\0\0\0\0<x/>"));

        let png = create_png(&[(CHUNK_TYPE_ITXT, &b"XML:com.adobe.xmpX\0\0\0\0\0<x/>"[..])]);
        let mut container = PngContainer::parse(&png).unwrap();
        assert!(container.xmp_packets().unwrap().is_empty());
        assert_eq!(container.remove_xmp_packets(), 0);
    }

    #[test]
    fn test_compressed_itxt_is_rejected() {
        let mut data = PngContainer::xmp_itxt_data(b"x");
        data[XMP_KEYWORD.len() + 1] = 1;
        let png = create_png(&[(CHUNK_TYPE_ITXT, &data)]);
        let container = PngContainer::parse(&png).unwrap();
        assert!(matches!(
            container.xmp_packets(),
            Err(AvmError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_insert_after_header() {
        let mut container = PngContainer::parse(&create_png(&[])).unwrap();
        container.insert_xmp_packet(b"<x:xmpmeta/>").unwrap();
        assert_eq!(container.chunks()[0].chunk_type, *CHUNK_TYPE_IHDR);
        assert!(container.chunks()[1].is_xmp());

        let reparsed = PngContainer::parse(&container.serialize()).unwrap();
        assert_eq!(reparsed.xmp_packets().unwrap(), vec![&b"<x:xmpmeta/>"[..]]);
    }

    #[test]
    fn test_missing_header_chunk() {
        let mut container = PngContainer::parse(&create_png(&[])).unwrap();
        container.remove_chunk(0);
        assert!(matches!(
            container.insert_xmp_packet(b"x"),
            Err(AvmError::MissingHeaderChunk(name)) if name == "IDAT"
        ));
    }

    #[test]
    fn test_remove_xmp_packets() {
        let xmp = PngContainer::xmp_itxt_data(b"a");
        let png = create_png(&[(CHUNK_TYPE_ITXT, &xmp), (CHUNK_TYPE_ITXT, &xmp)]);
        let mut container = PngContainer::parse(&png).unwrap();
        assert_eq!(container.xmp_packets().unwrap().len(), 2);
        assert_eq!(container.remove_xmp_packets(), 2);
        assert!(container.xmp_packets().unwrap().is_empty());
    }
}
