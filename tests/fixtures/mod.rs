//! Shared test fixtures
//!
//! Images are built in memory: minimal container shells for structural
//! tests and real encoded images for tests that decode pixels.

#![allow(dead_code)]

use std::io::Cursor;

pub const XMP_NAMESPACE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
pub const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// A JPEG segment with its marker and length field
pub fn jpeg_segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// SOI, the given segments, a short scan and EOI
pub fn jpeg_with(segments: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    for (marker, payload) in segments {
        data.extend(jpeg_segment(*marker, payload));
    }
    data.extend(jpeg_segment(0xDA, &[1, 1, 0, 0, 0x3F, 0]));
    data.extend_from_slice(&[0xA5, 0xFF, 0x00, 0x5A]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// JPEG shell with APP0 (JFIF), a quantization table and SOF0
pub fn minimal_jpeg() -> Vec<u8> {
    jpeg_with(&[
        (0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0".to_vec()),
        (0xDB, vec![0; 65]),
        (0xC0, vec![8, 0, 1, 0, 1, 1, 1, 0x11, 0]),
    ])
}

/// APP1 payload carrying an XMP packet
pub fn xmp_app1(packet: &str) -> Vec<u8> {
    let mut payload = XMP_NAMESPACE.to_vec();
    payload.extend_from_slice(packet.as_bytes());
    payload
}

/// PNG CRC-32
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
    }
    crc ^ 0xFFFF_FFFF
}

/// A PNG chunk with length and CRC
pub fn png_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    let mut crc_input = chunk_type.to_vec();
    crc_input.extend_from_slice(data);
    out.extend_from_slice(&crc32(&crc_input).to_be_bytes());
    out
}

/// iTXt data carrying an XMP packet
pub fn xmp_itxt(packet: &str) -> Vec<u8> {
    let mut data = b"XML:com.adobe.xmp\0\0\0\0\0".to_vec();
    data.extend_from_slice(packet.as_bytes());
    data
}

/// Signature, IHDR, the given chunks, IDAT and IEND
pub fn png_with(chunks: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend(png_chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
    for (chunk_type, body) in chunks {
        data.extend(png_chunk(chunk_type, body));
    }
    data.extend(png_chunk(
        b"IDAT",
        &[0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01],
    ));
    data.extend(png_chunk(b"IEND", &[]));
    data
}

/// PNG shell without metadata
pub fn minimal_png() -> Vec<u8> {
    png_with(&[])
}

/// A complete XMP packet with a few AVM fields
pub fn sample_packet(id: &str) -> String {
    let bom = '\u{feff}';
    format!(
        r#"<?xpacket begin="{bom}" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:avm="http://www.communicatingastronomy.org/avm/1.0/"
        xmlns:dc="http://purl.org/dc/elements/1.1/"
        xmlns:photoshop="http://ns.adobe.com/photoshop/1.0/"
        xmlns:Iptc4xmpCore="http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/"
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        avm:MetadataVersion="1.2"
        xmp:CreatorTool="Some Editor">
      <avm:ID>{id}</avm:ID>
      <avm:Type>Observation</avm:Type>
      <dc:title>
        <rdf:Alt>
          <rdf:li xml:lang="x-default">Pillars of Creation</rdf:li>
        </rdf:Alt>
      </dc:title>
      <dc:subject>
        <rdf:Bag>
          <rdf:li>nebula</rdf:li>
          <rdf:li>star formation</rdf:li>
        </rdf:Bag>
      </dc:subject>
      <photoshop:Credit>ESO</photoshop:Credit>
      <Iptc4xmpCore:CreatorContactInfo rdf:parseType="Resource">
        <Iptc4xmpCore:CiEmailWork>pio@eso.org</Iptc4xmpCore:CiEmailWork>
        <Iptc4xmpCore:CiUrlWork>https://www.eso.org</Iptc4xmpCore:CiUrlWork>
      </Iptc4xmpCore:CreatorContactInfo>
      <avm:Spatial.Scale>
        <rdf:Seq>
          <rdf:li>-0.0002777777777778</rdf:li>
          <rdf:li>0.0002777777777778</rdf:li>
        </rdf:Seq>
      </avm:Spatial.Scale>
      <avm:Spectral.Band>
        <rdf:Seq>
          <rdf:li>Optical</rdf:li>
          <rdf:li>Infrared</rdf:li>
        </rdf:Seq>
      </avm:Spectral.Band>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#
    )
}

/// Real PNG image encoded by the `image` crate
pub fn encoded_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Png)
}

/// Real JPEG image encoded by the `image` crate
pub fn encoded_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let pixels = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 16) as u8, (y * 16) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(pixels)
        .write_to(&mut out, format)
        .unwrap();
    out.into_inner()
}
