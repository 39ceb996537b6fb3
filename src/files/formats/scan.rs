//! Raw packet scanning
//!
//! Fallback for containers that are not understood structurally: the bytes
//! are searched for `<?xpacket begin=` and the following `</x:xmpmeta>`.
//! Nothing guarantees a match is not part of unrelated binary data, so the
//! result is best-effort.

const PACKET_START: &[u8] = b"<?xpacket begin=";
const PACKET_END: &[u8] = b"</x:xmpmeta>";

/// Find every packet in the data, in file order
///
/// Each packet runs from `<?xpacket begin=` through `</x:xmpmeta>`
/// inclusive. A start marker without a matching end is ignored.
pub fn scan_packets(data: &[u8]) -> Vec<&[u8]> {
    let mut packets = Vec::new();
    let mut search_pos = 0;

    while let Some(offset) = find(&data[search_pos..], PACKET_START) {
        let start = search_pos + offset;
        let body = start + PACKET_START.len();
        let Some(end_offset) = find(&data[body..], PACKET_END) else {
            break;
        };
        let end = body + end_offset + PACKET_END.len();
        packets.push(&data[start..end]);
        search_pos = end;
    }

    packets
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
