//! Hand-rolled Ogg/Opus streams for tests, so no real encoder is needed.
//!
//! Layout: one BOS page carrying `OpusHead`, one page carrying `OpusTags`,
//! then one page per data packet. Page CRCs are computed with the Ogg
//! polynomial so strict demuxers accept the stream.

#![allow(dead_code)] // not every integration test uses every helper

/// A complete stream: the last data page carries the end-of-stream flag.
pub fn ogg_opus_stream(packets: &[&[u8]]) -> Vec<u8> {
    build(packets, true)
}

/// Same stream without an end-of-stream page, as a stalled encoder would
/// leave it: a reader that has consumed every packet blocks on the next one.
pub fn ogg_opus_stream_unterminated(packets: &[&[u8]]) -> Vec<u8> {
    build(packets, false)
}

/// A plausible Opus TOC byte (CELT, fullband, 20 ms, stereo) so packet
/// payloads look like what an encoder emits.
pub const OPUS_TOC: u8 = 0x5C;

const SERIAL: u32 = 0x0d15_ea5e;
/// 20 ms at 48 kHz.
const GRANULE_PER_PACKET: u64 = 960;

fn build(packets: &[&[u8]], finish: bool) -> Vec<u8> {
    assert!(!packets.is_empty(), "need at least one data packet");

    let mut out = Vec::new();
    let mut seq = 0u32;

    out.extend(page(seq, 0x02, 0, &opus_head()));
    seq += 1;
    out.extend(page(seq, 0x00, 0, &opus_tags()));
    seq += 1;

    for (i, packet) in packets.iter().enumerate() {
        let last = i + 1 == packets.len();
        let flags = if last && finish { 0x04 } else { 0x00 };
        let granule = (i as u64 + 1) * GRANULE_PER_PACKET;
        out.extend(page(seq, flags, granule, packet));
        seq += 1;
    }

    out
}

fn page(seq: u32, header_type: u8, granule: u64, packet: &[u8]) -> Vec<u8> {
    assert!(packet.len() < 255, "test packets must fit one lacing value");

    let mut page = Vec::with_capacity(28 + packet.len());
    page.extend_from_slice(b"OggS");
    page.push(0); // stream structure version
    page.push(header_type);
    page.extend_from_slice(&granule.to_le_bytes());
    page.extend_from_slice(&SERIAL.to_le_bytes());
    page.extend_from_slice(&seq.to_le_bytes());
    page.extend_from_slice(&[0u8; 4]); // crc, patched below
    page.push(1); // one lacing value
    page.push(packet.len() as u8);
    page.extend_from_slice(packet);

    let crc = ogg_crc(&page);
    page[22..26].copy_from_slice(&crc.to_le_bytes());
    page
}

fn opus_head() -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1); // version
    head.push(2); // channel count
    head.extend_from_slice(&312u16.to_le_bytes()); // pre-skip
    head.extend_from_slice(&48_000u32.to_le_bytes()); // input sample rate
    head.extend_from_slice(&0i16.to_le_bytes()); // output gain
    head.push(0); // mapping family
    head
}

fn opus_tags() -> Vec<u8> {
    let vendor = b"opuspipe-test";
    let mut tags = Vec::new();
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&0u32.to_le_bytes()); // no user comments
    tags
}

/// CRC-32 as specified by Ogg: polynomial 0x04c11db7, zero init, no
/// reflection, no final xor.
fn ogg_crc(data: &[u8]) -> u32 {
    let mut crc = 0u32;
    for &byte in data {
        crc ^= (byte as u32) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04c1_1db7
            } else {
                crc << 1
            };
        }
    }
    crc
}
