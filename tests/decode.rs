//! Frame decoder over in-memory streams, no child process involved.

mod common;

use std::io::Cursor;

use opuspipe::decode::FrameDecoder;

fn packets() -> Vec<Vec<u8>> {
    (0..4u8)
        .map(|i| vec![common::OPUS_TOC, i, 0xAA, 0x55])
        .collect()
}

#[test]
fn extracts_packets_in_order_without_headers() {
    let payloads = packets();
    let refs: Vec<&[u8]> = payloads.iter().map(|p| p.as_slice()).collect();
    let stream = common::ogg_opus_stream(&refs);

    let mut decoder = FrameDecoder::new(Cursor::new(stream), 8 * 1024);
    for payload in &payloads {
        let frame = decoder.next_frame(false).expect("frame");
        assert_eq!(frame.as_deref(), Some(payload.as_slice()));
    }
    assert_eq!(decoder.next_frame(false).expect("eos"), None);
    // exhausted stays exhausted
    assert_eq!(decoder.next_frame(false).expect("still eos"), None);
}

#[test]
fn empty_stream_is_end_of_stream_not_an_error() {
    let mut decoder = FrameDecoder::new(Cursor::new(Vec::new()), 1024);
    assert_eq!(decoder.next_frame(false).expect("eos"), None);
}

#[test]
fn truncated_final_page_ends_the_stream_cleanly() {
    let payloads = packets();
    let refs: Vec<&[u8]> = payloads.iter().map(|p| p.as_slice()).collect();
    let mut stream = common::ogg_opus_stream(&refs);
    // cut into the middle of the last page
    stream.truncate(stream.len() - 3);

    let mut decoder = FrameDecoder::new(Cursor::new(stream), 1024);
    for payload in &payloads[..payloads.len() - 1] {
        let frame = decoder.next_frame(false).expect("frame");
        assert_eq!(frame.as_deref(), Some(payload.as_slice()));
    }
    assert_eq!(decoder.next_frame(false).expect("eos"), None);
}

#[test]
fn closed_flag_turns_truncation_into_end_of_stream() {
    let payloads = packets();
    let refs: Vec<&[u8]> = payloads.iter().map(|p| p.as_slice()).collect();
    let full = common::ogg_opus_stream_unterminated(&refs);
    // only the header pages survive the "kill"
    let cut = full[..full.len() - payloads.len() * 32].to_vec();

    let mut decoder = FrameDecoder::new(Cursor::new(cut), 1024);
    loop {
        match decoder.next_frame(true) {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => panic!("closed stream must not fault: {e}"),
        }
    }
}
