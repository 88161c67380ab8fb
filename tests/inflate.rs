use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

use zipread::{InflateError, inflate};

fn deflate(data: &[u8], level: Compression) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), level);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Deterministic bytes that do not compress well.
fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

fn text(len: usize) -> Vec<u8> {
    let words = ["zip ", "deflate ", "huffman ", "window ", "block ", "disk\n"];
    words.iter().cycle().flat_map(|w| w.bytes()).take(len).collect()
}

#[test]
fn test_empty_input() {
    let compressed = deflate(b"", Compression::default());
    assert_eq!(inflate(&compressed, 0).unwrap(), b"");
}

#[test]
fn test_stored_blocks() {
    // 70000 bytes needs more than one stored block (max 65535 each)
    let data = noise(70_000);
    let compressed = deflate(&data, Compression::none());
    assert_eq!(inflate(&compressed, data.len()).unwrap(), data);
}

#[test]
fn test_text_at_several_levels() {
    let data = text(20_000);
    for level in [Compression::fast(), Compression::default(), Compression::best()] {
        let compressed = deflate(&data, level);
        assert!(compressed.len() < data.len() / 4);
        assert_eq!(inflate(&compressed, data.len()).unwrap(), data);
    }
}

#[test]
fn test_long_matches_across_blocks() {
    // long runs reach the maximum match length and distance
    let mut data = noise(40_000);
    let tail = data[..40_000 - 32_768].to_vec();
    data.extend(vec![b'x'; 5_000]);
    data.extend(tail);
    data.extend(noise(300_000));
    let compressed = deflate(&data, Compression::best());
    assert_eq!(inflate(&compressed, data.len()).unwrap(), data);
}

#[test]
fn test_incompressible_data() {
    let data = noise(10_000);
    let compressed = deflate(&data, Compression::default());
    assert_eq!(inflate(&compressed, data.len()).unwrap(), data);
}

#[test]
fn test_trailing_bytes_ignored() {
    let data = text(1_000);
    let mut compressed = deflate(&data, Compression::default());
    compressed.extend_from_slice(b"PK\x07\x08 trailing");
    assert_eq!(inflate(&compressed, data.len()).unwrap(), data);
}

#[test]
fn test_truncated_stream() {
    let data = text(5_000);
    let compressed = deflate(&data, Compression::default());
    let cut = &compressed[..compressed.len() / 2];
    assert_eq!(inflate(cut, data.len()), Err(InflateError::OutOfData));
}

#[test]
fn test_capacity_too_small() {
    let data = text(5_000);
    let compressed = deflate(&data, Compression::default());
    assert_eq!(
        inflate(&compressed, 4_999),
        Err(InflateError::CapacityExceeded { capacity: 4_999 })
    );
}
