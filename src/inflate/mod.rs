//! DEFLATE (RFC 1951) decoder.
//!
//! The decoder works on a complete compressed buffer and produces the whole
//! decompressed output in memory; there is no streaming interface. The output
//! buffer doubles as the LZ77 window, so back-references can only point into
//! bytes produced by the same call.
//!
//! - [`bit_cursor`]: LSB-first bit reader over the input
//! - [`huffman`]: canonical code construction and symbol decoding
//! - [`tables`]: fixed code lengths and length/distance base tables
//! - [`engine`]: the block state machine

pub mod bit_cursor;
pub mod engine;
pub mod huffman;
pub mod tables;

pub use bit_cursor::BitCursor;
pub use engine::InflateEngine;
pub use huffman::HuffmanTable;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateError {
    /// The input ended before the final block did.
    #[error("unexpected end of compressed data")]
    OutOfData,

    #[error("bit sequence matches no Huffman code")]
    NoMatch,

    #[error("reserved block type 3")]
    InvalidBlockType,

    #[error("stored block length {len:#06x} does not match its complement {nlen:#06x}")]
    StoredLengthMismatch { len: u16, nlen: u16 },

    #[error("invalid code lengths set")]
    InvalidCodeLengths,

    #[error("invalid bit length repeat")]
    InvalidRepeat,

    #[error("missing end-of-block code")]
    MissingEndOfBlock,

    #[error("invalid symbol {0}")]
    InvalidSymbol(u16),

    #[error("distance {distance} too far back ({available} bytes available)")]
    DistanceTooFar { distance: usize, available: usize },

    #[error("output exceeds capacity of {capacity} bytes")]
    CapacityExceeded { capacity: usize },
}

/// Decompress a raw DEFLATE stream, refusing to produce more than `capacity`
/// bytes. Input after the final block is ignored.
pub fn inflate(input: &[u8], capacity: usize) -> Result<Vec<u8>, InflateError> {
    InflateEngine::new(input, capacity).run()
}
