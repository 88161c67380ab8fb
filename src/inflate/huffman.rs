//! Canonical Huffman codes (RFC 1951 section 3.2.2).
//!
//! A code of bit-length `L` is stored as the integer `(1 << L) | code`. The
//! leading 1 marks the length, so sorting the tagged integers sorts by length
//! first and code value second, and a partially read code of `k` bits can be
//! probed against the table with the same tagging.

use super::InflateError;
use super::bit_cursor::BitCursor;

/// Longest code DEFLATE allows.
pub const MAX_CODE_LENGTH: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    code: u32,
    symbol: u16,
}

/// Lookup table for one alphabet, sorted by tagged code.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTable {
    entries: Vec<Entry>,
    max_length: u8,
}

impl HuffmanTable {
    /// Assign canonical codes to `lengths`, indexed by symbol. A length of 0
    /// means the symbol is unused.
    ///
    /// Incomplete codes are accepted (a lone distance code is legal);
    /// over-subscribed ones are rejected.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self, InflateError> {
        let mut symbols: Vec<(u8, u16)> = lengths
            .iter()
            .enumerate()
            .filter(|&(_, &len)| len != 0)
            .map(|(symbol, &len)| (len, symbol as u16))
            .collect();
        if symbols.iter().any(|&(len, _)| len > MAX_CODE_LENGTH) {
            return Err(InflateError::InvalidCodeLengths);
        }
        // (length, symbol) ascending; equal lengths keep symbol order
        symbols.sort_unstable();

        let mut entries = Vec::with_capacity(symbols.len());
        let mut next_code = 0u32;
        let mut prev_length = 0u8;
        for (len, symbol) in symbols {
            if len > prev_length {
                next_code <<= len - prev_length;
                prev_length = len;
            }
            if next_code >= 1 << len {
                return Err(InflateError::InvalidCodeLengths);
            }
            entries.push(Entry {
                code: (1 << len) | next_code,
                symbol,
            });
            next_code += 1;
        }

        Ok(Self {
            entries,
            max_length: prev_length,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Code assigned to `symbol` as `(bits, length)`, if it has one.
    pub fn code_of(&self, symbol: u16) -> Option<(u32, u8)> {
        self.entries.iter().find(|e| e.symbol == symbol).map(|e| {
            let len = (31 - e.code.leading_zeros()) as u8;
            (e.code & !(1 << len), len)
        })
    }

    /// Decode one symbol, reading the code most significant bit first.
    pub fn decode(&self, cursor: &mut BitCursor<'_>) -> Result<u16, InflateError> {
        let mut code = 0u32;
        for len in 1..=self.max_length {
            code = (code << 1) | u32::from(cursor.read_bit()?);
            let probe = (1 << len) | code;
            if let Ok(i) = self.entries.binary_search_by_key(&probe, |e| e.code) {
                return Ok(self.entries[i].symbol);
            }
        }
        Err(InflateError::NoMatch)
    }
}
