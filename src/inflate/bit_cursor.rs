use super::InflateError;

/// Sequential reader over the bits of a byte slice.
///
/// Bits are taken least significant first within each byte, which is how
/// DEFLATE packs everything except Huffman codes.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    byte_index: usize,
    bit_offset: u8,
}

impl<'a> BitCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_index: 0,
            bit_offset: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<u8, InflateError> {
        let byte = *self.data.get(self.byte_index).ok_or(InflateError::OutOfData)?;
        let bit = (byte >> self.bit_offset) & 1;
        self.bit_offset += 1;
        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.byte_index += 1;
        }
        Ok(bit)
    }

    /// Read `n` bits (at most 32); stream bit `i` becomes bit `i` of the result.
    pub fn read_bits(&mut self, n: u8) -> Result<u32, InflateError> {
        debug_assert!(n <= 32);
        if self.bits_remaining() < n as usize {
            return Err(InflateError::OutOfData);
        }
        let mut value = 0u32;
        for i in 0..n {
            value |= u32::from(self.read_bit()?) << i;
        }
        Ok(value)
    }

    /// Skip to the start of the next byte, unless already there.
    pub fn align_to_byte(&mut self) {
        if self.bit_offset != 0 {
            self.bit_offset = 0;
            self.byte_index += 1;
        }
    }

    /// Take `len` whole bytes. The cursor must be byte aligned.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], InflateError> {
        debug_assert_eq!(self.bit_offset, 0);
        let end = self
            .byte_index
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(InflateError::OutOfData)?;
        let bytes = &self.data[self.byte_index..end];
        self.byte_index = end;
        Ok(bytes)
    }

    pub fn bits_remaining(&self) -> usize {
        (self.data.len().saturating_sub(self.byte_index)) * 8 - self.bit_offset as usize
    }

    /// Number of input bytes touched so far, counting a partly read byte.
    pub fn bytes_consumed(&self) -> usize {
        self.byte_index + usize::from(self.bit_offset != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_lsb_first() {
        let mut cursor = BitCursor::new(&[0b1010_0110, 0xFF]);
        assert_eq!(cursor.read_bit().unwrap(), 0);
        assert_eq!(cursor.read_bit().unwrap(), 1);
        assert_eq!(cursor.read_bits(3).unwrap(), 0b001);
        // crosses into the second byte
        assert_eq!(cursor.read_bits(5).unwrap(), 0b11101);
        assert_eq!(cursor.bits_remaining(), 6);
    }

    #[test]
    fn test_read_bits_matches_little_endian() {
        let mut cursor = BitCursor::new(&[0x34, 0x12]);
        assert_eq!(cursor.read_bits(16).unwrap(), 0x1234);
    }

    #[test]
    fn test_out_of_data() {
        let mut cursor = BitCursor::new(&[0x01]);
        assert_eq!(cursor.read_bits(9), Err(InflateError::OutOfData));
        // a failed read consumes nothing
        assert_eq!(cursor.read_bits(8).unwrap(), 1);
        assert_eq!(cursor.read_bit(), Err(InflateError::OutOfData));
    }

    #[test]
    fn test_align_and_read_bytes() {
        let mut cursor = BitCursor::new(&[0xFF, b'h', b'i']);
        cursor.read_bits(3).unwrap();
        cursor.align_to_byte();
        assert_eq!(cursor.bytes_consumed(), 1);
        cursor.align_to_byte();
        assert_eq!(cursor.read_bytes(2).unwrap(), b"hi");
        assert_eq!(cursor.read_bytes(1), Err(InflateError::OutOfData));
    }
}
