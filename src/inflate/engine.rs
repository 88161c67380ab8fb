use log::trace;

use super::InflateError;
use super::bit_cursor::BitCursor;
use super::huffman::HuffmanTable;
use super::tables::*;

/// Where the decoder is within the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NewBlock,
    StoredBlock,
    FixedHuffman,
    DynamicHuffman,
    DecodeData,
    ReadLengthExtra { symbol: u16 },
    DecodeDistance { length: usize },
    ReadDistanceExtra { length: usize, symbol: u16 },
    CopyMatch { length: usize, distance: usize },
    Done,
}

/// One decompression run over a complete DEFLATE stream.
pub struct InflateEngine<'a> {
    input: BitCursor<'a>,
    output: Vec<u8>,
    capacity: usize,
    state: State,
    last_block: bool,
    literal_length: HuffmanTable,
    distance: HuffmanTable,
}

impl<'a> InflateEngine<'a> {
    pub fn new(input: &'a [u8], capacity: usize) -> Self {
        Self {
            input: BitCursor::new(input),
            // the capacity is caller controlled; don't trust it for the allocation
            output: Vec::with_capacity(capacity.min(input.len().saturating_mul(4))),
            capacity,
            state: State::NewBlock,
            last_block: false,
            literal_length: HuffmanTable::default(),
            distance: HuffmanTable::default(),
        }
    }

    /// Decode blocks until the final one ends, returning everything produced.
    pub fn run(mut self) -> Result<Vec<u8>, InflateError> {
        loop {
            self.state = match self.state {
                State::NewBlock => self.new_block()?,
                State::StoredBlock => self.stored_block()?,
                State::FixedHuffman => self.fixed_huffman()?,
                State::DynamicHuffman => self.dynamic_huffman()?,
                State::DecodeData => self.decode_data()?,
                State::ReadLengthExtra { symbol } => self.read_length_extra(symbol)?,
                State::DecodeDistance { length } => self.decode_distance(length)?,
                State::ReadDistanceExtra { length, symbol } => {
                    self.read_distance_extra(length, symbol)?
                }
                State::CopyMatch { length, distance } => self.copy_match(length, distance)?,
                State::Done => break,
            };
        }
        trace!(
            "inflate done: {} bytes in, {} bytes out",
            self.input.bytes_consumed(),
            self.output.len()
        );
        Ok(self.output)
    }

    fn end_of_block(&self) -> State {
        if self.last_block {
            State::Done
        } else {
            State::NewBlock
        }
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<(), InflateError> {
        if self.output.len() + bytes.len() > self.capacity {
            return Err(InflateError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn new_block(&mut self) -> Result<State, InflateError> {
        self.last_block = self.input.read_bit()? == 1;
        let btype = self.input.read_bits(2)?;
        trace!(
            "block header: final={} type={} at output {}",
            self.last_block,
            btype,
            self.output.len()
        );
        match btype {
            0 => Ok(State::StoredBlock),
            1 => Ok(State::FixedHuffman),
            2 => Ok(State::DynamicHuffman),
            _ => Err(InflateError::InvalidBlockType),
        }
    }

    fn stored_block(&mut self) -> Result<State, InflateError> {
        self.input.align_to_byte();
        let len = self.input.read_bits(16)? as u16;
        let nlen = self.input.read_bits(16)? as u16;
        if nlen != !len {
            return Err(InflateError::StoredLengthMismatch { len, nlen });
        }
        let bytes = self.input.read_bytes(len as usize)?;
        self.emit(bytes)?;
        Ok(self.end_of_block())
    }

    fn fixed_huffman(&mut self) -> Result<State, InflateError> {
        self.literal_length = HuffmanTable::from_lengths(&FIXED_LITERAL_LENGTHS)?;
        self.distance = HuffmanTable::from_lengths(&FIXED_DISTANCE_LENGTHS)?;
        Ok(State::DecodeData)
    }

    fn dynamic_huffman(&mut self) -> Result<State, InflateError> {
        let hlit = self.input.read_bits(5)? as usize + 257;
        let hdist = self.input.read_bits(5)? as usize + 1;
        let hclen = self.input.read_bits(4)? as usize + 4;
        if hlit > 286 || hdist > 30 {
            return Err(InflateError::InvalidCodeLengths);
        }

        let mut code_length_lengths = [0u8; 19];
        for &symbol in &CODE_LENGTH_ORDER[..hclen] {
            code_length_lengths[symbol] = self.input.read_bits(3)? as u8;
        }
        let code_lengths = HuffmanTable::from_lengths(&code_length_lengths)?;

        let total = hlit + hdist;
        let mut lengths = vec![0u8; total];
        let mut have = 0;
        while have < total {
            let symbol = code_lengths.decode(&mut self.input)?;
            let (value, repeat) = match symbol {
                0..=15 => (symbol as u8, 1),
                16 => {
                    let Some(&previous) = have.checked_sub(1).and_then(|i| lengths.get(i)) else {
                        return Err(InflateError::InvalidRepeat);
                    };
                    (previous, 3 + self.input.read_bits(2)? as usize)
                }
                17 => (0, 3 + self.input.read_bits(3)? as usize),
                18 => (0, 11 + self.input.read_bits(7)? as usize),
                _ => return Err(InflateError::InvalidSymbol(symbol)),
            };
            if have + repeat > total {
                return Err(InflateError::InvalidRepeat);
            }
            lengths[have..have + repeat].fill(value);
            have += repeat;
        }

        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(InflateError::MissingEndOfBlock);
        }

        self.literal_length = HuffmanTable::from_lengths(&lengths[..hlit])?;
        self.distance = HuffmanTable::from_lengths(&lengths[hlit..])?;
        trace!("dynamic block: hlit={hlit} hdist={hdist} hclen={hclen}");
        Ok(State::DecodeData)
    }

    fn decode_data(&mut self) -> Result<State, InflateError> {
        let symbol = self.literal_length.decode(&mut self.input)?;
        match symbol {
            0..=255 => {
                self.emit(&[symbol as u8])?;
                Ok(State::DecodeData)
            }
            END_OF_BLOCK => Ok(self.end_of_block()),
            257..=285 => Ok(State::ReadLengthExtra { symbol }),
            _ => Err(InflateError::InvalidSymbol(symbol)),
        }
    }

    fn read_length_extra(&mut self, symbol: u16) -> Result<State, InflateError> {
        let index = (symbol - 257) as usize;
        let extra = self.input.read_bits(LENGTH_EXTRA[index])?;
        let length = LENGTH_BASE[index] as usize + extra as usize;
        Ok(State::DecodeDistance { length })
    }

    fn decode_distance(&mut self, length: usize) -> Result<State, InflateError> {
        let symbol = self.distance.decode(&mut self.input)?;
        if symbol as usize >= DISTANCE_BASE.len() {
            return Err(InflateError::InvalidSymbol(symbol));
        }
        Ok(State::ReadDistanceExtra { length, symbol })
    }

    fn read_distance_extra(&mut self, length: usize, symbol: u16) -> Result<State, InflateError> {
        let index = symbol as usize;
        let extra = self.input.read_bits(DISTANCE_EXTRA[index])?;
        let distance = DISTANCE_BASE[index] as usize + extra as usize;
        Ok(State::CopyMatch { length, distance })
    }

    fn copy_match(&mut self, length: usize, distance: usize) -> Result<State, InflateError> {
        let available = self.output.len();
        if distance > available || distance > WINDOW_SIZE {
            return Err(InflateError::DistanceTooFar {
                distance,
                available: available.min(WINDOW_SIZE),
            });
        }
        if available + length > self.capacity {
            return Err(InflateError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        // byte by byte: the source may overlap what this copy writes
        let start = available - distance;
        for i in 0..length {
            let byte = self.output[start + i];
            self.output.push(byte);
        }
        Ok(State::DecodeData)
    }
}
