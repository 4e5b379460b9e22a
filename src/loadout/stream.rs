//! Bit streams over a 6-bits-per-character, URL-safe alphabet.
//!
//! Values are packed least-significant bit first; a value may straddle
//! characters. The final character is zero-padded.

use super::DecodeError;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const BITS_PER_CHAR: usize = 6;

fn char_value(c: char) -> Option<u8> {
    let v = match c {
        'A'..='Z' => c as u8 - b'A',
        'a'..='z' => c as u8 - b'a' + 26,
        '0'..='9' => c as u8 - b'0' + 52,
        '-' => 62,
        '_' => 63,
        _ => return None,
    };
    Some(v)
}

#[derive(Debug, Default)]
pub(crate) struct ExportStream {
    chars: Vec<u8>,
    current: u8,
    used: usize,
}

impl ExportStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, width: u32, value: u64) {
        for bit in 0..width {
            if (value >> bit) & 1 == 1 {
                self.current |= 1 << self.used;
            }
            self.used += 1;
            if self.used == BITS_PER_CHAR {
                self.chars.push(self.current);
                self.current = 0;
                self.used = 0;
            }
        }
    }

    /// 7-bit groups, each followed by a continuation bit.
    pub fn add_varint(&mut self, mut value: u32) {
        loop {
            self.add_value(7, u64::from(value & 0x7f));
            value >>= 7;
            self.add_value(1, u64::from(value != 0));
            if value == 0 {
                break;
            }
        }
    }

    pub fn finish(mut self) -> String {
        if self.used > 0 {
            self.chars.push(self.current);
        }
        self.chars
            .iter()
            .map(|&v| ALPHABET[v as usize] as char)
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct ImportStream {
    values: Vec<u8>,
    bit_pos: usize,
}

impl ImportStream {
    pub fn new(input: &str) -> Result<Self, DecodeError> {
        if input.is_empty() {
            return Err(DecodeError::Empty);
        }
        let values = input
            .chars()
            .enumerate()
            .map(|(position, character)| {
                char_value(character).ok_or(DecodeError::InvalidCharacter { position, character })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values, bit_pos: 0 })
    }

    fn total_bits(&self) -> usize {
        self.values.len() * BITS_PER_CHAR
    }

    pub fn extract_value(&mut self, width: u32) -> Result<u64, DecodeError> {
        if self.bit_pos + width as usize > self.total_bits() {
            return Err(DecodeError::Truncated);
        }
        let mut value = 0u64;
        for bit in 0..width {
            let pos = self.bit_pos;
            let set = (self.values[pos / BITS_PER_CHAR] >> (pos % BITS_PER_CHAR)) & 1;
            value |= u64::from(set) << bit;
            self.bit_pos += 1;
        }
        Ok(value)
    }

    pub fn extract_varint(&mut self) -> Result<u32, DecodeError> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let group = self.extract_value(7)?;
            value |= group << shift;
            if value > u64::from(u32::MAX) {
                return Err(DecodeError::Malformed("node id out of range"));
            }
            if self.extract_value(1)? == 0 {
                break;
            }
            shift += 7;
            if shift > 28 {
                return Err(DecodeError::Malformed("node id out of range"));
            }
        }
        Ok(value as u32)
    }

    /// Everything left must be zero padding inside the last character.
    pub fn finish(mut self) -> Result<(), DecodeError> {
        let remaining = self.total_bits() - self.bit_pos;
        if remaining >= BITS_PER_CHAR {
            return Err(DecodeError::TrailingData);
        }
        if remaining > 0 && self.extract_value(remaining as u32)? != 0 {
            return Err(DecodeError::TrailingData);
        }
        Ok(())
    }
}
