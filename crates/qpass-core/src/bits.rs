//! Measured bit sequences.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreResult, Error};

/// Bits per password character.
pub const BITS_PER_CHUNK: usize = 8;

/// An ordered sequence of measurement outcomes.
///
/// Holds only the characters `0` and `1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString(String);

impl BitString {
    /// Parse a string of `0`/`1` characters.
    pub fn parse(s: &str) -> CoreResult<Self> {
        if let Some((position, found)) = s.chars().enumerate().find(|(_, c)| !matches!(c, '0' | '1'))
        {
            return Err(Error::InvalidBitString { position, found });
        }
        Ok(Self(s.to_string()))
    }

    /// Build from individual bits, first bit first.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        Self(bits.into_iter().map(|b| if b { '1' } else { '0' }).collect())
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The bits as a `0`/`1` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `n` bits, or all of them if there are fewer.
    pub fn preview(&self, n: usize) -> &str {
        // ASCII only, so every index is a char boundary.
        &self.0[..n.min(self.0.len())]
    }

    /// Complete 8-bit chunks read most significant bit first.
    ///
    /// A trailing chunk of fewer than 8 bits is not yielded.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.0
            .as_bytes()
            .chunks_exact(BITS_PER_CHUNK)
            .map(|chunk| chunk.iter().fold(0u8, |acc, b| (acc << 1) | (b - b'0')))
    }

    /// Number of complete 8-bit chunks.
    pub fn num_bytes(&self) -> usize {
        self.0.len() / BITS_PER_CHUNK
    }
}

impl FromStr for BitString {
    type Err = Error;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
