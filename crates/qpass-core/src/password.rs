//! Password assembly from measured bits.
//!
//! Each complete 8-bit chunk picks one character: the chunk is read as a
//! `u8`, most significant bit first, and reduced modulo the alphabet size.
//!
//! ```
//! use qpass_core::{Alphabet, BitString, assemble};
//!
//! let bits = BitString::parse("00000001").unwrap();
//! let password = assemble(&bits, &Alphabet::standard());
//! assert_eq!(password.as_str(), "b");
//! ```

use std::fmt;

use crate::bits::BitString;
use crate::error::{CoreResult, Error};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*";

/// Ordered characters a password is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// The 70-character alphabet: `a-z`, `A-Z`, `0-9`, then `!@#$%^&*`.
    pub fn standard() -> Self {
        let chars = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS]
            .concat()
            .into_iter()
            .map(char::from)
            .collect();
        Self { chars }
    }

    /// Create a custom alphabet. Order is preserved; it must not be empty.
    pub fn new(chars: impl IntoIterator<Item = char>) -> CoreResult<Self> {
        let chars: Vec<char> = chars.into_iter().collect();
        if chars.is_empty() {
            return Err(Error::InvalidAlphabet);
        }
        Ok(Self { chars })
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false: construction rejects empty alphabets.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at an index.
    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Whether a character belongs to the alphabet.
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// The character a byte maps to (`byte mod len`).
    pub fn pick(&self, byte: u8) -> char {
        self.chars[usize::from(byte) % self.chars.len()]
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::standard()
    }
}

/// A generated password.
///
/// `Debug` hides the value; use [`as_str`](Self::as_str) or `Display` to
/// reveal it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// The password text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the password is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("len", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map every complete 8-bit chunk of `bits` to one character of `alphabet`.
///
/// A trailing chunk of fewer than 8 bits is dropped.
pub fn assemble(bits: &BitString, alphabet: &Alphabet) -> Password {
    Password(bits.bytes().map(|byte| alphabet.pick(byte)).collect())
}
