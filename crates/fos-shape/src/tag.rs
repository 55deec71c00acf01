//! OpenType tags
//!
//! Four-byte identifiers used for features, variation axes and scripts.

use std::fmt;
use std::str::FromStr;

/// OpenType four-byte tag packed big-endian into a `u32`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tag(pub u32);

impl Tag {
    /// Create a tag from four bytes
    pub const fn from_bytes(bytes: &[u8; 4]) -> Self {
        Tag(((bytes[0] as u32) << 24)
            | ((bytes[1] as u32) << 16)
            | ((bytes[2] as u32) << 8)
            | (bytes[3] as u32))
    }

    /// Tag bytes in order
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Lower-cased copy of the tag
    pub fn to_lowercase(self) -> Self {
        let mut bytes = self.to_bytes();
        bytes.make_ascii_lowercase();
        Tag::from_bytes(&bytes)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Error parsing a tag from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tag: {0:?}")]
pub struct ParseTagError(pub String);

impl FromStr for Tag {
    type Err = ParseTagError;

    /// Parse 1 to 4 ASCII characters, padding short tags with spaces
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 4 || !s.is_ascii() {
            return Err(ParseTagError(s.to_string()));
        }

        let mut bytes = [b' '; 4];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Ok(Tag::from_bytes(&bytes))
    }
}
