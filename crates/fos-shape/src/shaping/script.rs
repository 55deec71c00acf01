//! Segment properties
//!
//! Direction, script and language of a buffer. Together they select the
//! shaping behaviour and form part of every shape plan key.

use std::fmt;

use crate::tag::Tag;

/// Text direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Not set; resolved from the script before shaping
    #[default]
    Invalid,
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl Direction {
    /// Horizontal direction
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftToRight | Direction::RightToLeft)
    }

    /// Vertical direction
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TopToBottom | Direction::BottomToTop)
    }

    /// Glyphs come out in logical order
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::LeftToRight | Direction::TopToBottom)
    }

    /// Glyphs come out in reverse logical order
    pub fn is_backward(self) -> bool {
        matches!(self, Direction::RightToLeft | Direction::BottomToTop)
    }

    /// Opposite direction along the same axis
    pub fn reverse(self) -> Self {
        match self {
            Direction::Invalid => Direction::Invalid,
            Direction::LeftToRight => Direction::RightToLeft,
            Direction::RightToLeft => Direction::LeftToRight,
            Direction::TopToBottom => Direction::BottomToTop,
            Direction::BottomToTop => Direction::TopToBottom,
        }
    }
}

/// ISO 15924 script, stored as its four-letter tag (e.g. `Latn`)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Script(pub Tag);

impl Script {
    pub const COMMON: Script = Script(Tag::from_bytes(b"Zyyy"));
    pub const INHERITED: Script = Script(Tag::from_bytes(b"Zinh"));
    pub const UNKNOWN: Script = Script(Tag::from_bytes(b"Zzzz"));
    pub const LATIN: Script = Script(Tag::from_bytes(b"Latn"));
    pub const GREEK: Script = Script(Tag::from_bytes(b"Grek"));
    pub const CYRILLIC: Script = Script(Tag::from_bytes(b"Cyrl"));
    pub const ARABIC: Script = Script(Tag::from_bytes(b"Arab"));
    pub const HEBREW: Script = Script(Tag::from_bytes(b"Hebr"));
    pub const DEVANAGARI: Script = Script(Tag::from_bytes(b"Deva"));
    pub const HAN: Script = Script(Tag::from_bytes(b"Hani"));

    /// Create from an ISO 15924 code, normalizing case to `Xxxx`
    pub fn from_iso15924(code: &str) -> Option<Self> {
        let tag: Tag = code.parse().ok()?;
        let mut bytes = tag.to_bytes();
        bytes.make_ascii_lowercase();
        bytes[0] = bytes[0].to_ascii_uppercase();
        Some(Script(Tag::from_bytes(&bytes)))
    }

    /// The script tag
    pub fn tag(self) -> Tag {
        self.0
    }

    /// Natural horizontal direction of the script
    pub fn horizontal_direction(self) -> Direction {
        if RTL_SCRIPTS.contains(&self.0.to_bytes()) {
            Direction::RightToLeft
        } else {
            Direction::LeftToRight
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.0)
    }
}

/// Scripts written right-to-left
const RTL_SCRIPTS: &[[u8; 4]] = &[
    *b"Arab", *b"Hebr", *b"Syrc", *b"Thaa", *b"Nkoo", *b"Samr", *b"Mand",
    *b"Adlm", *b"Rohg", *b"Yezi", *b"Mend", *b"Khar", *b"Phnx", *b"Avst",
    *b"Armi", *b"Phli", *b"Prti", *b"Sarb", *b"Nbat", *b"Palm", *b"Hatr",
    *b"Mani", *b"Phlp", *b"Lydi", *b"Cprt", *b"Narb", *b"Orkh", *b"Sogd",
    *b"Sogo", *b"Elym", *b"Chrs", *b"Ougr",
];

/// BCP 47 language tag, lower-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    /// Create a language from a BCP 47 tag
    pub fn new(tag: &str) -> Self {
        Language(tag.trim().to_ascii_lowercase())
    }

    /// Tag as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction, script and language of a buffer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SegmentProperties {
    pub direction: Direction,
    pub script: Option<Script>,
    pub language: Option<Language>,
}

impl SegmentProperties {
    /// Fill an unset direction from the script, defaulting to left-to-right
    pub fn resolve_direction(&mut self) {
        if self.direction == Direction::Invalid {
            self.direction = self.script
                .map(Script::horizontal_direction)
                .unwrap_or(Direction::LeftToRight);
        }
    }
}
