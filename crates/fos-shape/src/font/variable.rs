//! Variable Fonts Support
//!
//! Design-space axis settings for OpenType variable fonts. Settings are
//! given in user units (e.g. `wght=700`); the font turns them into the
//! normalized coordinates that take part in shape plan keys.

use std::fmt;
use std::str::FromStr;

use crate::tag::Tag;
use crate::ShapeError;

/// Common registered axis tags
pub mod axis_tags {
    use crate::tag::Tag;

    pub const WEIGHT: Tag = Tag::from_bytes(b"wght");
    pub const WIDTH: Tag = Tag::from_bytes(b"wdth");
    pub const SLANT: Tag = Tag::from_bytes(b"slnt");
    pub const ITALIC: Tag = Tag::from_bytes(b"ital");
    pub const OPTICAL_SIZE: Tag = Tag::from_bytes(b"opsz");
}

/// Value for one variation axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variation {
    /// Axis tag (e.g., "wght", "wdth", "slnt")
    pub tag: Tag,
    /// Axis value in user units
    pub value: f32,
}

impl Variation {
    pub fn new(tag: Tag, value: f32) -> Self {
        Self { tag, value }
    }

    /// Whether this is a registered OpenType axis
    pub fn is_registered(&self) -> bool {
        matches!(self.tag,
            axis_tags::WEIGHT |
            axis_tags::WIDTH |
            axis_tags::SLANT |
            axis_tags::ITALIC |
            axis_tags::OPTICAL_SIZE
        )
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag.to_string().trim_end(), self.value)
    }
}

impl FromStr for Variation {
    type Err = ShapeError;

    /// Parse `tag=value`, e.g. `wght=700`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ShapeError::InvalidVariation(s.to_string());

        let (tag, value) = s.split_once('=').ok_or_else(invalid)?;
        let tag: Tag = tag.trim().trim_matches(|c| c == '\'' || c == '"')
            .parse()
            .map_err(|_| invalid())?;
        let value: f32 = value.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }

        Ok(Variation { tag, value })
    }
}
