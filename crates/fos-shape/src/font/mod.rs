//! Font access for shaping
//!
//! The shaping core only needs a face identity, the normalized variation
//! coordinates and a codepoint to nominal glyph mapping. Backends that shape
//! from the font file itself additionally read the raw face data.

mod face;
pub mod variable;

use std::sync::atomic::{AtomicU64, Ordering};

pub use face::FaceFont;
pub use variable::{Variation, axis_tags};

/// Glyph index in a font
pub type GlyphId = u32;

/// Identity of a font face, shared by every font created from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub u64);

impl FaceId {
    /// Mint an identity no other face in this process has
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        FaceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Raw face data for backends that parse the font themselves
#[derive(Debug, Clone, Copy)]
pub struct FaceData<'a> {
    /// sfnt bytes
    pub data: &'a [u8],
    /// Face index in a collection
    pub index: u32,
    /// Axis settings in user units
    pub variations: &'a [Variation],
}

/// A font as seen by the shaping core
pub trait Font {
    /// Face identity; part of every shape plan key
    fn face_id(&self) -> FaceId;

    /// Normalized (F2Dot14) variation coordinates, one per axis
    fn variation_coords(&self) -> &[i16];

    /// Nominal glyph for a character, if the font maps it
    fn nominal_glyph(&self, c: char) -> Option<GlyphId>;

    /// Horizontal advance in font units
    fn glyph_h_advance(&self, glyph: GlyphId) -> i32;

    /// Vertical advance in font units (negative for downward)
    fn glyph_v_advance(&self, glyph: GlyphId) -> i32 {
        -self.glyph_h_advance(glyph)
    }

    /// Nominal glyph for `codepoint` (0 when unmapped) and its advance
    /// along the vertical or horizontal axis
    fn nominal_glyph_advance(&self, codepoint: u32, vertical: bool) -> (GlyphId, i32) {
        let glyph = char::from_u32(codepoint)
            .and_then(|c| self.nominal_glyph(c))
            .unwrap_or(0);
        let advance = if vertical {
            self.glyph_v_advance(glyph)
        } else {
            self.glyph_h_advance(glyph)
        };
        (glyph, advance)
    }

    /// Raw face data, when available
    fn face_data(&self) -> Option<FaceData<'_>> {
        None
    }
}

/// Well-known locations of a Latin system font
#[cfg(test)]
pub(crate) const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// First system font that loads; tests needing real outlines skip without one
#[cfg(test)]
pub(crate) fn system_font() -> Option<FaceFont> {
    SYSTEM_FONT_PATHS.iter()
        .filter_map(|path| std::fs::read(path).ok())
        .find_map(|data| FaceFont::from_data(data, 0).ok())
}
