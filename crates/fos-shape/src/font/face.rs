//! Font face backed by ttf-parser
//!
//! Owns the font bytes behind an `Arc` so fonts can be cloned cheaply and
//! shared across shaping threads.

use std::fmt;
use std::sync::Arc;

use ttf_parser::Face;

use super::{FaceData, FaceId, Font, GlyphId, Variation};
use crate::{Result, ShapeError};

/// Parsed font face with variation settings applied
#[derive(Clone)]
pub struct FaceFont {
    data: Arc<[u8]>,
    index: u32,
    /// Identity shared by all variation instances of this face
    id: FaceId,
    variations: Vec<Variation>,
    coords: Vec<i16>,
}

impl FaceFont {
    /// Load a face from font data
    pub fn from_data(data: impl Into<Arc<[u8]>>, index: u32) -> Result<Self> {
        let data = data.into();
        let face = Face::parse(&data, index)
            .map_err(|e| ShapeError::FontParsing(e.to_string()))?;
        let coords = vec![0; face.variation_axes().len() as usize];

        Ok(Self {
            data,
            index,
            id: FaceId::next(),
            variations: Vec::new(),
            coords,
        })
    }

    /// Same face at a different point in its design space
    ///
    /// Settings for axes the face doesn't have are dropped.
    pub fn with_variations(&self, variations: &[Variation]) -> Result<Self> {
        let mut face = Face::parse(&self.data, self.index)
            .map_err(|e| ShapeError::FontParsing(e.to_string()))?;

        let mut applied = Vec::with_capacity(variations.len());
        for variation in variations {
            match face.set_variation(ttf_parser::Tag(variation.tag.0), variation.value) {
                Some(()) => applied.push(*variation),
                None => tracing::debug!("Face has no '{}' axis, ignoring", variation.tag),
            }
        }

        let coords = face.variation_coordinates()
            .iter()
            .map(|c| c.get())
            .collect();

        Ok(Self {
            data: Arc::clone(&self.data),
            index: self.index,
            id: self.id,
            variations: applied,
            coords,
        })
    }

    /// Axis settings in effect
    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    /// Units per em
    pub fn units_per_em(&self) -> u16 {
        self.face().map(|f| f.units_per_em()).unwrap_or(1000)
    }

    /// Parse the face with this font's variations applied
    fn face(&self) -> Option<Face<'_>> {
        #[cfg(test)]
        PARSES.with(|n| n.set(n.get() + 1));

        let mut face = Face::parse(&self.data, self.index).ok()?;
        for variation in &self.variations {
            face.set_variation(ttf_parser::Tag(variation.tag.0), variation.value);
        }
        Some(face)
    }
}

#[cfg(test)]
thread_local! {
    static PARSES: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

fn h_advance(face: &Face<'_>, glyph: GlyphId) -> i32 {
    let Ok(glyph) = u16::try_from(glyph) else { return 0 };
    face.glyph_hor_advance(ttf_parser::GlyphId(glyph)).map_or(0, i32::from)
}

fn v_advance(face: &Face<'_>, glyph: GlyphId) -> i32 {
    let Ok(glyph) = u16::try_from(glyph) else { return 0 };

    match face.glyph_ver_advance(ttf_parser::GlyphId(glyph)) {
        Some(advance) => -i32::from(advance),
        None => -(i32::from(face.ascender()) - i32::from(face.descender())),
    }
}

impl Font for FaceFont {
    fn face_id(&self) -> FaceId {
        self.id
    }

    fn variation_coords(&self) -> &[i16] {
        &self.coords
    }

    fn nominal_glyph(&self, c: char) -> Option<GlyphId> {
        self.face()?.glyph_index(c).map(|g| GlyphId::from(g.0))
    }

    fn glyph_h_advance(&self, glyph: GlyphId) -> i32 {
        self.face().map_or(0, |f| h_advance(&f, glyph))
    }

    fn glyph_v_advance(&self, glyph: GlyphId) -> i32 {
        self.face().map_or(0, |f| v_advance(&f, glyph))
    }

    fn nominal_glyph_advance(&self, codepoint: u32, vertical: bool) -> (GlyphId, i32) {
        let Some(face) = self.face() else { return (0, 0) };

        let glyph = char::from_u32(codepoint)
            .and_then(|c| face.glyph_index(c))
            .map_or(0, |g| GlyphId::from(g.0));
        let advance = if vertical {
            v_advance(&face, glyph)
        } else {
            h_advance(&face, glyph)
        };
        (glyph, advance)
    }

    fn face_data(&self) -> Option<FaceData<'_>> {
        Some(FaceData {
            data: &self.data,
            index: self.index,
            variations: &self.variations,
        })
    }
}

impl fmt::Debug for FaceFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceFont")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("bytes", &self.data.len())
            .field("variations", &self.variations)
            .finish()
    }
}
