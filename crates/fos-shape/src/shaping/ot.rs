//! OpenType shaper using rustybuzz
//!
//! Accepts fonts that expose face data rustybuzz can parse. Segment
//! properties are converted once, at plan build time. Keys without user
//! features also get a compiled rustybuzz plan, since their feature values
//! can't vary between calls. The face itself is re-parsed on every execute
//! since it borrows the caller's font bytes.

use std::fmt;
use std::str::FromStr;

use rustybuzz::{Face, UnicodeBuffer};

use crate::font::{FaceData, Font};
use crate::tag::Tag;
use crate::{Result, ShapeError};
use super::buffer::{Buffer, GlyphItem};
use super::feature::Feature;
use super::plan::ShapePlanKey;
use super::script::Direction;

const SHAPER_NAME: &str = "ot";

/// Plan state for the OpenType shaper
pub(crate) struct OtPlan {
    direction: rustybuzz::Direction,
    script: Option<rustybuzz::Script>,
    language: Option<rustybuzz::Language>,
    /// Compiled plan for calls without user features
    compiled: Option<rustybuzz::ShapePlan>,
}

impl OtPlan {
    pub(crate) fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }
}

impl fmt::Debug for OtPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtPlan")
            .field("direction", &self.direction)
            .field("script", &self.script)
            .field("language", &self.language)
            .field("compiled", &self.compiled.is_some())
            .finish()
    }
}

impl From<Direction> for rustybuzz::Direction {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Invalid => rustybuzz::Direction::Invalid,
            Direction::LeftToRight => rustybuzz::Direction::LeftToRight,
            Direction::RightToLeft => rustybuzz::Direction::RightToLeft,
            Direction::TopToBottom => rustybuzz::Direction::TopToBottom,
            Direction::BottomToTop => rustybuzz::Direction::BottomToTop,
        }
    }
}

fn rb_tag(tag: Tag) -> rustybuzz::ttf_parser::Tag {
    rustybuzz::ttf_parser::Tag(tag.0)
}

/// Parse the face and apply the font's variations
fn load_face<'a>(data: &FaceData<'a>) -> Option<Face<'a>> {
    let mut face = Face::from_slice(data.data, data.index)?;
    if !data.variations.is_empty() {
        let variations: Vec<rustybuzz::Variation> = data.variations.iter()
            .map(|v| rustybuzz::Variation { tag: rb_tag(v.tag), value: v.value })
            .collect();
        face.set_variations(&variations);
    }
    Some(face)
}

/// Features for rustybuzz, in input order so later ones keep precedence
fn rb_features(features: &[Feature]) -> Vec<rustybuzz::Feature> {
    features.iter()
        .map(|f| rustybuzz::Feature {
            tag: rb_tag(f.tag),
            value: f.value,
            start: f.start,
            end: f.end,
        })
        .collect()
}

/// Accept the key if the font's face data parses
pub(crate) fn build(key: &ShapePlanKey, font: &dyn Font) -> Option<OtPlan> {
    let data = font.face_data()?;
    let face = load_face(&data)?;

    // Scripts rustybuzz doesn't know are left for it to guess from the text
    let script = key.props.script
        .and_then(|s| rustybuzz::Script::from_iso15924_tag(rb_tag(s.tag())));
    let language = key.props.language
        .as_ref()
        .and_then(|l| rustybuzz::Language::from_str(l.as_str()).ok());
    let direction: rustybuzz::Direction = key.props.direction.into();

    // A compiled plan must agree with what rustybuzz would guess for the
    // buffer, so both direction and script have to be known up front
    let compiled = match script {
        Some(script) if key.feature_tags.is_empty() && direction != rustybuzz::Direction::Invalid => {
            Some(rustybuzz::ShapePlan::new(&face, direction, Some(script), language.as_ref(), &[]))
        }
        _ => None,
    };

    Some(OtPlan {
        direction,
        script,
        language,
        compiled,
    })
}

pub(crate) fn shape(
    plan: &OtPlan,
    font: &dyn Font,
    buffer: &mut Buffer,
    features: &[Feature],
) -> Result<()> {
    let failed = || ShapeError::BackendShapeFailure { shaper: SHAPER_NAME };

    let data = font.face_data().ok_or_else(failed)?;
    let face = load_face(&data).ok_or_else(failed)?;

    let mut input = UnicodeBuffer::new();
    for item in buffer.items() {
        let c = char::from_u32(item.codepoint).unwrap_or(char::REPLACEMENT_CHARACTER);
        input.add(c, item.cluster);
    }
    input.set_direction(plan.direction);
    if let Some(script) = plan.script {
        input.set_script(script);
    }
    if let Some(language) = &plan.language {
        input.set_language(language.clone());
    }

    let output = match &plan.compiled {
        Some(compiled) if features.is_empty() => rustybuzz::shape_with_plan(&face, compiled, input),
        _ => rustybuzz::shape(&face, &rb_features(features), input),
    };

    let glyphs: Vec<GlyphItem> = output.glyph_infos().iter()
        .zip(output.glyph_positions())
        .map(|(info, pos)| GlyphItem {
            codepoint: info.glyph_id,
            cluster: info.cluster,
            x_advance: pos.x_advance,
            y_advance: pos.y_advance,
            x_offset: pos.x_offset,
            y_offset: pos.y_offset,
        })
        .collect();

    buffer.replace_items(glyphs);
    Ok(())
}
