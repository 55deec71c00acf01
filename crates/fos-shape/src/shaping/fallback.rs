//! Fallback shaper
//!
//! Maps every character to its nominal glyph and positions glyphs with the
//! font's advances. No substitution, no kerning, no mark positioning.
//! Accepts every font, so it terminates the default shaper order.

use crate::font::Font;
use crate::{Result, ShapeError};
use super::buffer::{Buffer, GlyphItem};
use super::plan::ShapePlanKey;

/// Plan state for the fallback shaper
#[derive(Debug, Clone, Copy)]
pub(crate) struct FallbackPlan {
    vertical: bool,
    backward: bool,
}

pub(crate) fn build(key: &ShapePlanKey) -> FallbackPlan {
    FallbackPlan {
        vertical: key.props.direction.is_vertical(),
        backward: key.props.direction.is_backward(),
    }
}

pub(crate) fn shape(plan: &FallbackPlan, font: &dyn Font, buffer: &mut Buffer) -> Result<()> {
    let mut glyphs = Vec::new();
    glyphs.try_reserve_exact(buffer.len())
        .map_err(|_| ShapeError::AllocationFailure)?;

    for item in buffer.items() {
        let (glyph_id, advance) = font.nominal_glyph_advance(item.codepoint, plan.vertical);
        let (x_advance, y_advance) = if plan.vertical {
            (0, advance)
        } else {
            (advance, 0)
        };

        glyphs.push(GlyphItem {
            codepoint: glyph_id,
            cluster: item.cluster,
            x_advance,
            y_advance,
            x_offset: 0,
            y_offset: 0,
        });
    }

    if plan.backward {
        glyphs.reverse();
    }

    buffer.replace_items(glyphs);
    Ok(())
}
