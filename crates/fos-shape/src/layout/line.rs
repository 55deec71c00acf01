//! Line splitting for justification
//!
//! Partitions an already shaped buffer into lines at word boundaries. Lines
//! are only split here; stretching each line to its target is not done yet.

use std::borrow::Cow;
use std::ops::Range;

use crate::font::GlyphId;
use crate::shaping::{Buffer, ContentType, Direction, GlyphItem};
use crate::{Result, ShapeError};

/// Target length for line `index`; the last target repeats
pub fn target_length(target_lengths: &[i32], index: usize) -> Option<i32> {
    target_lengths.get(index).or(target_lengths.last()).copied()
}

/// Split a shaped buffer into lines no longer than their target lengths
///
/// Line `n` is measured against `target_lengths[n]`, reusing the last
/// target once they run out. When a glyph would push the line past its
/// target, the line ends after the most recent `break_glyph` in it. A word
/// with no earlier break in its line overflows and the line ends at the
/// next `break_glyph` instead. With no `break_glyph` the whole buffer is
/// one line.
///
/// Lines come out in logical order. For backward directions the buffer is
/// walked from its visual end, and each line keeps its glyphs in visual
/// order.
///
/// Returns no lines, and leaves `buffer` untouched, when `target_lengths`
/// is empty.
pub fn split_into_lines(
    buffer: &Buffer,
    target_lengths: &[i32],
    break_glyph: Option<GlyphId>,
) -> Result<Vec<Buffer>> {
    if target_lengths.is_empty() {
        return Ok(Vec::new());
    }
    if buffer.content_type() != ContentType::Glyphs {
        return Err(ShapeError::InvalidContent);
    }

    let direction = buffer.direction();
    let backward = direction.is_backward();
    let items: Cow<'_, [GlyphItem]> = if backward {
        Cow::Owned(buffer.items().iter().rev().copied().collect())
    } else {
        Cow::Borrowed(buffer.items())
    };

    let lines: Vec<Buffer> = line_ranges(&items, target_lengths, break_glyph, direction)
        .into_iter()
        .map(|range| {
            let mut line = buffer.sub_buffer(&items[range]);
            if backward {
                line.reverse();
            }
            line
        })
        .collect();

    tracing::debug!("Split {} glyphs into {} lines", items.len(), lines.len());
    Ok(lines)
}

/// Line boundaries over `items` in logical order
fn line_ranges(
    items: &[GlyphItem],
    target_lengths: &[i32],
    break_glyph: Option<GlyphId>,
    direction: Direction,
) -> Vec<Range<usize>> {
    let is_break = |i: usize| break_glyph == Some(items[i].codepoint);

    let mut ranges = Vec::new();
    let mut start = 0;
    let mut width: i64 = 0;
    let mut last_break: Option<usize> = None;
    let mut i = 0;

    while i < items.len() {
        let target = i64::from(target_length(target_lengths, ranges.len()).unwrap_or(i32::MAX));
        let advance = i64::from(items[i].advance(direction));

        if width + advance > target && i > start {
            if let Some(at) = last_break {
                ranges.push(start..at + 1);
                start = at + 1;
                width = items[start..i].iter().map(|g| i64::from(g.advance(direction))).sum();
                last_break = None;
                // Measure the current glyph again against the next target
                continue;
            }
        }

        width += advance;

        if is_break(i) {
            if width > target {
                // Overflowing word ends here
                ranges.push(start..i + 1);
                start = i + 1;
                width = 0;
                last_break = None;
            } else {
                last_break = Some(i);
            }
        }

        i += 1;
    }

    if start < items.len() {
        ranges.push(start..items.len());
    }
    ranges
}

/// Fit a line's advances to its target length
// TODO: distribute the difference to `target` over the line's break glyphs
// (stretch) or tighten them (compress); lines are left as split for now.
pub fn justify_line(_line: &mut Buffer, _target: i32) {}
