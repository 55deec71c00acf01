//! User feature overrides
//!
//! A feature turns an OpenType feature on, off, or to an alternate index over
//! a range of clusters. When several features share a tag and their ranges
//! overlap, the one later in the list wins inside the overlap.

use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::str::FromStr;

use crate::tag::Tag;
use crate::ShapeError;

/// Range end meaning "to the end of the buffer"
pub const FEATURE_GLOBAL_END: u32 = u32::MAX;

/// OpenType feature setting applied over `[start, end)` clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Feature {
    pub tag: Tag,
    pub value: u32,
    pub start: u32,
    pub end: u32,
}

impl Feature {
    pub const LIGA: Tag = Tag::from_bytes(b"liga");
    pub const KERN: Tag = Tag::from_bytes(b"kern");
    pub const CALT: Tag = Tag::from_bytes(b"calt");
    pub const SMCP: Tag = Tag::from_bytes(b"smcp");

    /// Create a feature over a cluster range
    pub fn new(tag: Tag, value: u32, range: impl RangeBounds<u32>) -> Self {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => FEATURE_GLOBAL_END,
        };
        Self { tag, value, start, end }
    }

    /// Feature applied to the whole buffer
    pub fn global(tag: Tag, value: u32) -> Self {
        Self::new(tag, value, ..)
    }

    /// Applies to the whole buffer
    pub fn is_global(&self) -> bool {
        self.start == 0 && self.end == FEATURE_GLOBAL_END
    }

    /// Range with `start > end` collapsed to an empty range at `start`
    pub fn clamped(self) -> Self {
        Self {
            end: self.end.max(self.start),
            ..self
        }
    }

    /// Whether `cluster` falls in this feature's range
    pub fn contains(&self, cluster: u32) -> bool {
        self.start <= cluster && cluster < self.end
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == 0 {
            write!(f, "-")?;
        }
        write!(f, "{}", self.tag.to_string().trim_end())?;
        if !self.is_global() {
            write!(f, "[")?;
            if self.start != 0 {
                write!(f, "{}", self.start)?;
            }
            if self.end != self.start.saturating_add(1) {
                write!(f, ":")?;
                if self.end != FEATURE_GLOBAL_END {
                    write!(f, "{}", self.end)?;
                }
            }
            write!(f, "]")?;
        }
        if self.value > 1 {
            write!(f, "={}", self.value)?;
        }
        Ok(())
    }
}

impl FromStr for Feature {
    type Err = ShapeError;

    /// Parse the HarfBuzz feature syntax: `kern`, `-liga`, `+smcp`,
    /// `aalt=2`, `kern[3:5]`, `liga[2:]=0`, `'dlig'[5]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ShapeError::InvalidFeature(s.to_string());
        let mut rest = s.trim();

        let mut value = 1;
        if let Some(r) = rest.strip_prefix('-') {
            value = 0;
            rest = r;
        } else if let Some(r) = rest.strip_prefix('+') {
            rest = r;
        }

        let tag_end = rest.find(['[', '=']).unwrap_or(rest.len());
        let tag_text = rest[..tag_end].trim().trim_matches(|c| c == '\'' || c == '"');
        let tag: Tag = tag_text.parse().map_err(|_| invalid())?;
        rest = &rest[tag_end..];

        let (mut start, mut end): (u32, u32) = (0, FEATURE_GLOBAL_END);
        if let Some(r) = rest.strip_prefix('[') {
            let close = r.find(']').ok_or_else(invalid)?;
            let range = r[..close].trim();
            rest = &r[close + 1..];

            match range.split_once(':') {
                Some((from, to)) => {
                    if !from.trim().is_empty() {
                        start = from.trim().parse().map_err(|_| invalid())?;
                    }
                    if !to.trim().is_empty() {
                        end = to.trim().parse().map_err(|_| invalid())?;
                    }
                }
                None if range.is_empty() => {}
                None => {
                    start = range.parse().map_err(|_| invalid())?;
                    end = start.saturating_add(1);
                }
            }
        }

        if let Some(r) = rest.strip_prefix('=') {
            value = match r.trim() {
                "on" | "true" => 1,
                "off" | "false" => 0,
                number => number.parse().map_err(|_| invalid())?,
            };
        } else if !rest.trim().is_empty() {
            return Err(invalid());
        }

        Ok(Feature { tag, value, start, end })
    }
}

/// Value of `tag` at `cluster`, honouring last-wins precedence
pub fn feature_value_at(features: &[Feature], tag: Tag, cluster: u32) -> Option<u32> {
    features.iter()
        .rev()
        .find(|f| f.tag == tag && f.contains(cluster))
        .map(|f| f.value)
}

/// Sorted, de-duplicated feature tags; the feature part of a plan key
pub fn feature_tags(features: &[Feature]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = features.iter().map(|f| f.tag).collect();
    tags.sort_unstable();
    tags.dedup();
    tags
}
