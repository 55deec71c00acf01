//! Shape plans
//!
//! A plan records which shaper handles a (face, segment properties, feature
//! tags, variation coordinates, shaper order) combination together with the
//! shaper's precomputed state. Plans are immutable and shared through the
//! plan cache.

use crate::font::{FaceId, Font};
use crate::tag::Tag;
use crate::{Result, ShapeError};
use super::buffer::{Buffer, ContentType};
use super::fallback::{self, FallbackPlan};
use super::feature::{feature_tags, Feature};
use super::script::SegmentProperties;
use super::shaper::{ShaperEntry, ShaperRegistry};
#[cfg(feature = "ot")]
use super::ot::{self, OtPlan};

/// Everything that selects a shape plan
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapePlanKey {
    pub face_id: FaceId,
    pub props: SegmentProperties,
    /// Sorted, de-duplicated tags of the user features
    pub feature_tags: Vec<Tag>,
    /// Normalized variation coordinates of the font
    pub coords: Vec<i16>,
    /// Shapers to try, in order
    pub shapers: Vec<String>,
}

impl ShapePlanKey {
    /// Key for shaping with `font` under `props`
    pub fn new(
        font: &dyn Font,
        props: &SegmentProperties,
        features: &[Feature],
        shapers: Vec<String>,
    ) -> Self {
        Self {
            face_id: font.face_id(),
            props: props.clone(),
            feature_tags: feature_tags(features),
            coords: font.variation_coords().to_vec(),
            shapers,
        }
    }
}

/// Shaper-private precomputed state
#[derive(Debug)]
pub(crate) enum PlanState {
    #[cfg(feature = "ot")]
    Ot(OtPlan),
    Fallback(FallbackPlan),
}

/// Resolved, immutable shaping strategy
#[derive(Debug)]
pub struct ShapePlan {
    key: ShapePlanKey,
    shaper: &'static ShaperEntry,
    state: PlanState,
}

impl ShapePlan {
    /// Build an uncached plan: walk the key's shaper order and keep the
    /// first shaper in `registry` that accepts
    pub fn new(
        key: &ShapePlanKey,
        font: &dyn Font,
        registry: &ShaperRegistry,
    ) -> Result<Self> {
        for name in &key.shapers {
            let Some(entry) = registry.find(name) else {
                tracing::debug!("Shaper '{}' not available", name);
                continue;
            };

            match entry.kind.build(key, font) {
                Some(state) => {
                    tracing::debug!("Shaper '{}' accepted {:?}", entry.name, key.props);
                    return Ok(Self {
                        key: key.clone(),
                        shaper: entry,
                        state,
                    });
                }
                None => tracing::debug!("Shaper '{}' refused {:?}", entry.name, key.props),
            }
        }

        Err(ShapeError::NoShaperAvailable)
    }

    /// Key this plan was built for
    pub fn key(&self) -> &ShapePlanKey {
        &self.key
    }

    /// Name of the selected shaper
    pub fn shaper_name(&self) -> &'static str {
        self.shaper.name
    }

    /// Shape `buffer` with this plan's shaper
    ///
    /// The buffer must hold text and carry the plan's segment properties.
    /// Feature ranges are clamped, never rejected. On failure the buffer
    /// still holds text; the shaper is not swapped for another one.
    pub fn execute(&self, font: &dyn Font, buffer: &mut Buffer, features: &[Feature]) -> Result<()> {
        if buffer.content_type() != ContentType::Text {
            return Err(ShapeError::InvalidContent);
        }
        if buffer.props() != &self.key.props {
            return Err(ShapeError::PlanMismatch);
        }
        if buffer.is_empty() {
            buffer.set_content_type(ContentType::Glyphs);
            return Ok(());
        }

        let features: Vec<Feature> = features.iter().map(|f| f.clamped()).collect();

        let result = match &self.state {
            #[cfg(feature = "ot")]
            PlanState::Ot(plan) => ot::shape(plan, font, buffer, &features),
            PlanState::Fallback(plan) => fallback::shape(plan, font, buffer),
        };

        match result {
            Ok(()) => {
                buffer.set_content_type(ContentType::Glyphs);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Shaper '{}' failed: {}", self.shaper.name, e);
                Err(e)
            }
        }
    }
}
