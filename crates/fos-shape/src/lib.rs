//! fOS Shape - Shape Plan Engine
//!
//! This crate decides how text gets shaped for the fOS browser engine:
//! - Shaper registry and the shared shaper name list
//! - Shape plan resolution with fallback across shapers
//! - Thread-safe plan cache (build-once, LRU eviction of unused plans)
//! - OpenType shaping (rustybuzz - HarfBuzz port) and a nominal fallback
//! - Line splitting for justification

pub mod font;
pub mod shaping;
pub mod layout;
pub mod tag;

pub use font::{FaceFont, FaceId, Font, GlyphId, Variation};
pub use shaping::{
    Buffer, ContentType, Direction, Feature, GlyphItem, Language, Script, SegmentProperties,
    ShapeConfig, ShapeContext, ShapePlan, ShapePlanCache, ShapePlanKey, ShaperList,
};
pub use tag::Tag;

/// Shaping error types
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("No shaper accepted the plan")]
    NoShaperAvailable,

    #[error("Allocation failed")]
    AllocationFailure,

    #[error("Shaper '{shaper}' failed to shape the buffer")]
    BackendShapeFailure { shaper: &'static str },

    #[error("Buffer does not hold text")]
    InvalidContent,

    #[error("Buffer properties do not match the shape plan")]
    PlanMismatch,

    #[error("Invalid feature: {0}")]
    InvalidFeature(String),

    #[error("Invalid variation: {0}")]
    InvalidVariation(String),

    #[error("Failed to parse font: {0}")]
    FontParsing(String),
}

pub type Result<T> = std::result::Result<T, ShapeError>;

/// Names of the available shapers, in default precedence order
pub fn list_shapers() -> std::sync::Arc<ShaperList> {
    shaping::list_shapers()
}

/// Shape `buffer` with the default shaper order
pub fn shape(font: &dyn Font, buffer: &mut Buffer, features: &[Feature]) {
    ShapeContext::global().shape(font, buffer, features);
}

/// Shape `buffer`, trying `shapers` in order (`None` for the default order)
///
/// Returns `false` if nothing could shape the buffer; it then still holds
/// text.
pub fn shape_full(
    font: &dyn Font,
    buffer: &mut Buffer,
    features: &[Feature],
    shapers: Option<&[&str]>,
) -> bool {
    ShapeContext::global().shape_full(font, buffer, features, shapers)
}

/// Shape `buffer` and split it into lines of `target_lengths`
pub fn justify(
    font: &dyn Font,
    buffer: &mut Buffer,
    target_lengths: &[i32],
    features: &[Feature],
) -> Vec<Buffer> {
    ShapeContext::global().justify(font, buffer, target_lengths, features)
}

/// Release process-wide state: the shaper name list and cached plans
///
/// Plans still held by callers stay valid. Later calls rebuild what they
/// need.
pub fn shutdown() {
    shaping::free_shaper_list();
    ShapeContext::global().plan_cache().clear();
    tracing::debug!("Shaping state released");
}
