//! Text shaping module
//!
//! Shaper registry, shape plans and the plan cache, plus the buffer and
//! segment types they operate on.

mod buffer;
mod context;
mod fallback;
mod feature;
mod names;
#[cfg(feature = "ot")]
mod ot;
mod plan;
mod script;
mod shaper;
pub mod cache;

pub use buffer::{Buffer, ContentType, GlyphItem};
pub use cache::{PlanCacheStats, ShapePlanCache, DEFAULT_PLAN_CACHE_CAPACITY};
pub use context::{ShapeConfig, ShapeContext};
pub use feature::{feature_tags, feature_value_at, Feature, FEATURE_GLOBAL_END};
pub use names::{free_shaper_list, list_shapers, ShaperList};
pub use plan::{ShapePlan, ShapePlanKey};
pub use script::{Direction, Language, Script, SegmentProperties};
pub use shaper::{registry, ShaperEntry, ShaperKind, ShaperRegistry, SHAPER_LIST_ENV};
