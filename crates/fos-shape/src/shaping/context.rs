//! Shaping context
//!
//! Ties the shaper registry and a plan cache together and exposes the
//! shape/justify entry points. The process-wide context backs the free
//! functions in the crate root; separate contexts get their own caches.

use std::sync::{Arc, OnceLock};

use crate::font::Font;
use crate::layout::{justify_line, split_into_lines, target_length};
use crate::Result;
use super::buffer::Buffer;
use super::cache::{ShapePlanCache, DEFAULT_PLAN_CACHE_CAPACITY};
use super::feature::Feature;
use super::names::list_shapers;
use super::plan::{ShapePlan, ShapePlanKey};
use super::script::SegmentProperties;
use super::shaper::{registry, ShaperRegistry};

/// Shaping configuration
#[derive(Debug, Clone)]
pub struct ShapeConfig {
    /// Maximum number of unused plans kept in the plan cache
    pub plan_cache_capacity: usize,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            plan_cache_capacity: DEFAULT_PLAN_CACHE_CAPACITY,
        }
    }
}

impl ShapeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set plan cache capacity
    pub fn plan_cache_capacity(mut self, capacity: usize) -> Self {
        self.plan_cache_capacity = capacity;
        self
    }
}

/// Plan cache plus shaper registry
#[derive(Debug)]
pub struct ShapeContext {
    plans: ShapePlanCache,
    /// `None` uses the process registry and its shared name list
    registry: Option<ShaperRegistry>,
}

impl Default for ShapeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeContext {
    /// Create a context with default configuration
    pub fn new() -> Self {
        Self::with_config(ShapeConfig::default())
    }

    /// Create with specific configuration
    pub fn with_config(config: ShapeConfig) -> Self {
        Self {
            plans: ShapePlanCache::new(config.plan_cache_capacity),
            registry: None,
        }
    }

    /// Use `registry` instead of the process registry
    pub fn with_registry(mut self, registry: ShaperRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Process-wide context
    pub fn global() -> &'static ShapeContext {
        static GLOBAL: OnceLock<ShapeContext> = OnceLock::new();
        GLOBAL.get_or_init(ShapeContext::new)
    }

    pub fn registry(&self) -> &ShaperRegistry {
        self.registry.as_ref().unwrap_or_else(|| registry())
    }

    pub fn plan_cache(&self) -> &ShapePlanCache {
        &self.plans
    }

    fn default_shapers(&self) -> Vec<String> {
        match &self.registry {
            Some(registry) => registry.iter().map(|e| e.name.to_string()).collect(),
            None => list_shapers().to_vec(),
        }
    }

    /// Cached plan for shaping with `font` under `props`
    ///
    /// `shapers` gives the shapers to try in order; `None` means the
    /// registry's default order.
    pub fn resolve_plan(
        &self,
        font: &dyn Font,
        props: &SegmentProperties,
        features: &[Feature],
        shapers: Option<&[&str]>,
    ) -> Result<Arc<ShapePlan>> {
        let shapers = match shapers {
            Some(list) => list.iter().map(|s| s.to_string()).collect(),
            None => self.default_shapers(),
        };
        let key = ShapePlanKey::new(font, props, features, shapers);

        self.plans.get_or_create(&key, |key| ShapePlan::new(key, font, self.registry()))
    }

    /// Shape `buffer`, reporting why it failed if it did
    ///
    /// Guessed segment properties are only written back when shaping
    /// succeeds; on failure the buffer is left exactly as it was.
    pub fn try_shape_full(
        &self,
        font: &dyn Font,
        buffer: &mut Buffer,
        features: &[Feature],
        shapers: Option<&[&str]>,
    ) -> Result<()> {
        let mut props = buffer.props().clone();
        props.resolve_direction();
        let plan = self.resolve_plan(font, &props, features, shapers)?;

        let original = std::mem::replace(buffer.props_mut(), props);
        let result = plan.execute(font, buffer, features);
        if result.is_err() {
            buffer.set_props(original);
        }
        result
    }

    /// Shape `buffer` with the given shapers (or the default order)
    ///
    /// Returns `false` if no shaper could be selected or the selected
    /// shaper failed.
    pub fn shape_full(
        &self,
        font: &dyn Font,
        buffer: &mut Buffer,
        features: &[Feature],
        shapers: Option<&[&str]>,
    ) -> bool {
        match self.try_shape_full(font, buffer, features, shapers) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Shaping failed: {}", e);
                false
            }
        }
    }

    /// Shape `buffer` with the default shaper order
    pub fn shape(&self, font: &dyn Font, buffer: &mut Buffer, features: &[Feature]) {
        self.shape_full(font, buffer, features, None);
    }

    /// Shape `buffer` and split the result into lines of `target_lengths`
    ///
    /// Lines are broken after the font's space glyph. With no target
    /// lengths nothing happens: the buffer is not even shaped.
    pub fn justify(
        &self,
        font: &dyn Font,
        buffer: &mut Buffer,
        target_lengths: &[i32],
        features: &[Feature],
    ) -> Vec<Buffer> {
        if target_lengths.is_empty() {
            return Vec::new();
        }

        // First pass: ordinary shaping
        self.shape_full(font, buffer, features, None);

        let space = font.nominal_glyph(' ');
        let mut lines = match split_into_lines(buffer, target_lengths, space) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("Cannot split buffer into lines: {}", e);
                return Vec::new();
            }
        };

        for (index, line) in lines.iter_mut().enumerate() {
            if let Some(target) = target_length(target_lengths, index) {
                justify_line(line, target);
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FaceId, GlyphId};
    use crate::shaping::{ContentType, Direction};
    use crate::ShapeError;

    struct TestFont(FaceId);

    impl Font for TestFont {
        fn face_id(&self) -> FaceId {
            self.0
        }

        fn variation_coords(&self) -> &[i16] {
            &[]
        }

        fn nominal_glyph(&self, c: char) -> Option<GlyphId> {
            Some(c as u32)
        }

        fn glyph_h_advance(&self, _glyph: GlyphId) -> i32 {
            10
        }
    }

    #[test]
    fn test_config_builder() {
        let config = ShapeConfig::new().plan_cache_capacity(3);
        let context = ShapeContext::with_config(config);
        assert_eq!(context.plan_cache().capacity(), 3);
    }

    #[test]
    fn test_resolve_reuses_plan() {
        let context = ShapeContext::new();
        let font = TestFont(FaceId::next());
        let props = SegmentProperties {
            direction: Direction::LeftToRight,
            ..Default::default()
        };

        let a = context.resolve_plan(&font, &props, &[], None).unwrap();
        let b = context.resolve_plan(&font, &props, &[], None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(context.plan_cache().stats().builds, 1);
    }

    #[test]
    fn test_empty_shaper_list_fails() {
        let context = ShapeContext::new();
        let font = TestFont(FaceId::next());
        let mut buffer = Buffer::from_text("abc");

        let result = context.try_shape_full(&font, &mut buffer, &[], Some(&[]));
        assert!(matches!(result, Err(ShapeError::NoShaperAvailable)));
        assert_eq!(buffer.content_type(), ContentType::Text);
    }

    #[test]
    fn test_failed_resolve_leaves_props() {
        let context = ShapeContext::new();
        let font = TestFont(FaceId::next());
        let mut buffer = Buffer::from_text("abc");
        let before = buffer.clone();

        assert!(context.try_shape_full(&font, &mut buffer, &[], Some(&[])).is_err());
        assert_eq!(buffer.direction(), Direction::Invalid);
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_failed_execute_restores_props() {
        let context = ShapeContext::new();
        let font = TestFont(FaceId::next());
        let mut buffer = Buffer::from_text("abc");
        buffer.set_content_type(ContentType::Glyphs);
        let before = buffer.clone();

        let result = context.try_shape_full(&font, &mut buffer, &[], None);
        assert!(matches!(result, Err(ShapeError::InvalidContent)));
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_empty_registry_fails() {
        let context = ShapeContext::new().with_registry(ShaperRegistry::empty());
        let font = TestFont(FaceId::next());
        let mut buffer = Buffer::from_text("abc");

        assert!(!context.shape_full(&font, &mut buffer, &[], None));
        assert_eq!(buffer.content_type(), ContentType::Text);
    }

    #[test]
    fn test_shape_guesses_direction() {
        let context = ShapeContext::new();
        let font = TestFont(FaceId::next());
        let mut buffer = Buffer::from_text("abc");

        context.shape(&font, &mut buffer, &[]);
        assert_eq!(buffer.direction(), Direction::LeftToRight);
        assert_eq!(buffer.content_type(), ContentType::Glyphs);
    }
}
