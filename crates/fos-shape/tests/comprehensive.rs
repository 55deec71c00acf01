//! Comprehensive tests for fos-shape
//!
//! Plan resolution, caching and shaping through the public API.

use std::sync::{Arc, Barrier};
use std::thread;

use fos_shape::*;
use fos_shape::layout::split_into_lines;
use fos_shape::shaping::{feature_value_at, ShaperRegistry};

const SPACE: GlyphId = 3;

/// Every letter maps to glyph 1 with advance 10; space maps to glyph 3
/// with advance 10
struct GridFont {
    id: FaceId,
}

impl GridFont {
    fn new() -> Self {
        Self { id: FaceId::next() }
    }
}

impl Font for GridFont {
    fn face_id(&self) -> FaceId {
        self.id
    }

    fn variation_coords(&self) -> &[i16] {
        &[]
    }

    fn nominal_glyph(&self, c: char) -> Option<GlyphId> {
        match c {
            ' ' => Some(SPACE),
            c if c.is_alphabetic() => Some(1),
            _ => None,
        }
    }

    fn glyph_h_advance(&self, _glyph: GlyphId) -> i32 {
        10
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// SHAPER LIST
// ============================================================================

#[test]
fn test_list_shapers_ends_with_fallback() {
    let list = list_shapers();
    assert!(!list.is_empty());
    assert!(list.contains("fallback"));
    assert_eq!(list.as_slice().last(), Some(&None));
}

#[test]
fn test_list_shapers_shared() {
    let a = list_shapers();
    let b = list_shapers();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_list_shapers_concurrent() {
    let barrier = Barrier::new(8);
    let lists: Vec<Arc<ShaperList>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| {
                barrier.wait();
                list_shapers()
            }))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for list in &lists[1..] {
        assert!(Arc::ptr_eq(&lists[0], list));
    }
}

// ============================================================================
// SHAPING
// ============================================================================

#[test]
fn test_shape_full_produces_glyphs() {
    init_logging();
    let font = GridFont::new();
    let mut buffer = Buffer::from_text("ab c");

    assert!(shape_full(&font, &mut buffer, &[], None));
    assert_eq!(buffer.content_type(), ContentType::Glyphs);
    assert_eq!(buffer.len(), 4);

    let glyphs: Vec<u32> = buffer.items().iter().map(|g| g.codepoint).collect();
    assert_eq!(glyphs, vec![1, 1, SPACE, 1]);
    assert_eq!(buffer.advance_total(), 40);
}

#[test]
fn test_shape_clusters_are_byte_offsets() {
    let font = GridFont::new();
    let mut buffer = Buffer::from_text("aéb");

    shape(&font, &mut buffer, &[]);
    let clusters: Vec<u32> = buffer.items().iter().map(|g| g.cluster).collect();
    assert_eq!(clusters, vec![0, 1, 3]);
}

#[test]
fn test_shape_rtl_clusters_non_increasing() {
    let font = GridFont::new();
    let mut buffer = Buffer::from_text("abc def");
    buffer.set_direction(Direction::RightToLeft);

    assert!(shape_full(&font, &mut buffer, &[], Some(&["fallback"])));
    let clusters: Vec<u32> = buffer.items().iter().map(|g| g.cluster).collect();
    assert!(clusters.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(clusters.first(), Some(&6));
}

#[test]
fn test_shape_arabic_script_guesses_rtl() {
    let font = GridFont::new();
    let mut buffer = Buffer::from_text("abc");
    buffer.set_script(Script::ARABIC);

    shape(&font, &mut buffer, &[]);
    assert_eq!(buffer.direction(), Direction::RightToLeft);
}

#[test]
fn test_shape_with_features() {
    let font = GridFont::new();
    let mut buffer = Buffer::from_text("office");
    let features = [
        "liga".parse::<Feature>().unwrap(),
        "-kern[2:4]".parse::<Feature>().unwrap(),
    ];

    assert!(shape_full(&font, &mut buffer, &features, None));
    assert_eq!(buffer.content_type(), ContentType::Glyphs);
}

#[test]
fn test_shape_empty_shaper_list_fails() {
    let font = GridFont::new();
    let mut buffer = Buffer::from_text("abc");
    let before = buffer.clone();

    assert!(!shape_full(&font, &mut buffer, &[], Some(&[])));
    assert_eq!(buffer, before);
}

#[test]
fn test_shape_unknown_shapers_fail() {
    let font = GridFont::new();
    let mut buffer = Buffer::from_text("abc");

    let result = ShapeContext::new().try_shape_full(&font, &mut buffer, &[], Some(&["graphite", "coretext"]));
    assert!(matches!(result, Err(ShapeError::NoShaperAvailable)));
    assert_eq!(buffer.content_type(), ContentType::Text);
}

#[test]
fn test_shape_skips_unknown_then_falls_back() {
    let context = ShapeContext::new();
    let font = GridFont::new();
    let props = SegmentProperties {
        direction: Direction::LeftToRight,
        ..Default::default()
    };

    let plan = context.resolve_plan(&font, &props, &[], Some(&["graphite", "ot", "fallback"])).unwrap();
    // The synthetic font has no face data, so the OpenType shaper refuses it
    assert_eq!(plan.shaper_name(), "fallback");
}

// ============================================================================
// PLAN CACHE
// ============================================================================

#[test]
fn test_concurrent_resolve_builds_once() {
    let context = ShapeContext::new();
    let font = GridFont::new();
    let props = SegmentProperties {
        direction: Direction::LeftToRight,
        ..Default::default()
    };
    let barrier = Barrier::new(8);

    let plans: Vec<Arc<ShapePlan>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| {
                barrier.wait();
                context.resolve_plan(&font, &props, &[], None).unwrap()
            }))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for plan in &plans[1..] {
        assert!(Arc::ptr_eq(&plans[0], plan));
    }
    let stats = context.plan_cache().stats();
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.size, 1);
}

#[test]
fn test_eviction_spares_held_plan() {
    let context = ShapeContext::with_config(ShapeConfig::new().plan_cache_capacity(2));
    let props = SegmentProperties {
        direction: Direction::LeftToRight,
        ..Default::default()
    };
    let fonts: Vec<GridFont> = (0..4).map(|_| GridFont::new()).collect();

    let held = context.resolve_plan(&fonts[0], &props, &[], None).unwrap();
    for font in &fonts[1..] {
        context.resolve_plan(font, &props, &[], None).unwrap();
    }

    let cache = context.plan_cache();
    assert!(cache.contains(held.key()));
    assert_eq!(cache.len(), 2);
    assert!(cache.stats().evictions >= 2);

    // Still the same plan
    let again = context.resolve_plan(&fonts[0], &props, &[], None).unwrap();
    assert!(Arc::ptr_eq(&held, &again));
}

#[test]
fn test_feature_tags_share_plan() {
    let context = ShapeContext::new();
    let font = GridFont::new();
    let props = SegmentProperties {
        direction: Direction::LeftToRight,
        ..Default::default()
    };

    let on = [Feature::global(Feature::LIGA, 1)];
    let off = [Feature::global(Feature::LIGA, 0)];
    let a = context.resolve_plan(&font, &props, &on, None).unwrap();
    let b = context.resolve_plan(&font, &props, &off, None).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let c = context.resolve_plan(&font, &props, &[Feature::global(Feature::KERN, 1)], None).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn test_custom_registry() {
    let context = ShapeContext::new().with_registry(ShaperRegistry::with_preferred("fallback"));
    assert_eq!(context.registry().entry_at(0).map(|e| e.name), Some("fallback"));

    let font = GridFont::new();
    let mut buffer = Buffer::from_text("abc");
    assert!(context.shape_full(&font, &mut buffer, &[], None));
}

// ============================================================================
// FEATURES
// ============================================================================

#[test]
fn test_feature_precedence_overlap() {
    let tag: Tag = "test".parse().unwrap();
    let features = [
        Feature::new(tag, 1, 0..5),
        Feature::new(tag, 2, 3..8),
    ];

    assert_eq!(feature_value_at(&features, tag, 2), Some(1));
    assert_eq!(feature_value_at(&features, tag, 3), Some(2));
    assert_eq!(feature_value_at(&features, tag, 4), Some(2));
    assert_eq!(feature_value_at(&features, tag, 7), Some(2));
    assert_eq!(feature_value_at(&features, tag, 8), None);
}

// ============================================================================
// JUSTIFY
// ============================================================================

#[test]
fn test_justify_splits_lines() {
    let font = GridFont::new();
    // Cumulative advance reaches 130 at the third space
    let mut buffer = Buffer::from_text("abcd efgh ij ");

    let lines = justify(&font, &mut buffer, &[100], &[]);
    assert_eq!(buffer.content_type(), ContentType::Glyphs);
    assert_eq!(lines.len(), 2);

    let first = &lines[0];
    assert!(first.advance_total() <= 100);
    assert_eq!(first.items().last().map(|g| g.codepoint), Some(SPACE));
    assert_eq!(lines.iter().map(Buffer::len).sum::<usize>(), buffer.len());
}

#[test]
fn test_justify_matches_split() {
    let font = GridFont::new();
    let mut justified = Buffer::from_text("one two three four");
    let lines = justify(&font, &mut justified, &[80, 50], &[]);

    let mut shaped = Buffer::from_text("one two three four");
    shape(&font, &mut shaped, &[]);
    let split = split_into_lines(&shaped, &[80, 50], Some(SPACE)).unwrap();

    assert_eq!(lines, split);
}

#[test]
fn test_justify_rtl_lines_in_logical_order() {
    let font = GridFont::new();
    let mut buffer = Buffer::from_text("abc def");
    buffer.set_direction(Direction::RightToLeft);

    let lines = justify(&font, &mut buffer, &[40], &[]);
    let clusters: Vec<Vec<u32>> = lines.iter()
        .map(|l| l.items().iter().map(|g| g.cluster).collect())
        .collect();
    assert_eq!(clusters, vec![vec![3, 2, 1, 0], vec![6, 5, 4]]);
}

// ============================================================================
// OPENTYPE SHAPING
// ============================================================================

/// First Latin system font that loads; these tests skip without one
#[cfg(feature = "ot")]
fn system_font() -> Option<FaceFont> {
    const PATHS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    PATHS.iter()
        .filter_map(|path| std::fs::read(path).ok())
        .find_map(|data| FaceFont::from_data(data, 0).ok())
}

#[cfg(feature = "ot")]
fn shape_glyphs(font: &FaceFont, text: &str, features: &[Feature]) -> Vec<u32> {
    let mut buffer = Buffer::from_text(text);
    assert!(shape_full(font, &mut buffer, features, Some(&["ot"])));
    buffer.items().iter().map(|g| g.codepoint).collect()
}

#[cfg(feature = "ot")]
#[test]
fn test_ot_shaper_selected_for_real_font() {
    init_logging();
    let Some(font) = system_font() else { return };
    let context = ShapeContext::new();
    let mut buffer = Buffer::from_text("office hours");

    let props = SegmentProperties {
        direction: Direction::LeftToRight,
        ..Default::default()
    };
    let plan = context.resolve_plan(&font, &props, &[], Some(&["ot", "fallback"])).unwrap();
    assert_eq!(plan.shaper_name(), "ot");

    assert!(context.shape_full(&font, &mut buffer, &[], Some(&["ot", "fallback"])));
    assert_eq!(buffer.content_type(), ContentType::Glyphs);
    assert!(!buffer.is_empty());
    assert!(buffer.items().iter().all(|g| g.codepoint != 0));

    let clusters: Vec<u32> = buffer.items().iter().map(|g| g.cluster).collect();
    assert!(clusters.windows(2).all(|w| w[0] <= w[1]));
    assert!(buffer.advance_total() > 0);
}

#[cfg(feature = "ot")]
#[test]
fn test_ot_rtl_clusters_non_increasing() {
    let Some(font) = system_font() else { return };
    let mut buffer = Buffer::from_text("abc def");
    buffer.set_direction(Direction::RightToLeft);

    assert!(shape_full(&font, &mut buffer, &[], Some(&["ot"])));
    let clusters: Vec<u32> = buffer.items().iter().map(|g| g.cluster).collect();
    assert!(clusters.windows(2).all(|w| w[0] >= w[1]));
}

#[cfg(feature = "ot")]
#[test]
fn test_ot_later_feature_wins() {
    let Some(font) = system_font() else { return };
    let on = Feature::global(Feature::LIGA, 1);
    let off = Feature::global(Feature::LIGA, 0);

    assert_eq!(shape_glyphs(&font, "fi fl", &[off, on]), shape_glyphs(&font, "fi fl", &[on]));
    assert_eq!(shape_glyphs(&font, "fi fl", &[on, off]), shape_glyphs(&font, "fi fl", &[off]));

    // A later range overrides the global setting inside it
    let ranged = [on, Feature::new(Feature::LIGA, 0, 0..2)];
    let prefix_off = shape_glyphs(&font, "fi fl", &ranged);
    assert_eq!(prefix_off[..2], shape_glyphs(&font, "fi", &[off])[..]);
}

