//! Shaper registry
//!
//! The set of shaping backends compiled into this build, in default
//! precedence order. The set is closed: backends are variants of
//! [`ShaperKind`], never loaded at runtime.

use std::env;
use std::sync::OnceLock;

use crate::font::Font;
use super::plan::{PlanState, ShapePlanKey};
use super::fallback;
#[cfg(feature = "ot")]
use super::ot;

/// Environment variable that reorders the default shaper list
pub const SHAPER_LIST_ENV: &str = "FOS_SHAPER_LIST";

/// Shaping backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaperKind {
    /// OpenType layout via rustybuzz
    #[cfg(feature = "ot")]
    Ot,
    /// Nominal glyphs and advances only; accepts every font
    Fallback,
}

impl ShaperKind {
    /// Registry name
    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "ot")]
            ShaperKind::Ot => "ot",
            ShaperKind::Fallback => "fallback",
        }
    }

    /// Ask the backend to accept `key`, producing its plan state
    ///
    /// `None` means the backend refuses this combination.
    pub(crate) fn build(self, key: &ShapePlanKey, font: &dyn Font) -> Option<PlanState> {
        match self {
            #[cfg(feature = "ot")]
            ShaperKind::Ot => ot::build(key, font).map(PlanState::Ot),
            ShaperKind::Fallback => Some(PlanState::Fallback(fallback::build(key))),
        }
    }
}

/// Registered shaper
#[derive(Debug, PartialEq, Eq)]
pub struct ShaperEntry {
    pub name: &'static str,
    pub kind: ShaperKind,
}

#[cfg(feature = "ot")]
static SHAPERS: [ShaperEntry; 2] = [
    ShaperEntry { name: "ot", kind: ShaperKind::Ot },
    ShaperEntry { name: "fallback", kind: ShaperKind::Fallback },
];

#[cfg(not(feature = "ot"))]
static SHAPERS: [ShaperEntry; 1] = [
    ShaperEntry { name: "fallback", kind: ShaperKind::Fallback },
];

/// Ordered, read-only list of available shapers
#[derive(Debug, Clone)]
pub struct ShaperRegistry {
    entries: Vec<&'static ShaperEntry>,
}

impl ShaperRegistry {
    /// All compiled-in shapers in default order
    pub fn compiled() -> Self {
        Self {
            entries: SHAPERS.iter().collect(),
        }
    }

    /// Compiled-in shapers with those named in `list` (comma separated)
    /// moved to the front in the given order. Unknown names are ignored.
    pub fn with_preferred(list: &str) -> Self {
        let mut entries: Vec<&'static ShaperEntry> = Vec::with_capacity(SHAPERS.len());

        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match SHAPERS.iter().find(|e| e.name == name) {
                Some(entry) if !entries.contains(&entry) => entries.push(entry),
                Some(_) => {}
                None => tracing::debug!("Unknown shaper '{}' in {}", name, SHAPER_LIST_ENV),
            }
        }

        for entry in SHAPERS.iter() {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }

        Self { entries }
    }

    /// Registry with no shapers; every resolution fails
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Number of shapers
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Shaper at position `index`
    pub fn entry_at(&self, index: usize) -> Option<&'static ShaperEntry> {
        self.entries.get(index).copied()
    }

    /// Shaper by name
    pub fn find(&self, name: &str) -> Option<&'static ShaperEntry> {
        self.entries.iter().copied().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ShaperEntry> + '_ {
        self.entries.iter().copied()
    }
}

/// Process-wide registry, built on first use
///
/// Honours [`SHAPER_LIST_ENV`] at that moment; later changes to the
/// environment have no effect.
pub fn registry() -> &'static ShaperRegistry {
    static REGISTRY: OnceLock<ShaperRegistry> = OnceLock::new();

    REGISTRY.get_or_init(|| {
        let registry = match env::var(SHAPER_LIST_ENV) {
            Ok(list) => ShaperRegistry::with_preferred(&list),
            Err(_) => ShaperRegistry::compiled(),
        };
        if registry.count() == 0 {
            tracing::warn!("No shapers compiled in; shaping will always fail");
        }
        registry
    })
}
