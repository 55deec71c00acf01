//! Shape Plan Cache
//!
//! Bounded, most-recently-used ordered cache of shape plans. A plan is built
//! at most once per key even when several threads miss on it together: the
//! first thread builds while the others wait for it to publish.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::Result;
use super::plan::{ShapePlan, ShapePlanKey};

/// Default maximum number of cached plans
pub const DEFAULT_PLAN_CACHE_CAPACITY: usize = 64;

/// Shape plan cache with LRU eviction
///
/// Handles are `Arc<ShapePlan>`; dropping a handle releases it. The cache
/// holds one reference of its own per slot, so a slot whose strong count is
/// 1 is unused and may be evicted. Slots still held by callers are never
/// evicted; the cache grows past its capacity instead.
#[derive(Debug)]
pub struct ShapePlanCache {
    state: Mutex<CacheState>,
    /// Signalled whenever an in-flight build finishes
    built: Condvar,
    capacity: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    /// Most recently used first
    slots: VecDeque<Arc<ShapePlan>>,
    /// Keys being built right now
    building: HashSet<ShapePlanKey>,
    hits: u64,
    misses: u64,
    builds: u64,
    evictions: u64,
}

impl CacheState {
    /// Find `key`, move it to the front and hand out a new reference
    fn take_hit(&mut self, key: &ShapePlanKey) -> Option<Arc<ShapePlan>> {
        let pos = self.slots.iter().position(|plan| plan.key() == key)?;
        let plan = self.slots.remove(pos)?;
        self.slots.push_front(Arc::clone(&plan));
        self.hits += 1;
        Some(plan)
    }
}

/// Removes the in-flight marker if the builder unwinds
struct BuildGuard<'a> {
    cache: &'a ShapePlanCache,
    key: &'a ShapePlanKey,
    finished: bool,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let mut state = self.cache.lock();
            state.building.remove(self.key);
            self.cache.built.notify_all();
        }
    }
}

impl Default for ShapePlanCache {
    fn default() -> Self {
        Self::new(DEFAULT_PLAN_CACHE_CAPACITY)
    }
}

impl ShapePlanCache {
    /// Create a cache holding up to `capacity` unused plans
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            built: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the plan for `key`, building it with `build` on a miss
    ///
    /// If another thread is already building the same key, waits for it and
    /// returns its plan. A failed build inserts nothing and the error is
    /// returned to the caller that ran it; waiters then retry on their own.
    pub fn get_or_create<F>(&self, key: &ShapePlanKey, build: F) -> Result<Arc<ShapePlan>>
    where
        F: FnOnce(&ShapePlanKey) -> Result<ShapePlan>,
    {
        let mut state = self.lock();
        loop {
            if let Some(plan) = state.take_hit(key) {
                tracing::trace!("Shape plan cache hit ({})", plan.shaper_name());
                return Ok(plan);
            }
            if !state.building.contains(key) {
                break;
            }
            state = self.built.wait(state).unwrap_or_else(PoisonError::into_inner);
        }

        state.misses += 1;
        state.building.insert(key.clone());
        drop(state);

        let mut guard = BuildGuard { cache: self, key, finished: false };
        let result = build(key);

        let mut state = self.lock();
        state.building.remove(key);
        guard.finished = true;

        let result = result.map(|plan| {
            debug_assert_eq!(plan.key(), key);
            let plan = Arc::new(plan);
            state.slots.push_front(Arc::clone(&plan));
            state.builds += 1;
            tracing::debug!(
                "Shape plan cache miss, built '{}' plan ({} cached)",
                plan.shaper_name(),
                state.slots.len()
            );
            self.evict(&mut state);
            plan
        });

        self.built.notify_all();
        result
    }

    /// Drop least recently used unheld plans until within capacity
    fn evict(&self, state: &mut CacheState) {
        while state.slots.len() > self.capacity {
            let victim = state.slots.iter().rposition(|plan| Arc::strong_count(plan) == 1);
            let Some(index) = victim else {
                tracing::debug!(
                    "All {} cached plans in use, exceeding capacity {}",
                    state.slots.len(),
                    self.capacity
                );
                break;
            };

            if let Some(plan) = state.slots.remove(index) {
                state.evictions += 1;
                tracing::debug!("Evicted '{}' shape plan", plan.shaper_name());
            }
        }
    }

    /// Number of cached plans
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of unheld plans kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether a plan for `key` is cached (does not touch recency)
    pub fn contains(&self, key: &ShapePlanKey) -> bool {
        self.lock().slots.iter().any(|plan| plan.key() == key)
    }

    /// Drop every cached plan; handles held by callers stay valid
    pub fn clear(&self) {
        let mut state = self.lock();
        state.slots.clear();
        state.hits = 0;
        state.misses = 0;
        state.builds = 0;
        state.evictions = 0;
    }

    /// Get cache statistics
    pub fn stats(&self) -> PlanCacheStats {
        let state = self.lock();
        PlanCacheStats {
            size: state.slots.len(),
            capacity: self.capacity,
            hits: state.hits,
            misses: state.misses,
            builds: state.builds,
            evictions: state.evictions,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanCacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub builds: u64,
    pub evictions: u64,
}

impl PlanCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
    }
}
