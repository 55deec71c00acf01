//! Shaper name list
//!
//! Lazily built, shared list of the registry's shaper names in precedence
//! order, terminated by a `None` sentinel. Built at most once until
//! [`free_shaper_list`] releases it.

use std::borrow::Cow;
use std::sync::{Arc, PoisonError, RwLock};

use super::shaper::{registry, ShaperRegistry};

static SHAPER_LIST: RwLock<Option<Arc<ShaperList>>> = RwLock::new(None);

/// Returned when the list can't be allocated
static NIL_SHAPER_LIST: [Option<&str>; 1] = [None];

#[cfg(test)]
static BUILDS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

/// Sentinel-terminated list of shaper names
#[derive(Debug, PartialEq, Eq)]
pub struct ShaperList {
    names: Cow<'static, [Option<&'static str>]>,
}

impl ShaperList {
    /// Copy names out of `registry`; `None` if the allocation fails
    fn build(registry: &ShaperRegistry) -> Option<Self> {
        let mut names = Vec::new();
        names.try_reserve_exact(registry.count() + 1).ok()?;
        names.extend(registry.iter().map(|e| Some(e.name)));
        names.push(None);

        Some(Self { names: Cow::Owned(names) })
    }

    /// List holding only the sentinel
    fn nil() -> Self {
        Self { names: Cow::Borrowed(&NIL_SHAPER_LIST) }
    }

    /// Names in order, without the sentinel
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().map_while(|n| *n)
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.names.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `name` is listed
    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|n| n == name)
    }

    /// Raw entries including the trailing `None`
    pub fn as_slice(&self) -> &[Option<&'static str>] {
        &self.names
    }

    /// Owned copy of the names
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

/// Shared list of available shapers, in default precedence order
pub fn list_shapers() -> Arc<ShaperList> {
    if let Some(list) = SHAPER_LIST.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
        return Arc::clone(list);
    }

    let mut slot = SHAPER_LIST.write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have published while we waited for the write lock
    if let Some(list) = slot.as_ref() {
        return Arc::clone(list);
    }

    match ShaperList::build(registry()) {
        Some(list) => {
            let list = Arc::new(list);
            *slot = Some(Arc::clone(&list));
            #[cfg(test)]
            BUILDS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            tracing::debug!("Built shaper list: {:?}", list.iter().collect::<Vec<_>>());
            list
        }
        None => {
            tracing::warn!("Failed to allocate shaper list");
            Arc::new(ShaperList::nil())
        }
    }
}

/// Release the shared list; the next [`list_shapers`] call rebuilds it
pub fn free_shaper_list() {
    SHAPER_LIST.write().unwrap_or_else(PoisonError::into_inner).take();
}
