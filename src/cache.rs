//! Memoized scan results keyed by element identity.
//!
//! A [`ScanCache`] is a cheap handle; clones share the same entries. Entries
//! live as long as the last handle and are never evicted, so elements are
//! assumed not to change while a cache is in use. [`ScanCache::global`]
//! hands out the process-wide instance.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use crate::element::{Element, Source};
use crate::error::IndexResult;
use crate::scan::ScanResult;

static GLOBAL: LazyLock<ScanCache> = LazyLock::new(ScanCache::new);

#[derive(Debug, Clone, Default)]
pub struct ScanCache {
    state: Arc<Mutex<CacheState>>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<Element, Arc<ScanResult>>,
    scans: u64,
    replays: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub scans: u64,
    pub replays: u64,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Self {
        GLOBAL.clone()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lookup(&self, element: &Element) -> Option<Arc<ScanResult>> {
        let mut state = self.state();
        let hit = state.entries.get(element).cloned();
        if hit.is_some() {
            state.replays += 1;
        }
        hit
    }

    /// Stores a fresh result. If another caller stored one for the same
    /// element in the meantime, that earlier result is kept and returned.
    pub fn store(&self, element: Element, result: ScanResult) -> Arc<ScanResult> {
        let mut state = self.state();
        state.scans += 1;
        Arc::clone(state.entries.entry(element).or_insert_with(|| Arc::new(result)))
    }

    /// Returns the cached result for `element`, scanning it on a miss. The
    /// lock is not held while scanning; failed scans leave no entry.
    pub fn get_or_scan(&self, element: &Element) -> IndexResult<Arc<ScanResult>> {
        if let Some(hit) = self.lookup(element) {
            log::trace!("replaying cached scan of {element}");
            return Ok(hit);
        }
        let result = Source::detect(element)?.scan()?;
        Ok(self.store(element.clone(), result))
    }

    pub fn contains(&self, element: &Element) -> bool {
        self.state().entries.contains_key(element)
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        CacheStats {
            entries: state.entries.len(),
            scans: state.scans,
            replays: state.replays,
        }
    }
}
