//! Values memoized against a composition version
//!
//! A composite bumps its version every time a facet is added. Each cache
//! slot remembers the version it was computed at, so a lookup with a newer
//! version misses and the caller recomputes. Recomputation is idempotent:
//! when two callers race, either result may land.

use parking_lot::RwLock;

#[derive(Debug)]
pub struct VersionedCache<T> {
    slot: RwLock<Option<(u64, T)>>,
}

impl<T: Clone> VersionedCache<T> {
    pub fn new() -> Self {
        Self { slot: RwLock::new(None) }
    }

    /// Cached value, if it was computed at exactly `version`
    pub fn get(&self, version: u64) -> Option<T> {
        match &*self.slot.read() {
            Some((cached, value)) if *cached == version => Some(value.clone()),
            _ => None,
        }
    }

    /// Store a value computed at `version`, unless a newer one already landed
    pub fn store(&self, version: u64, value: T) {
        let mut slot = self.slot.write();
        if matches!(&*slot, Some((cached, _)) if *cached > version) {
            return;
        }
        *slot = Some((version, value));
    }

    /// Returns the value and whether it had to be computed
    pub fn get_or_compute(&self, version: u64, compute: impl FnOnce() -> T) -> (T, bool) {
        if let Some(value) = self.get(version) {
            return (value, false);
        }
        let value = compute();
        self.store(version, value.clone());
        (value, true)
    }
}

impl<T: Clone> Default for VersionedCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
