//! Reference locations recorded against a composite, grouped by the module
//! that contributed them.

use crate::analysis::ModuleId;
use crate::errors::Location;
use dashmap::DashMap;
use std::collections::HashSet;
use tracing::trace;

/// One module's locations in recording order, with a set for membership
#[derive(Debug, Default)]
struct ModuleLog {
    order: Vec<Location>,
    seen: HashSet<Location>,
}

/// Ordered multimap from contributing module to recorded locations.
///
/// Order is preserved within a module; nothing is promised across modules.
#[derive(Debug, Default)]
pub struct ReferenceTracker {
    by_module: DashMap<ModuleId, ModuleLog>,
}

impl ReferenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a location to the module's log.
    ///
    /// Re-analysis passes revisit the same nodes, so a location already
    /// present for that module is not recorded twice. Returns whether the
    /// log grew.
    pub fn record(&self, module: ModuleId, location: Location) -> bool {
        let mut log = self.by_module.entry(module).or_default();
        if !log.seen.insert(location.clone()) {
            return false;
        }
        trace!(module = %module.as_str(), %location, "recorded reference");
        log.order.push(location);
        true
    }

    pub fn locations_in(&self, module: ModuleId) -> Vec<Location> {
        self.by_module
            .get(&module)
            .map(|log| log.order.clone())
            .unwrap_or_default()
    }

    pub fn all_references(&self) -> Vec<Location> {
        self.by_module
            .iter()
            .flat_map(|log| log.order.clone())
            .collect()
    }

    pub fn modules(&self) -> Vec<ModuleId> {
        self.by_module.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_module.iter().map(|log| log.order.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
