//! Session-wide registry of composites
//!
//! Capabilities point back at their owner and synthetic methods return
//! their owner, so composites refer to each other by [`CompositeId`] and the
//! store holds the only strong references. Dropping the store releases every
//! composite created during the analysis session.

use crate::analysis::ModuleInfo;
use crate::core::{TypeSet, Value};
use crate::protocols::composite::CompositeType;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Identity of a registered composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CompositeId(u32);

impl CompositeId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counters describing how the store has been used
#[derive(Debug, Default)]
pub struct ProtocolMetrics {
    composites_created: AtomicU64,
    synthetic_methods: AtomicU64,
    member_cache_hits: AtomicU64,
    member_recomputes: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub composites_created: u64,
    pub synthetic_methods: u64,
    pub member_cache_hits: u64,
    pub member_recomputes: u64,
}

impl ProtocolMetrics {
    pub(crate) fn record_composite(&self) {
        self.composites_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_synthetic_method(&self) {
        self.synthetic_methods.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_member_hit(&self) {
        self.member_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_member_recompute(&self) {
        self.member_recomputes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            composites_created: self.composites_created.load(Ordering::Relaxed),
            synthetic_methods: self.synthetic_methods.load(Ordering::Relaxed),
            member_cache_hits: self.member_cache_hits.load(Ordering::Relaxed),
            member_recomputes: self.member_recomputes.load(Ordering::Relaxed),
        }
    }
}

pub struct ProtocolStore {
    composites: DashMap<CompositeId, Arc<CompositeType>>,
    next_id: AtomicU32,
    metrics: ProtocolMetrics,
}

impl ProtocolStore {
    pub fn new() -> Self {
        Self {
            composites: DashMap::new(),
            next_id: AtomicU32::new(0),
            metrics: ProtocolMetrics::default(),
        }
    }

    /// Register a new, empty composite declared by `declaring_module`
    pub fn create(&self, declaring_module: Option<Arc<ModuleInfo>>) -> Arc<CompositeType> {
        let id = CompositeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let composite = Arc::new(CompositeType::new(id, declaring_module));
        self.composites.insert(id, Arc::clone(&composite));
        self.metrics.record_composite();
        trace!(composite = %id, "created composite");
        composite
    }

    pub fn get(&self, id: CompositeId) -> Option<Arc<CompositeType>> {
        self.composites.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Composites named by a set, in set order; plain types are skipped
    pub fn resolve(&self, set: &TypeSet) -> Vec<Arc<CompositeType>> {
        set.composites().filter_map(|id| self.get(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }

    pub fn metrics(&self) -> &ProtocolMetrics {
        &self.metrics
    }

    pub fn short_description(&self, value: &Value) -> String {
        match value {
            Value::Type(ty) => ty.to_string(),
            Value::Composite(id) => self
                .get(*id)
                .map(|c| c.short_description())
                .unwrap_or_else(|| "<unknown>".to_string()),
        }
    }

    /// Render a set as `a | b`, or `<unknown>` when it is empty
    pub fn render_set(&self, set: &TypeSet) -> String {
        if set.is_empty() {
            return "<unknown>".to_string();
        }
        set.iter()
            .map(|v| self.short_description(v))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Default for ProtocolStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProtocolStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolStore")
            .field("composites", &self.composites.len())
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
