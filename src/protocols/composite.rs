//! Composite types: an inferred type as the conjunction of its facets
//!
//! Every query is answered by asking each facet in insertion order and
//! taking the union; no facet can hide another's answer. Mutating
//! operations are broadcast to every facet.
//!
//! The merged member table, instance type and type tag are memoized against
//! the composition version, which every added facet bumps under the same lock that
//! guards the facet list. A query therefore never sees a value computed from
//! an older facet list.

use crate::analysis::{AnalysisUnit, ModuleId, ModuleInfo};
use crate::ast::SourceLocationExt;
use crate::core::{BinaryOperator, PythonVersion, TypeSet, TypeTag, UnaryOperator};
use crate::errors::Location;
use crate::protocols::cache::VersionedCache;
use crate::protocols::callable::Overload;
use crate::protocols::capability::Capability;
use crate::protocols::description::{render, DescriptionBuilder, Fragment};
use crate::protocols::references::ReferenceTracker;
use crate::protocols::store::{CompositeId, ProtocolStore};
use parking_lot::RwLock;
use rustpython_parser::ast::Ranged;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Member name to the union of every candidate for it
pub type MemberTable = BTreeMap<String, TypeSet>;

/// Name shown for a composite with no facets
pub const UNKNOWN_DESCRIPTION: &str = "<unknown>";

const UNION_HASH: u64 = 0x636f_6d70_6f73_6974;

pub struct CompositeType {
    id: CompositeId,
    declaring_module: Option<Arc<ModuleInfo>>,
    facets: RwLock<Vec<Arc<Capability>>>,
    version: AtomicU64,
    members: VersionedCache<Arc<MemberTable>>,
    instance: VersionedCache<TypeSet>,
    type_tag: VersionedCache<TypeTag>,
    references: ReferenceTracker,
}

impl CompositeType {
    pub(crate) fn new(id: CompositeId, declaring_module: Option<Arc<ModuleInfo>>) -> Self {
        Self {
            id,
            declaring_module,
            facets: RwLock::new(Vec::new()),
            version: AtomicU64::new(0),
            members: VersionedCache::new(),
            instance: VersionedCache::new(),
            type_tag: VersionedCache::new(),
            references: ReferenceTracker::new(),
        }
    }

    pub fn id(&self) -> CompositeId {
        self.id
    }

    pub fn declaring_module(&self) -> Option<&Arc<ModuleInfo>> {
        self.declaring_module.as_ref()
    }

    /// Composition version; grows by one with every added facet
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Add a callable facet; `name` defaults to `callable`
    pub fn add_callable(
        &self,
        name: Option<&str>,
        parameters: Vec<TypeSet>,
        return_type: Option<TypeSet>,
    ) -> Arc<Capability> {
        self.push_facet(Capability::callable(self, name, parameters, return_type))
    }

    /// Add an iterable facet, building its nested iterator composite
    pub fn add_iterable(
        &self,
        store: &ProtocolStore,
        yielded: TypeSet,
        version: PythonVersion,
    ) -> Arc<Capability> {
        self.push_facet(Capability::iterable(store, self, yielded, version))
    }

    pub fn add_iterator(&self, yielded: TypeSet, version: PythonVersion) -> Arc<Capability> {
        self.push_facet(Capability::iterator(self, yielded, version))
    }

    /// Facets only reach here built against `self`
    fn push_facet(&self, facet: Capability) -> Arc<Capability> {
        debug_assert_eq!(facet.owner(), self.id);
        let facet = Arc::new(facet);

        let mut facets = self.facets.write();
        debug!(
            composite = %self.id,
            facet = facet.name(),
            position = facets.len(),
            "added facet"
        );
        facets.push(Arc::clone(&facet));
        self.version.fetch_add(1, Ordering::AcqRel);
        facet
    }

    pub fn facets(&self) -> Vec<Arc<Capability>> {
        self.facets.read().clone()
    }

    pub fn facet_count(&self) -> usize {
        self.facets.read().len()
    }

    /// Facets and the version they belong to, read under one lock
    fn snapshot(&self) -> (u64, Vec<Arc<Capability>>) {
        let facets = self.facets.read();
        (self.version.load(Ordering::Acquire), facets.clone())
    }

    pub fn name(&self) -> String {
        self.facets
            .read()
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn short_description(&self) -> String {
        let name = self.name();
        if name.is_empty() {
            UNKNOWN_DESCRIPTION.to_string()
        } else {
            name
        }
    }

    pub fn get_member(&self, unit: &AnalysisUnit<'_>, name: &str) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.get_member(unit, name)))
    }

    pub fn get_type_member(&self, unit: &AnalysisUnit<'_>, name: &str) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.get_type_member(unit, name)))
    }

    /// Every facet's members; a name defined by several facets maps to the
    /// union of their sets.
    pub fn get_all_members(&self, unit: &AnalysisUnit<'_>) -> Arc<MemberTable> {
        let (version, facets) = self.snapshot();
        let (members, computed) = self.members.get_or_compute(version, || {
            trace!(composite = %self.id, version, "merging member tables");
            let mut merged = MemberTable::new();
            for facet in &facets {
                for (name, set) in facet.members(unit).iter() {
                    match merged.get_mut(name) {
                        Some(existing) => existing.extend(set.iter().cloned()),
                        None => {
                            merged.insert(name.clone(), set.clone());
                        }
                    }
                }
            }
            Arc::new(merged)
        });

        if computed {
            unit.store.metrics().record_member_recompute();
        } else {
            unit.store.metrics().record_member_hit();
        }
        members
    }

    pub fn get_instance_type(&self, _unit: &AnalysisUnit<'_>) -> TypeSet {
        let (version, facets) = self.snapshot();
        self.instance
            .get_or_compute(version, || {
                TypeSet::union_all(facets.iter().map(|f| f.get_instance_type()))
            })
            .0
    }

    /// The one tag every tagged facet agrees on, else `Unknown`
    pub fn type_tag(&self) -> TypeTag {
        let (version, facets) = self.snapshot();
        self.type_tag
            .get_or_compute(version, || reconcile_type_tags(facets.iter().map(|f| f.type_tag())))
            .0
    }

    pub fn get_iterator(&self, unit: &AnalysisUnit<'_>) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.get_iterator(unit)))
    }

    pub fn get_enumerator_types(&self, unit: &AnalysisUnit<'_>) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.get_enumerator_types(unit)))
    }

    pub fn get_async_iterator(&self, unit: &AnalysisUnit<'_>) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.get_async_iterator(unit)))
    }

    pub fn get_async_enumerator_types(&self, unit: &AnalysisUnit<'_>) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.get_async_enumerator_types(unit)))
    }

    pub fn await_value(&self, unit: &AnalysisUnit<'_>) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.await_value(unit)))
    }

    pub fn call(
        &self,
        unit: &AnalysisUnit<'_>,
        args: &[TypeSet],
        keyword_names: &[String],
    ) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.call(unit, args, keyword_names)))
    }

    pub fn binary_operation(
        &self,
        unit: &AnalysisUnit<'_>,
        op: BinaryOperator,
        rhs: &TypeSet,
    ) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.binary_operation(unit, op, rhs)))
    }

    pub fn reverse_binary_operation(
        &self,
        unit: &AnalysisUnit<'_>,
        op: BinaryOperator,
        lhs: &TypeSet,
    ) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.reverse_binary_operation(unit, op, lhs)))
    }

    pub fn unary_operation(&self, unit: &AnalysisUnit<'_>, op: UnaryOperator) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.unary_operation(unit, op)))
    }

    pub fn get_index(&self, unit: &AnalysisUnit<'_>, index: &TypeSet) -> TypeSet {
        TypeSet::union_all(self.facets().iter().map(|f| f.get_index(unit, index)))
    }

    pub fn set_member(&self, unit: &AnalysisUnit<'_>, name: &str, value: &TypeSet) {
        for facet in self.facets() {
            facet.set_member(unit, name, value);
        }
    }

    pub fn delete_member(&self, unit: &AnalysisUnit<'_>, name: &str) {
        for facet in self.facets() {
            facet.delete_member(unit, name);
        }
    }

    pub fn set_index(&self, unit: &AnalysisUnit<'_>, index: &TypeSet, value: &TypeSet) {
        for facet in self.facets() {
            facet.set_index(unit, index, value);
        }
    }

    pub fn augment_assign(&self, unit: &AnalysisUnit<'_>, op: BinaryOperator, value: &TypeSet) {
        for facet in self.facets() {
            facet.augment_assign(unit, op, value);
        }
    }

    pub fn overloads(&self, store: &ProtocolStore) -> Vec<Overload> {
        self.facets().iter().flat_map(|f| f.overloads(store)).collect()
    }

    /// Fragments describing this composite, facets in insertion order
    pub fn describe(&self, store: &ProtocolStore) -> Vec<Fragment> {
        let facets = self.facets();
        let mut builder = DescriptionBuilder::new();

        if facets.is_empty() {
            builder.name(UNKNOWN_DESCRIPTION);
        }
        for (i, facet) in facets.iter().enumerate() {
            if i > 0 {
                builder.comma();
            }
            facet.describe(store, &mut builder);
        }

        builder.end_declaration();
        builder.finish()
    }

    pub fn render(&self, store: &ProtocolStore) -> String {
        render(&self.describe(store))
    }

    pub fn record_reference(&self, location: Location, module: ModuleId) {
        self.references.record(module, location);
    }

    /// Record a reference at a syntax node of the unit's module
    pub fn add_reference<N: Ranged>(&self, node: &N, unit: &AnalysisUnit<'_>) {
        let module = unit.module;
        let location = node.location_in(module.path(), module.line_index());
        self.record_reference(location, module.id());
    }

    pub fn locations_declared_in(&self, module: ModuleId) -> Vec<Location> {
        self.references.locations_in(module)
    }

    /// References recorded by the declaring module itself
    pub fn locations(&self) -> Vec<Location> {
        match &self.declaring_module {
            Some(module) => self.locations_declared_in(module.id()),
            None => Vec::new(),
        }
    }

    pub fn all_references(&self) -> Vec<Location> {
        self.references.all_references()
    }

    pub fn references(&self) -> &ReferenceTracker {
        &self.references
    }

    /// Composites merge by kind only, which keeps merged facts bounded
    pub fn union_equals(&self, _other: &CompositeType) -> bool {
        true
    }

    pub fn union_hash(&self) -> u64 {
        UNION_HASH
    }

    // TODO: fold the other composite's facets in once facets can be compared
    pub fn union_merge(self: &Arc<Self>, _other: &Arc<CompositeType>) -> Arc<CompositeType> {
        Arc::clone(self)
    }
}

/// The single non-default tag every tagged item agrees on, else the default.
///
/// The default doubles as "unknown": it never conflicts and never wins.
fn reconcile_type_tags<T>(tags: impl Iterator<Item = T>) -> T
where
    T: Copy + Eq + Default,
{
    let unknown = T::default();
    let mut agreed = None;
    for tag in tags.filter(|t| *t != unknown) {
        match agreed {
            None => agreed = Some(tag),
            Some(existing) if existing != tag => return unknown,
            Some(_) => {}
        }
    }
    agreed.unwrap_or(unknown)
}

impl fmt::Debug for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeType")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("version", &self.version())
            .finish()
    }
}
