//! Capability facets
//!
//! A [`Capability`] is one structural contract a composite satisfies. The
//! set of variants is closed; every query a composite supports is answered
//! here, with the empty answer (or a no-op for mutations) unless the
//! variant has something to say.

use crate::analysis::{AnalysisUnit, ModuleInfo};
use crate::core::{BinaryOperator, PythonVersion, TypeSet, TypeTag, UnaryOperator};
use crate::protocols::callable::{CallableCapability, Overload};
use crate::protocols::composite::{CompositeType, MemberTable};
use crate::protocols::description::DescriptionBuilder;
use crate::protocols::iterable::IterableCapability;
use crate::protocols::iterator::IteratorCapability;
use crate::protocols::store::{CompositeId, ProtocolStore};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub enum CapabilityKind {
    Callable(CallableCapability),
    Iterable(IterableCapability),
    Iterator(IteratorCapability),
}

#[derive(Debug)]
pub struct Capability {
    owner: CompositeId,
    declaring_module: Option<Arc<ModuleInfo>>,
    kind: CapabilityKind,
    members: OnceCell<Arc<MemberTable>>,
}

impl Capability {
    fn new(owner: &CompositeType, kind: CapabilityKind) -> Self {
        Self {
            owner: owner.id(),
            declaring_module: owner.declaring_module().cloned(),
            kind,
            members: OnceCell::new(),
        }
    }

    /// Callable facet; `name` defaults to `callable`
    pub(crate) fn callable(
        owner: &CompositeType,
        name: Option<&str>,
        parameters: Vec<TypeSet>,
        return_type: Option<TypeSet>,
    ) -> Self {
        let callable = CallableCapability::new(name, parameters, return_type);
        Self::new(owner, CapabilityKind::Callable(callable))
    }

    /// Iterable facet; builds and registers its iterator composite right away
    pub(crate) fn iterable(
        store: &ProtocolStore,
        owner: &CompositeType,
        yielded: TypeSet,
        version: PythonVersion,
    ) -> Self {
        let module = owner.declaring_module().cloned();
        let iterable = IterableCapability::new(store, module, yielded, version);
        Self::new(owner, CapabilityKind::Iterable(iterable))
    }

    pub(crate) fn iterator(
        owner: &CompositeType,
        yielded: TypeSet,
        version: PythonVersion,
    ) -> Self {
        Self::new(owner, CapabilityKind::Iterator(IteratorCapability::new(yielded, version)))
    }

    pub fn owner(&self) -> CompositeId {
        self.owner
    }

    pub fn kind(&self) -> &CapabilityKind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            CapabilityKind::Callable(c) => c.name(),
            CapabilityKind::Iterable(_) => "iterable",
            CapabilityKind::Iterator(_) => "iterator",
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        match &self.kind {
            CapabilityKind::Callable(_) => TypeTag::Function,
            _ => TypeTag::Unknown,
        }
    }

    /// Member table, built on first use and kept for the facet's lifetime
    pub fn members(&self, unit: &AnalysisUnit<'_>) -> Arc<MemberTable> {
        let members = self.members.get_or_init(|| {
            let mut members = MemberTable::new();
            self.populate_members(unit.store, &mut members);
            Arc::new(members)
        });
        Arc::clone(members)
    }

    fn populate_members(&self, store: &ProtocolStore, members: &mut MemberTable) {
        match &self.kind {
            CapabilityKind::Callable(c) => c.populate_members(self.owner, members),
            CapabilityKind::Iterable(i) => i.populate_members(self, store, members),
            CapabilityKind::Iterator(i) => i.populate_members(self, store, members),
        }
    }

    /// Build a fresh composite holding one callable facet with the given
    /// signature, declared by the same module as this facet's owner.
    pub fn make_synthetic_method(
        &self,
        store: &ProtocolStore,
        qualified_name: &str,
        parameters: Vec<TypeSet>,
        return_type: TypeSet,
    ) -> TypeSet {
        let method = store.create(self.declaring_module.clone());
        method.add_callable(Some(qualified_name), parameters, Some(return_type));
        store.metrics().record_synthetic_method();
        debug!(
            owner = %self.owner,
            method = %method.id(),
            name = qualified_name,
            "built synthetic method"
        );
        TypeSet::of(method.id())
    }

    pub fn get_member(&self, unit: &AnalysisUnit<'_>, name: &str) -> TypeSet {
        self.members(unit).get(name).cloned().unwrap_or_default()
    }

    pub fn get_type_member(&self, unit: &AnalysisUnit<'_>, name: &str) -> TypeSet {
        self.get_member(unit, name)
    }

    /// A facet's value is an instance of its owner
    pub fn get_instance_type(&self) -> TypeSet {
        TypeSet::of(self.owner)
    }

    pub fn call(
        &self,
        _unit: &AnalysisUnit<'_>,
        _args: &[TypeSet],
        _keyword_names: &[String],
    ) -> TypeSet {
        match &self.kind {
            CapabilityKind::Callable(c) => c.call().unwrap_or_default(),
            _ => TypeSet::empty(),
        }
    }

    pub fn get_iterator(&self, unit: &AnalysisUnit<'_>) -> TypeSet {
        match &self.kind {
            CapabilityKind::Iterable(i) => TypeSet::of(i.iterator().id()),
            _ => self.call_member(unit, "__iter__"),
        }
    }

    pub fn get_enumerator_types(&self, unit: &AnalysisUnit<'_>) -> TypeSet {
        match &self.kind {
            CapabilityKind::Iterator(i) => i.yielded().clone(),
            _ => {
                let iterators = self.get_iterator(unit);
                TypeSet::union_all(
                    unit.store
                        .resolve(&iterators)
                        .iter()
                        .map(|it| it.get_enumerator_types(unit)),
                )
            }
        }
    }

    pub fn get_async_iterator(&self, _unit: &AnalysisUnit<'_>) -> TypeSet {
        TypeSet::empty()
    }

    pub fn get_async_enumerator_types(&self, _unit: &AnalysisUnit<'_>) -> TypeSet {
        TypeSet::empty()
    }

    pub fn await_value(&self, _unit: &AnalysisUnit<'_>) -> TypeSet {
        TypeSet::empty()
    }

    pub fn binary_operation(
        &self,
        _unit: &AnalysisUnit<'_>,
        _op: BinaryOperator,
        _rhs: &TypeSet,
    ) -> TypeSet {
        TypeSet::empty()
    }

    pub fn reverse_binary_operation(
        &self,
        _unit: &AnalysisUnit<'_>,
        _op: BinaryOperator,
        _lhs: &TypeSet,
    ) -> TypeSet {
        TypeSet::empty()
    }

    pub fn unary_operation(&self, _unit: &AnalysisUnit<'_>, _op: UnaryOperator) -> TypeSet {
        TypeSet::empty()
    }

    pub fn get_index(&self, _unit: &AnalysisUnit<'_>, _index: &TypeSet) -> TypeSet {
        TypeSet::empty()
    }

    pub fn set_member(&self, _unit: &AnalysisUnit<'_>, name: &str, _value: &TypeSet) {
        trace!(owner = %self.owner, facet = self.name(), member = name, "ignored set_member");
    }

    pub fn delete_member(&self, _unit: &AnalysisUnit<'_>, name: &str) {
        trace!(owner = %self.owner, facet = self.name(), member = name, "ignored delete_member");
    }

    pub fn set_index(&self, _unit: &AnalysisUnit<'_>, _index: &TypeSet, _value: &TypeSet) {
        trace!(owner = %self.owner, facet = self.name(), "ignored set_index");
    }

    pub fn augment_assign(&self, _unit: &AnalysisUnit<'_>, op: BinaryOperator, _value: &TypeSet) {
        trace!(owner = %self.owner, facet = self.name(), ?op, "ignored augment_assign");
    }

    pub fn overloads(&self, store: &ProtocolStore) -> Vec<Overload> {
        match &self.kind {
            CapabilityKind::Callable(c) => vec![c.overload(store)],
            _ => Vec::new(),
        }
    }

    pub fn describe(&self, store: &ProtocolStore, builder: &mut DescriptionBuilder) {
        match &self.kind {
            CapabilityKind::Callable(c) => c.describe(builder),
            CapabilityKind::Iterable(i) => i.describe(store, builder),
            CapabilityKind::Iterator(i) => i.describe(store, builder),
        }
    }

    fn call_member(&self, unit: &AnalysisUnit<'_>, name: &str) -> TypeSet {
        let methods = self.get_member(unit, name);
        TypeSet::union_all(
            unit.store
                .resolve(&methods)
                .iter()
                .map(|m| m.call(unit, &[], &[])),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Type, Value};

    fn module(version: PythonVersion) -> Arc<ModuleInfo> {
        Arc::new(ModuleInfo::new("m", "m.py", version))
    }

    #[test]
    fn test_callable_members_point_at_owner() {
        let store = ProtocolStore::new();
        let module = module(PythonVersion::default());
        let unit = AnalysisUnit::new(&store, &module);
        let owner = store.create(Some(Arc::clone(&module)));

        let facet = Capability::callable(&owner, None, vec![], Some(TypeSet::of(Type::Int)));
        assert_eq!(facet.get_member(&unit, "__call__"), TypeSet::of(owner.id()));
        assert_eq!(facet.call(&unit, &[TypeSet::of(Type::Str)], &[]), TypeSet::of(Type::Int));
        assert_eq!(facet.type_tag(), TypeTag::Function);
    }

    #[test]
    fn test_member_table_is_memoized() {
        let store = ProtocolStore::new();
        let module = module(PythonVersion::default());
        let unit = AnalysisUnit::new(&store, &module);
        let owner = store.create(Some(Arc::clone(&module)));

        let facet = Capability::iterator(&owner, TypeSet::of(Type::Int), PythonVersion::default());
        let first = facet.members(&unit);
        let second = facet.members(&unit);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.metrics().snapshot().synthetic_methods, 2);
    }

    #[test]
    fn test_defaults_are_empty() {
        let store = ProtocolStore::new();
        let module = module(PythonVersion::default());
        let unit = AnalysisUnit::new(&store, &module);
        let owner = store.create(Some(Arc::clone(&module)));

        let facet = Capability::iterator(&owner, TypeSet::of(Type::Int), PythonVersion::default());
        assert!(facet.call(&unit, &[], &[]).is_empty());
        let int = TypeSet::of(Type::Int);
        assert!(facet.binary_operation(&unit, BinaryOperator::Add, &int).is_empty());
        assert!(facet.unary_operation(&unit, UnaryOperator::Not).is_empty());
        assert!(facet.get_index(&unit, &TypeSet::of(Type::Int)).is_empty());
        assert!(facet.await_value(&unit).is_empty());
        assert!(facet.get_member(&unit, "missing").is_empty());
        assert!(facet.overloads(&store).is_empty());
        assert_eq!(facet.type_tag(), TypeTag::Unknown);
        assert!(facet.get_instance_type().contains(&Value::Composite(owner.id())));
    }

    #[test]
    fn test_iterator_iter_returns_owner() {
        let store = ProtocolStore::new();
        let module = module(PythonVersion::default());
        let unit = AnalysisUnit::new(&store, &module);
        let owner = store.create(Some(Arc::clone(&module)));

        let facet = Capability::iterator(&owner, TypeSet::of(Type::Str), PythonVersion::default());
        assert_eq!(facet.get_iterator(&unit), TypeSet::of(owner.id()));
        assert_eq!(facet.get_enumerator_types(&unit), TypeSet::of(Type::Str));
    }
}
