use crate::analysis::ModuleInfo;
use crate::core::{PythonVersion, TypeSet};
use crate::protocols::capability::Capability;
use crate::protocols::composite::{CompositeType, MemberTable};
use crate::protocols::description::DescriptionBuilder;
use crate::protocols::store::ProtocolStore;
use std::sync::Arc;

/// Something that can be iterated, producing the yielded set.
///
/// The iterator is built once, when the facet is built, and handed out
/// as-is for the facet's whole lifetime.
#[derive(Debug, Clone)]
pub struct IterableCapability {
    yielded: TypeSet,
    iterator: Arc<CompositeType>,
}

impl IterableCapability {
    pub(crate) fn new(
        store: &ProtocolStore,
        declaring_module: Option<Arc<ModuleInfo>>,
        yielded: TypeSet,
        version: PythonVersion,
    ) -> Self {
        let iterator = store.create(declaring_module);
        iterator.add_iterator(yielded.clone(), version);
        Self { yielded, iterator }
    }

    pub fn yielded(&self) -> &TypeSet {
        &self.yielded
    }

    /// The nested composite holding the single iterator facet
    pub fn iterator(&self) -> &Arc<CompositeType> {
        &self.iterator
    }

    pub(crate) fn populate_members(
        &self,
        facet: &Capability,
        store: &ProtocolStore,
        members: &mut MemberTable,
    ) {
        let produced = TypeSet::of(self.iterator.id());
        let iter = facet.make_synthetic_method(store, "__iter__", Vec::new(), produced);
        members.insert("__iter__".to_string(), iter);
    }

    pub(crate) fn describe(&self, store: &ProtocolStore, builder: &mut DescriptionBuilder) {
        builder
            .name("iterable")
            .sorted_list(self.yielded.iter().map(|v| store.short_description(v)));
    }
}
