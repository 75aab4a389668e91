use crate::core::{PythonVersion, TypeSet};
use crate::protocols::capability::Capability;
use crate::protocols::composite::MemberTable;
use crate::protocols::description::DescriptionBuilder;
use crate::protocols::store::ProtocolStore;

/// Something that can be advanced, producing the yielded set.
///
/// Python 2 spells the advance method `next`, Python 3 `__next__`; the
/// version is fixed when the facet is built.
#[derive(Debug, Clone)]
pub struct IteratorCapability {
    yielded: TypeSet,
    version: PythonVersion,
}

impl IteratorCapability {
    pub(crate) fn new(yielded: TypeSet, version: PythonVersion) -> Self {
        Self { yielded, version }
    }

    pub fn yielded(&self) -> &TypeSet {
        &self.yielded
    }

    pub fn version(&self) -> PythonVersion {
        self.version
    }

    pub fn next_method_name(&self) -> &'static str {
        if self.version.is_3x() {
            "__next__"
        } else {
            "next"
        }
    }

    pub(crate) fn populate_members(
        &self,
        facet: &Capability,
        store: &ProtocolStore,
        members: &mut MemberTable,
    ) {
        let next = self.next_method_name();
        members.insert(
            next.to_string(),
            facet.make_synthetic_method(store, next, Vec::new(), self.yielded.clone()),
        );

        // iter(it) is it
        members.insert(
            "__iter__".to_string(),
            facet.make_synthetic_method(store, "__iter__", Vec::new(), TypeSet::of(facet.owner())),
        );
    }

    pub(crate) fn describe(&self, store: &ProtocolStore, builder: &mut DescriptionBuilder) {
        builder
            .name("iterator")
            .sorted_list(self.yielded.iter().map(|v| store.short_description(v)));
    }
}
