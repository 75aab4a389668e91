//! Structural protocol composition
//!
//! A value's inferred type is modelled as a [`CompositeType`]: the
//! conjunction of the capability facets (callable, iterable, iterator) the
//! value is known to support, rather than a declared class.

pub mod cache;
pub mod callable;
pub mod capability;
pub mod composite;
pub mod description;
pub mod iterable;
pub mod iterator;
pub mod references;
pub mod store;

pub use callable::{CallableCapability, Overload, ParameterInfo};
pub use capability::{Capability, CapabilityKind};
pub use composite::{CompositeType, MemberTable};
pub use description::{render, DescriptionBuilder, Fragment, FragmentKind};
pub use iterable::IterableCapability;
pub use iterator::IteratorCapability;
pub use references::ReferenceTracker;
pub use store::{CompositeId, MetricsSnapshot, ProtocolMetrics, ProtocolStore};
