//! Structural capability types for Python static analysis
//!
//! A value whose class is unknown is described by what it can do. The
//! [`protocols`] module composes those capabilities into a single
//! [`CompositeType`]; [`frontend`] surveys real sources to build them.

pub mod analysis;
pub mod ast;
pub mod core;
pub mod errors;
pub mod frontend;
pub mod infrastructure;
pub mod protocols;

pub use analysis::{AnalysisUnit, ModuleId, ModuleInfo};
pub use core::{BinaryOperator, PythonVersion, Type, TypeSet, TypeTag, UnaryOperator, Value};
pub use errors::{ConfigError, Location, SourceLocation};
pub use frontend::{parse_module, Config};
pub use protocols::{
    Capability, CapabilityKind, CompositeId, CompositeType, DescriptionBuilder, Fragment,
    FragmentKind, Overload, ProtocolStore, ReferenceTracker,
};
