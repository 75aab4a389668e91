//! Core value model
//!
//! Plain Python types and the candidate sets the protocol engine
//! composes and queries.

pub mod types;
pub mod type_set;
pub mod version;

pub use types::{Type, TypeTag, BinaryOperator, UnaryOperator};
pub use type_set::{TypeSet, Value};
pub use version::PythonVersion;
