//! Source-location model and traversal for Python syntax nodes

pub mod location;
pub mod visitor;

pub use location::{LineIndex, SourceLocationExt};
pub use visitor::AstVisitor;
