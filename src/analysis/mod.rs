//! Analysis context shared by the protocol engine and its callers

pub mod unit;

pub use unit::{AnalysisUnit, ModuleId, ModuleInfo};
