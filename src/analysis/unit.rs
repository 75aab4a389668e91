//! Contributing modules and the per-query analysis context

use crate::ast::LineIndex;
use crate::core::PythonVersion;
use crate::protocols::ProtocolStore;
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Unique identifier for a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(u64);

impl ModuleId {
    pub fn from_path(path: &Path) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(path.to_string_lossy().as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        Self(u64::from_le_bytes(bytes))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn as_str(&self) -> String {
        format!("{:016x}", self.0)
    }
}

/// A module whose analysis declares composites or contributes references
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    id: ModuleId,
    name: String,
    path: PathBuf,
    python_version: PythonVersion,
    line_index: LineIndex,
}

impl ModuleInfo {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        python_version: PythonVersion,
    ) -> Self {
        let path = path.into();
        Self {
            id: ModuleId::from_path(&path),
            name: name.into(),
            path,
            python_version,
            line_index: LineIndex::default(),
        }
    }

    /// Module with the line table of its source, so nodes resolve to lines
    pub fn with_source(mut self, source: &str) -> Self {
        self.line_index = LineIndex::new(source);
        self
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn python_version(&self) -> PythonVersion {
        self.python_version
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

/// Everything a query on a composite may need from its caller: the store
/// that owns composites and the module on whose behalf the query runs.
#[derive(Clone, Copy)]
pub struct AnalysisUnit<'a> {
    pub store: &'a ProtocolStore,
    pub module: &'a Arc<ModuleInfo>,
}

impl<'a> AnalysisUnit<'a> {
    pub fn new(store: &'a ProtocolStore, module: &'a Arc<ModuleInfo>) -> Self {
        Self { store, module }
    }

    pub fn module_id(&self) -> ModuleId {
        self.module.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_is_stable_per_path() {
        let a = ModuleId::from_path(Path::new("pkg/a.py"));
        let b = ModuleId::from_path(Path::new("pkg/b.py"));
        assert_eq!(a, ModuleId::from_path(Path::new("pkg/a.py")));
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn test_module_info() {
        let module =
            ModuleInfo::new("pkg.a", "pkg/a.py", PythonVersion::V2_7).with_source("x\ny\n");
        assert_eq!(module.name(), "pkg.a");
        assert!(!module.python_version().is_3x());
        assert_eq!(module.line_index().offset_to_position(2), (2, 0));
    }
}
