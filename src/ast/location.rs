//! Location extraction from rustpython AST nodes
//!
//! rustpython-parser 0.3 gives byte offsets via the `Ranged` trait. We convert
//! those to line:column positions with a per-module table of line starts,
//! which is how references to composites are turned into [`Location`]s.

use rustpython_parser::ast::Ranged;
use crate::errors::{Location, SourceLocation};
use std::path::Path;

/// Line index for fast byte offset to line/column conversion
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Convert byte offset to (line, column); lines are 1-based, columns 0-based
    pub fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        if self.line_starts.is_empty() {
            return (1, offset);
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        (line + 1, offset.saturating_sub(self.line_starts[line]))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len().max(1)
    }
}

/// Extension trait for extracting source locations from AST nodes
pub trait SourceLocationExt {
    fn source_location(&self, index: &LineIndex) -> SourceLocation;

    fn location_in(&self, file: &Path, index: &LineIndex) -> Location {
        Location::new(file, self.source_location(index))
    }
}

impl<T: Ranged> SourceLocationExt for T {
    fn source_location(&self, index: &LineIndex) -> SourceLocation {
        let range = self.range();
        let start = index.offset_to_position(range.start().to_usize());
        let end = index.offset_to_position(range.end().to_usize());
        SourceLocation::from_range(start, end)
    }
}
