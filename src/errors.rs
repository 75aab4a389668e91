use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl SourceLocation {
    pub fn new(line: usize, col: usize, end_line: usize, end_col: usize) -> Self {
        Self { line, col, end_line, end_col }
    }

    pub fn from_range(start: (usize, usize), end: (usize, usize)) -> Self {
        Self::new(start.0, start.1, end.0, end.1)
    }
}

/// A resolved location in a concrete file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Arc<Path>,
    pub span: SourceLocation,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, span: SourceLocation) -> Self {
        Self { file: Arc::from(file.into()), span }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn col(&self) -> usize {
        self.span.col
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.span.line, self.span.col)
    }
}

impl Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Location", 2)?;
        state.serialize_field("file", &self.file.to_string_lossy())?;
        state.serialize_field("span", &self.span)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Write { path: PathBuf, message: String },
    Parse { message: String },
    Serialize { message: String },
    InvalidPythonVersion { value: String },
    InvalidPattern { pattern: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "Failed to read config {}: {}", path.display(), message)
            }
            Self::Write { path, message } => {
                write!(f, "Failed to write config {}: {}", path.display(), message)
            }
            Self::Parse { message } => {
                write!(f, "Failed to parse config: {}", message)
            }
            Self::Serialize { message } => {
                write!(f, "Failed to serialize config: {}", message)
            }
            Self::InvalidPythonVersion { value } => {
                write!(f, "Invalid Python version '{}': expected MAJOR.MINOR", value)
            }
            Self::InvalidPattern { pattern, message } => {
                write!(f, "Invalid path pattern '{}': {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
