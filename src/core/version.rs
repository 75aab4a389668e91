use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target Python language version of a module.
///
/// Only the major version matters to the protocol engine: it selects
/// between the `next` and `__next__` iterator spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PythonVersion {
    pub major: u8,
    pub minor: u8,
}

impl PythonVersion {
    pub const V2_7: PythonVersion = PythonVersion::new(2, 7);
    pub const V3_12: PythonVersion = PythonVersion::new(3, 12);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    pub fn is_3x(&self) -> bool {
        self.major >= 3
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        Self::V3_12
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PythonVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidPythonVersion { value: s.to_string() };

        let mut parts = s.trim().split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };

        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for PythonVersion {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PythonVersion> for String {
    fn from(version: PythonVersion) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("3.11".parse::<PythonVersion>().unwrap(), PythonVersion::new(3, 11));
        assert_eq!("2".parse::<PythonVersion>().unwrap(), PythonVersion::new(2, 0));
        assert!("three".parse::<PythonVersion>().is_err());
        assert!("3.x".parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_is_3x() {
        assert!(PythonVersion::default().is_3x());
        assert!(!PythonVersion::V2_7.is_3x());
    }
}
