use crate::core::PythonVersion;
use crate::errors::ConfigError;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".typthon-protocols.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Selects iterator member spelling (`next` before 3.0, `__next__` after)
    #[serde(default)]
    pub python_version: PythonVersion,

    /// Survey files on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_true")]
    pub show_references: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,

    /// pretty, compact or json
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            python_version: PythonVersion::default(),
            parallel: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_references: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_log_format(),
            filter: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.py".to_string()],
            exclude: vec![
                "**/__pycache__/**".to_string(),
                "**/venv/**".to_string(),
                "**/.venv/**".to_string(),
            ],
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::Parse { message: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Find a config file in `start` or any parent; defaults when none exists
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        match Self::find_config_file(start) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn find_config_file(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for pattern in self.paths.include.iter().chain(&self.paths.exclude) {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Whether a path passes the include/exclude patterns
    pub fn should_survey(&self, path: &Path) -> bool {
        let matches = |pattern: &String| {
            Pattern::new(pattern).map_or(false, |p| p.matches_path(path))
        };

        if self.paths.exclude.iter().any(matches) {
            return false;
        }
        self.paths.include.is_empty() || self.paths.include.iter().any(matches)
    }

    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize { message: e.to_string() })?;

        fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
