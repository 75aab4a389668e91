//! Logging setup for the protocol survey
//!
//! Library code only emits `tracing` events; the binary decides where they
//! go. Settings come either from the `[logging]` table of the config file
//! or from one of the preset initializers below.

use crate::frontend::config::LoggingConfig;
use std::path::Path;
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// Daily-rotated files under `directory`
    File { directory: String, prefix: String },
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    pub span_events: bool,
    /// Extra directives, e.g. `typthon_protocols::protocols=trace`
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[logging]` table of the config file
    pub fn from_settings(settings: &LoggingConfig) -> Result<Self, String> {
        let level = Level::from_str(&settings.level)
            .map_err(|_| format!("Unknown log level: {}", settings.level))?;
        let format = settings.format.parse()?;

        Ok(Self {
            level,
            format,
            filter: settings.filter.clone(),
            ..Self::default()
        })
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive until exit so buffered events get flushed.
/// If a subscriber is already installed this is a no-op apart from the guard.
pub fn init_logging(config: LogConfig) -> WorkerGuard {
    let (writer, guard) = match &config.output {
        LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogOutput::File { directory, prefix } => {
            tracing_appender::non_blocking(rolling::daily(directory, prefix))
        }
    };

    install(writer, &config);
    guard
}

fn install(writer: NonBlocking, config: &LogConfig) {
    let filter = build_filter(config);
    let spans = span_events_config(config.span_events);
    let base = fmt::layer().with_writer(writer).with_span_events(spans);

    let layer = match config.format {
        LogFormat::Pretty => base.pretty().with_filter(filter).boxed(),
        LogFormat::Compact => base.compact().with_filter(filter).boxed(),
        LogFormat::Json => base.json().with_filter(filter).boxed(),
    };

    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        tracing::debug!("global subscriber already set");
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base = EnvFilter::from_default_env().add_directive(config.level.into());

    match &config.filter {
        Some(directives) => directives
            .split(',')
            .filter(|d| !d.trim().is_empty())
            .fold(base, |filter, directive| {
                filter.add_directive(directive.trim().parse().unwrap_or_else(|_| {
                    tracing::warn!("Invalid filter directive: {}", directive);
                    config.level.into()
                }))
            }),
        None => base,
    }
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// Verbose stderr logging for local runs
pub fn init_dev_logging() -> WorkerGuard {
    init_logging(LogConfig {
        level: Level::DEBUG,
        format: LogFormat::Pretty,
        output: LogOutput::Stderr,
        span_events: true,
        filter: Some("typthon_protocols=debug".to_string()),
    })
}

/// JSON logs to daily-rotated files in `log_dir`
pub fn init_prod_logging(log_dir: impl AsRef<Path>) -> WorkerGuard {
    init_logging(LogConfig {
        level: Level::INFO,
        format: LogFormat::Json,
        output: LogOutput::File {
            directory: log_dir.as_ref().to_string_lossy().to_string(),
            prefix: "typthon-protocols".to_string(),
        },
        span_events: false,
        filter: Some("typthon_protocols=info".to_string()),
    })
}
