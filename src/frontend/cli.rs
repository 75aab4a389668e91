use crate::core::PythonVersion;
use crate::frontend::config::{Config, OutputFormat};
use crate::frontend::survey::{collect_files, survey_files, ModuleReport};
use crate::infrastructure::logging::{init_dev_logging, init_logging, LogConfig};
use crate::protocols::ProtocolStore;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub paths: Vec<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub json: bool,
    pub python_version: Option<PythonVersion>,
    pub dev_log: bool,
}

pub struct Cli {
    cli: CliConfig,
    config: Config,
}

impl Cli {
    /// Resolve the effective config: explicit file, else discovery from the
    /// working directory; command-line flags win over both
    pub fn new(cli: CliConfig) -> Result<Self, String> {
        let mut config = match &cli.config_file {
            Some(path) => Config::load(path),
            None => {
                let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
                Config::discover(&cwd)
            }
        }
        .map_err(|e| e.to_string())?;

        if cli.json {
            config.output.format = OutputFormat::Json;
        }
        if let Some(version) = cli.python_version {
            config.analysis.python_version = version;
        }

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Survey every path and print the report; returns the exit code
    pub fn run(&self) -> Result<i32, String> {
        if self.cli.paths.is_empty() {
            return Err("No paths specified".to_string());
        }

        let files = collect_files(&self.config, &self.cli.paths)?;
        let store = ProtocolStore::new();

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for result in survey_files(&store, &self.config, &files) {
            match result {
                Ok(survey) => reports.push(survey.report(&store)),
                Err(e) => failures.push(e),
            }
        }

        let metrics = store.metrics().snapshot();
        info!(
            composites = metrics.composites_created,
            synthetic_methods = metrics.synthetic_methods,
            "survey complete"
        );

        match self.config.output.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&reports)
                    .map_err(|e| format!("Failed to serialize report: {}", e))?;
                println!("{}", json);
            }
            OutputFormat::Text => print!("{}", self.render_text(&reports)),
        }

        for failure in &failures {
            eprintln!("{}", failure);
        }

        Ok(if failures.is_empty() { 0 } else { 1 })
    }

    pub fn render_text(&self, reports: &[ModuleReport]) -> String {
        let mut out = String::new();
        for report in reports {
            out.push_str(&format!("{}\n", report.path.display()));
            for name in &report.names {
                out.push_str(&format!("  {}: {}\n", name.name, name.rendered));
                if self.config.output.show_references {
                    for location in &name.references {
                        out.push_str(&format!("    {}\n", location));
                    }
                }
            }
        }
        out
    }
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [OPTIONS] <path>...\n\nOptions:\n  \
         --config FILE   Read settings from FILE instead of discovering {}\n  \
         --json          Print the report as JSON\n  \
         --python X.Y    Target Python version (default: 3.12)\n  \
         --dev-log       Verbose logging to stderr",
        program,
        crate::frontend::config::CONFIG_FILE_NAME
    )
}

pub fn parse_args_from(args: &[String]) -> Result<CliConfig, String> {
    let program = args.first().map(String::as_str).unwrap_or("typthon-protocols");
    if args.len() < 2 {
        return Err(usage(program));
    }

    let mut config = CliConfig::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--json" => config.json = true,
            "--dev-log" => config.dev_log = true,
            "--config" => {
                i += 1;
                let value = args.get(i).ok_or("--config requires an argument")?;
                config.config_file = Some(PathBuf::from(value));
            }
            "--python" => {
                i += 1;
                let value = args.get(i).ok_or("--python requires an argument")?;
                let version = value.parse::<PythonVersion>().map_err(|e| e.to_string())?;
                config.python_version = Some(version);
            }
            "--help" | "-h" => return Err(usage(program)),
            arg if arg.starts_with("--") => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => config.paths.push(PathBuf::from(path)),
        }
        i += 1;
    }

    if config.paths.is_empty() {
        return Err("No paths specified".to_string());
    }

    Ok(config)
}

pub fn parse_args() -> Result<CliConfig, String> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from(&args)
}

/// Entry point for the binary
pub fn main() -> Result<i32, String> {
    let cli_config = parse_args()?;
    let dev_log = cli_config.dev_log;
    let cli = Cli::new(cli_config)?;

    let _guard = if dev_log {
        init_dev_logging()
    } else {
        init_logging(LogConfig::from_settings(&cli.config().logging)?)
    };

    cli.run()
}
