//! Frontend components
//!
//! Parsing, configuration, the usage survey and the command-line entry
//! point that drive the protocol engine over real Python sources.

pub mod cli;
pub mod config;
pub mod parser;
pub mod survey;

pub use cli::main as cli_main;
pub use config::Config;
pub use parser::{parse_module, parse_source_file};
pub use survey::{
    collect_files, survey_file, survey_files, survey_module, ModuleReport, ModuleSurvey, NameReport,
};
