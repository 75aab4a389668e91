use rustpython_parser::ast::Mod;
use rustpython_parser::{parse, Mode};
use std::path::Path;

pub type ParseError = String;

pub fn parse_module(source: &str) -> Result<Mod, ParseError> {
    parse(source, Mode::Module, "<string>")
        .map_err(|e| format!("Parse error: {}", e))
}

/// Parse a module, naming `path` in any error
pub fn parse_source_file(source: &str, path: &Path) -> Result<Mod, ParseError> {
    let name = path.to_string_lossy();
    parse(source, Mode::Module, &name)
        .map_err(|e| format!("Parse error in {}: {}", path.display(), e))
}
