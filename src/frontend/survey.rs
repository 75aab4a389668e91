//! Usage survey over Python sources
//!
//! Walks a module and composes, for every plain name, the capabilities its
//! usage implies: calling it makes it callable, looping over it makes it
//! iterable, `next()` on it makes it an iterator. Every load of the name is
//! recorded as a reference. This is a thin consumer of the protocol engine,
//! not an inference engine: it only looks at names.

use crate::analysis::{AnalysisUnit, ModuleInfo};
use crate::ast::AstVisitor;
use crate::core::{Type, TypeSet, TypeTag};
use crate::errors::Location;
use crate::frontend::config::Config;
use crate::frontend::parser::parse_source_file;
use crate::protocols::{CompositeType, Fragment, Overload, ProtocolStore};
use rayon::prelude::*;
use rustpython_parser::ast::{
    Comprehension, Constant, Expr, ExprCall, ExprContext, ExprName, Mod, StmtFor,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Usage {
    Called,
    Iterated,
    Advanced,
}

/// Composites discovered in one module, keyed by name
#[derive(Debug)]
pub struct ModuleSurvey {
    pub module: Arc<ModuleInfo>,
    pub names: BTreeMap<String, Arc<CompositeType>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameReport {
    pub name: String,
    pub rendered: String,
    pub fragments: Vec<Fragment>,
    pub type_tag: TypeTag,
    pub overloads: Vec<Overload>,
    pub references: Vec<Location>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    pub module: String,
    pub path: PathBuf,
    pub names: Vec<NameReport>,
}

struct Surveyor<'a> {
    unit: AnalysisUnit<'a>,
    names: BTreeMap<String, Arc<CompositeType>>,
    seen: HashSet<(String, Usage)>,
}

impl<'a> Surveyor<'a> {
    fn new(unit: AnalysisUnit<'a>) -> Self {
        Self {
            unit,
            names: BTreeMap::new(),
            seen: HashSet::new(),
        }
    }

    fn composite(&mut self, name: &str) -> Arc<CompositeType> {
        let unit = self.unit;
        Arc::clone(
            self.names
                .entry(name.to_string())
                .or_insert_with(|| unit.store.create(Some(Arc::clone(unit.module)))),
        )
    }

    /// Add the facet for a usage the first time the name shows it
    fn observe(&mut self, name: &ExprName, usage: Usage, parameters: Vec<TypeSet>) {
        let key = (name.id.as_str().to_string(), usage);
        if self.seen.contains(&key) {
            return;
        }

        let composite = self.composite(name.id.as_str());
        let version = self.unit.module.python_version();
        match usage {
            Usage::Called => composite.add_callable(Some(name.id.as_str()), parameters, None),
            Usage::Iterated => composite.add_iterable(self.unit.store, TypeSet::empty(), version),
            Usage::Advanced => composite.add_iterator(TypeSet::empty(), version),
        };
        self.seen.insert(key);
    }

    fn iterated(&mut self, iter: &Expr) {
        if let Expr::Name(name) = iter {
            self.observe(name, Usage::Iterated, Vec::new());
        }
    }
}

impl AstVisitor for Surveyor<'_> {
    fn visit_name(&mut self, name: &ExprName) {
        if matches!(name.ctx, ExprContext::Load) {
            let composite = self.composite(name.id.as_str());
            composite.add_reference(name, &self.unit);
        }
    }

    fn visit_for(&mut self, for_stmt: &StmtFor) {
        self.iterated(&for_stmt.iter);
        self.walk_for(for_stmt);
    }

    fn visit_comprehension(&mut self, comprehension: &Comprehension) {
        self.iterated(&comprehension.iter);
        self.walk_comprehension(comprehension);
    }

    fn visit_call(&mut self, call: &ExprCall) {
        if let Expr::Name(func) = call.func.as_ref() {
            let parameters = call.args.iter().map(literal_type).collect();
            self.observe(func, Usage::Called, parameters);

            match (func.id.as_str(), call.args.first()) {
                ("next", Some(Expr::Name(arg))) => self.observe(arg, Usage::Advanced, Vec::new()),
                ("iter", Some(Expr::Name(arg))) => self.observe(arg, Usage::Iterated, Vec::new()),
                _ => {}
            }
        }

        self.walk_call(call);
    }
}

/// Type of a literal argument; anything else is unknown
fn literal_type(expr: &Expr) -> TypeSet {
    let Expr::Constant(constant) = expr else {
        return TypeSet::empty();
    };
    let ty = match &constant.value {
        Constant::None => Type::None,
        Constant::Bool(_) => Type::Bool,
        Constant::Str(_) => Type::Str,
        Constant::Bytes(_) => Type::Bytes,
        Constant::Int(_) => Type::Int,
        Constant::Float(_) => Type::Float,
        _ => return TypeSet::empty(),
    };
    TypeSet::of(ty)
}

/// Survey one parsed module
pub fn survey_module(store: &ProtocolStore, module: Arc<ModuleInfo>, ast: &Mod) -> ModuleSurvey {
    let mut surveyor = Surveyor::new(AnalysisUnit::new(store, &module));
    surveyor.visit_module(ast);

    let names = surveyor.names;
    debug!(module = module.name(), names = names.len(), "surveyed module");
    ModuleSurvey { module, names }
}

/// Read, parse and survey one file
pub fn survey_file(
    store: &ProtocolStore,
    config: &Config,
    path: &Path,
) -> Result<ModuleSurvey, String> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let ast = parse_source_file(&source, path)?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let module = ModuleInfo::new(name, path, config.analysis.python_version).with_source(&source);

    Ok(survey_module(store, Arc::new(module), &ast))
}

/// Expand directories into the Python files the config admits
pub fn collect_files(config: &Config, paths: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let pattern = format!("{}/**/*.py", path.display());
            for entry in glob::glob(&pattern).map_err(|e| format!("Glob pattern error: {}", e))? {
                match entry {
                    Ok(file) if file.is_file() && config.should_survey(&file) => files.push(file),
                    Ok(_) => {}
                    Err(e) => warn!("Error accessing path: {}", e),
                }
            }
        } else {
            return Err(format!("Path not found: {}", path.display()));
        }
    }

    Ok(files)
}

/// Survey every file against one shared store
pub fn survey_files(
    store: &ProtocolStore,
    config: &Config,
    files: &[PathBuf],
) -> Vec<Result<ModuleSurvey, String>> {
    info!(files = files.len(), parallel = config.analysis.parallel, "surveying");
    if config.analysis.parallel {
        files.par_iter().map(|path| survey_file(store, config, path)).collect()
    } else {
        files.iter().map(|path| survey_file(store, config, path)).collect()
    }
}

impl ModuleSurvey {
    pub fn report(&self, store: &ProtocolStore) -> ModuleReport {
        let names = self
            .names
            .iter()
            .map(|(name, composite)| {
                let fragments = composite.describe(store);
                NameReport {
                    name: name.clone(),
                    rendered: crate::protocols::render(&fragments),
                    fragments,
                    type_tag: composite.type_tag(),
                    overloads: composite.overloads(store),
                    references: composite.locations_declared_in(self.module.id()),
                }
            })
            .collect();

        ModuleReport {
            module: self.module.name().to_string(),
            path: self.module.path().to_path_buf(),
            names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PythonVersion;
    use crate::frontend::parse_module;

    fn survey(source: &str, version: PythonVersion) -> (ProtocolStore, ModuleSurvey) {
        let store = ProtocolStore::new();
        let module = Arc::new(ModuleInfo::new("m", "m.py", version).with_source(source));
        let ast = parse_module(source).unwrap();
        let result = survey_module(&store, module, &ast);
        (store, result)
    }

    #[test]
    fn test_call_makes_callable() {
        let (store, result) = survey("f(1, 'a')\nf(2)\n", PythonVersion::default());
        let f = &result.names["f"];

        assert_eq!(f.facet_count(), 1);
        assert_eq!(f.render(&store), "f()");
        assert_eq!(f.type_tag(), TypeTag::Function);

        let overloads = f.overloads(&store);
        assert_eq!(overloads.len(), 1);
        assert_eq!(overloads[0].parameters[0].type_display, "int");
        assert_eq!(overloads[0].parameters[1].type_display, "str");
        assert_eq!(f.locations_declared_in(result.module.id()).len(), 2);
    }

    #[test]
    fn test_loop_and_next() {
        let source = "for x in xs:\n    pass\nv = next(it)\n";
        let (store, result) = survey(source, PythonVersion::default());

        assert_eq!(result.names["xs"].render(&store), "iterable");
        assert_eq!(result.names["it"].render(&store), "iterator");
        assert_eq!(result.names["next"].render(&store), "next()");
    }

    #[test]
    fn test_python2_iterator_spelling() {
        let (store, result) = survey("next(it)\n", PythonVersion::V2_7);
        let module = Arc::clone(&result.module);
        let unit = AnalysisUnit::new(&store, &module);
        let members = result.names["it"].get_all_members(&unit);

        assert!(members.contains_key("next"));
        assert!(!members.contains_key("__next__"));
    }

    #[test]
    fn test_comprehension_iterates() {
        let (store, result) = survey("ys = [y for y in src if y]\n", PythonVersion::default());
        assert_eq!(result.names["src"].render(&store), "iterable");
    }

    #[test]
    fn test_match_case_body_is_surveyed() {
        let (store, result) = survey("match s:\n case _:\n  run()\n", PythonVersion::default());
        assert_eq!(result.names["run"].render(&store), "run()");
        assert_eq!(result.names["s"].locations_declared_in(result.module.id()).len(), 1);
    }

    #[test]
    fn test_except_star_body_is_surveyed() {
        let source = "try:\n    pass\nexcept* Group:\n    recover()\n";
        let (store, result) = survey(source, PythonVersion::default());
        assert_eq!(result.names["recover"].render(&store), "recover()");
        assert!(result.names.contains_key("Group"));
    }

    #[test]
    fn test_slice_bounds_are_references() {
        let (_, result) = survey("y = xs[lo:hi]\n", PythonVersion::default());
        let module = result.module.id();
        assert_eq!(result.names["lo"].locations_declared_in(module).len(), 1);
        assert_eq!(result.names["hi"].locations_declared_in(module).len(), 1);
    }

    #[test]
    fn test_fstring_calls_are_surveyed() {
        let (store, result) = survey("s = f\"{fmt(x):>{width}}\"\n", PythonVersion::default());
        assert_eq!(result.names["fmt"].render(&store), "fmt()");
        assert!(result.names.contains_key("x"));
        assert!(result.names.contains_key("width"));
    }

    #[test]
    fn test_decorators_and_defaults_are_surveyed() {
        let source = "@route('/')\ndef handler(cb=make(), *, n=limit):\n    pass\n";
        let (store, result) = survey(source, PythonVersion::default());

        let route = &result.names["route"];
        assert_eq!(route.render(&store), "route()");
        assert_eq!(route.overloads(&store)[0].parameters[0].type_display, "str");
        assert_eq!(result.names["make"].render(&store), "make()");
        assert!(result.names.contains_key("limit"));
    }

    #[test]
    fn test_lambda_defaults_and_class_keywords_are_surveyed() {
        let source = "class C(Base, metaclass=factory()):\n    key = lambda v=seed(): v\n";
        let (store, result) = survey(source, PythonVersion::default());

        assert_eq!(result.names["factory"].render(&store), "factory()");
        assert_eq!(result.names["seed"].render(&store), "seed()");
        assert!(result.names.contains_key("Base"));
    }
}
