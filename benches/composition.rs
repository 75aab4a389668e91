//! Composition benchmarks
//!
//! Measures member-table merging (cold and cached) and whole-file surveys.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use typthon_protocols::frontend::{parse_module, survey_module};
use typthon_protocols::protocols::ProtocolStore;
use typthon_protocols::{AnalysisUnit, ModuleInfo, PythonVersion, Type, TypeSet};

fn generate_module(functions: usize) -> String {
    let mut content = String::new();
    for i in 0..functions {
        content.push_str(&format!(
            r#"
def run_{i}(items_{i}, handler_{i}):
    for item in items_{i}:
        handler_{i}(item, {i}, "x")
    squares = [v * v for v in items_{i}]
    return next(items_{i}), squares
"#
        ));
    }
    content
}

fn bench_member_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("member_merge");
    let module = Arc::new(ModuleInfo::new("bench", "bench.py", PythonVersion::default()));

    for facets in [1, 4, 16] {
        group.bench_with_input(BenchmarkId::new("cold", facets), &facets, |b, &facets| {
            b.iter(|| {
                let store = ProtocolStore::new();
                let unit = AnalysisUnit::new(&store, &module);
                let composite = store.create(Some(Arc::clone(&module)));
                for i in 0..facets {
                    match i % 3 {
                        0 => composite.add_callable(None, vec![TypeSet::of(Type::Int)], None),
                        1 => composite.add_iterable(
                            &store,
                            TypeSet::of(Type::Str),
                            PythonVersion::default(),
                        ),
                        _ => composite.add_iterator(
                            TypeSet::of(Type::Int),
                            PythonVersion::default(),
                        ),
                    };
                }
                black_box(composite.get_all_members(&unit))
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", facets), &facets, |b, &facets| {
            let store = ProtocolStore::new();
            let unit = AnalysisUnit::new(&store, &module);
            let composite = store.create(Some(Arc::clone(&module)));
            for _ in 0..facets {
                composite.add_iterator(TypeSet::of(Type::Int), PythonVersion::default());
            }
            composite.get_all_members(&unit);

            b.iter(|| black_box(composite.get_all_members(&unit)));
        });
    }

    group.finish();
}

fn bench_survey(c: &mut Criterion) {
    let mut group = c.benchmark_group("survey");

    for functions in [10, 100] {
        let source = generate_module(functions);
        let ast = match parse_module(&source) {
            Ok(ast) => ast,
            Err(e) => panic!("generated module failed to parse: {}", e),
        };
        let module = ModuleInfo::new("bench", "bench.py", PythonVersion::default());
        let module = Arc::new(module.with_source(&source));

        group.bench_with_input(BenchmarkId::from_parameter(functions), &functions, |b, _| {
            b.iter(|| {
                let store = ProtocolStore::new();
                black_box(survey_module(&store, Arc::clone(&module), &ast).names.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_member_merge, bench_survey);
criterion_main!(benches);
