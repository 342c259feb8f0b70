//! Benchmarks for placeholder scanning and template rendering.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mcp_insight_core::{PromptTemplate, Registry, Resource, extract_variables};
use std::collections::HashMap;
use std::hint::black_box;

fn template_body(placeholders: usize) -> String {
    let mut body = String::from("{{@docs}}\n\n");
    for i in 0..placeholders {
        body.push_str("Some filler text before the next placeholder ");
        body.push_str(&format!("{{{{var{i}}}}}\n"));
    }
    body
}

/// Benchmarks variable extraction over growing template bodies
fn bench_extract_variables(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_variables");

    for count in [1, 10, 100, 1000].iter() {
        let body = template_body(*count);

        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &body, |b, body| {
            b.iter(|| extract_variables(black_box(body)));
        });
    }

    group.finish();
}

/// Benchmarks a full render with one embed and N variables
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for count in [1, 10, 100].iter() {
        let mut builder = Registry::builder();
        builder
            .insert_resource(Resource::new("docs", "x".repeat(4096)))
            .insert_template(PromptTemplate::new("bench", "Bench", template_body(*count)));
        let registry = builder.build();

        let vars: HashMap<String, String> = (0..*count)
            .map(|i| (format!("var{i}"), format!("value {i}")))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &vars, |b, vars| {
            b.iter(|| registry.render(black_box("bench"), black_box(vars)));
        });
    }

    group.finish();
}

/// Benchmarks the missing-variable failure path
fn bench_render_missing_variable(c: &mut Criterion) {
    let mut builder = Registry::builder();
    builder.insert_template(PromptTemplate::new("bench", "Bench", template_body(50)));
    let registry = builder.build();
    let empty = HashMap::new();

    c.bench_function("render_missing_variable", |b| {
        b.iter(|| registry.render(black_box("bench"), black_box(&empty)).is_err());
    });
}

criterion_group!(
    benches,
    bench_extract_variables,
    bench_render,
    bench_render_missing_variable
);
criterion_main!(benches);
