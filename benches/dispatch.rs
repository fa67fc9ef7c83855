// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmarks for trigger dispatch and configuration merging.
//!
//! Run with: `cargo bench --bench dispatch`

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use std::hint::black_box;

use lazy_instr::config::{merge_config, EnvOptions, LoaderConfig};
use lazy_instr::loader::{Initializer, LazyInstrumentationLoader};
use lazy_instr::resolver::TypeName;

fn loader_with(triggers: usize) -> LazyInstrumentationLoader {
    let mut builder = LazyInstrumentationLoader::builder();
    for i in 0..triggers {
        builder
            .add(Initializer::new(format!("init-{}", i), |_ctx| Ok(())), &[format!("trigger-{}", i)])
            .unwrap();
    }
    builder.build()
}

/// Benchmark the hot path: invoking triggers after activation.
fn bench_invoke(c: &mut Criterion) {
    let loader = loader_with(64);
    loader.invoke("trigger-7");

    let mut group = c.benchmark_group("invoke");
    group.throughput(Throughput::Elements(1));

    group.bench_function("already_fired", |b| {
        b.iter(|| loader.invoke(black_box("trigger-7")));
    });

    group.bench_function("unbound", |b| {
        b.iter(|| loader.invoke(black_box("System.Data")));
    });

    group.bench_function("first_fire", |b| {
        b.iter_batched(
            || loader_with(1),
            |loader| loader.invoke(black_box("trigger-0")),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Benchmark type name parsing.
fn bench_type_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("type_name");

    group.bench_function("parse_qualified", |b| {
        b.iter(|| {
            TypeName::parse(black_box(
                "OpenTelemetry.Instrumentation.AspNet.AspNetInstrumentation, OpenTelemetry.Instrumentation.AspNet, Version=1.0.0.0, Culture=neutral",
            ))
        });
    });

    group.finish();
}

/// Benchmark config merging.
fn bench_config(c: &mut Criterion) {
    let file = LoaderConfig {
        plugins: Some(vec!["record-exceptions".to_string()]),
        disabled_instrumentations: Some(vec!["Grpc".to_string()]),
        ..Default::default()
    };
    let vars = [
        ("OTEL_AUTO_PLUGINS", "a:b:c"),
        ("OTEL_AUTO_TRACES_INSTRUMENTATION_ENABLED", "true"),
        ("OTEL_AUTO_TRACES_ASPNET_INSTRUMENTATION_ENABLED", "false"),
    ];
    let env = EnvOptions::from_vars(vars).unwrap();

    let mut group = c.benchmark_group("config");

    group.bench_function("env_from_vars", |b| {
        b.iter(|| EnvOptions::from_vars(black_box(vars)));
    });

    group.bench_function("merge_file_and_env", |b| {
        b.iter(|| merge_config(black_box(Some(file.clone())), black_box(&env)));
    });

    group.finish();
}

criterion_group!(benches, bench_invoke, bench_type_name, bench_config);
criterion_main!(benches);
