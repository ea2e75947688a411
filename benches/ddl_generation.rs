//! Benchmarks for schema validation and DDL generation.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use relforge::migrate::MigrationPlan;
use relforge::schema::{Enum, Model, Property, Schema, validate};
use std::hint::black_box;

/// Build a schema of `n` owner/child model pairs joined by 1:n relations.
fn synthetic_schema(n: usize) -> Schema {
    let mut schema = Schema::default().with_enum(Enum::new("Status", ["ACTIVE", "ARCHIVED"]));

    for i in 0..n {
        let owner = format!("Owner{}", letters(i));
        let child = format!("Child{}", letters(i));

        schema = schema
            .with_model(
                Model::new(owner.as_str())
                    .with_property(
                        Property::new("id", "int")
                            .with_id()
                            .with_default("autoincrement()"),
                    )
                    .with_property(Property::new("email", "string").with_unique())
                    .with_property(Property::new("status", "Status").with_default("ACTIVE"))
                    .with_property(Property::new("createdAt", "dateTime").with_default("now()"))
                    .with_property(Property::new("children", format!("{}[]", child))),
            )
            .with_model(
                Model::new(child.as_str())
                    .with_property(Property::new("id", "string").with_id().with_default("uuid()"))
                    .with_property(Property::new("score", "float?"))
                    .with_property(Property::new("ownerId", "int"))
                    .with_property(
                        Property::new("owner", owner.as_str()).with_relation("ownerId", "id"),
                    ),
            );
    }

    schema
}

/// Model names may only hold letters, so encode the index as one.
fn letters(mut i: usize) -> String {
    let mut out = String::new();
    loop {
        out.push((b'A' + (i % 26) as u8) as char);
        i /= 26;
        if i == 0 {
            return out;
        }
    }
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for size in [1, 10, 100] {
        let schema = synthetic_schema(size);
        group.throughput(Throughput::Elements((size * 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &schema, |b, schema| {
            b.iter(|| black_box(validate(schema).unwrap()))
        });
    }

    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");

    for size in [1, 10, 100] {
        let schema = synthetic_schema(size);
        group.throughput(Throughput::Elements((size * 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &schema, |b, schema| {
            b.iter(|| black_box(MigrationPlan::from_schema(schema).unwrap().to_sql()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validate, bench_plan);
criterion_main!(benches);
