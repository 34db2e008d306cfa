use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use yconf::document::{render, ValueSource};
use yconf::instance::{instantiate, merge};
use yconf::schema::{compiled, CompileOptions, CompositeDecl, Describe, FieldDecl, Schema, TypeDecl};
use yconf::validate::validate;

struct Folder;

impl Schema for Folder {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("Folder")
            .doc("A mailbox folder.")
            .field(FieldDecl::new::<String>("path").default("INBOX"))
            .field(FieldDecl::new::<bool>("enabled").default(true))
            .field(FieldDecl::new::<Option<i64>>("limit"))
    }
}

impl Describe for Folder {
    fn describe() -> TypeDecl {
        TypeDecl::composite::<Self>()
    }
}

struct Mail;

impl Schema for Mail {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("Mail")
            .doc("Mail fetcher settings.")
            .field(FieldDecl::new::<String>("host").doc("Server host name.").default("imap.example.com"))
            .field(FieldDecl::new::<i64>("port").default(993))
            .field(FieldDecl::new::<BTreeMap<String, Folder>>("folders"))
    }
}

fn document(folders: usize) -> Value {
    let mut entries = Mapping::new();
    for i in 0..folders {
        let folder: Value =
            serde_yaml::from_str(&format!("{{path: folder{i}, enabled: true, limit: {i}}}"))
                .unwrap_or(Value::Null);
        entries.insert(Value::from(format!("f{i}")), folder);
    }
    let mut root = Mapping::new();
    root.insert("host".into(), "mail.local".into());
    root.insert("port".into(), 143.into());
    root.insert("folders".into(), Value::Mapping(entries));
    Value::Mapping(root)
}

fn bench_validate(c: &mut Criterion) {
    let schema = compiled::<Mail>(CompileOptions::default()).unwrap();
    let mut group = c.benchmark_group("validate");

    for size in [1, 10, 100] {
        let data = document(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| validate(black_box(data), schema.graph()));
        });
    }

    group.finish();
}

fn bench_instantiate(c: &mut Criterion) {
    let schema = compiled::<Mail>(CompileOptions::default()).unwrap();
    let data = document(100);
    let record = instantiate(&data, schema.graph()).unwrap();
    let partial: Value = serde_yaml::from_str("host: other.local").unwrap();
    let mut group = c.benchmark_group("instance");

    group.bench_function("instantiate", |b| {
        b.iter(|| instantiate(black_box(&data), schema.graph()));
    });

    group.bench_function("merge", |b| {
        b.iter(|| merge(black_box(&partial), &record, schema.graph()));
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let schema = compiled::<Mail>(CompileOptions::default()).unwrap();
    let data = document(100);
    let record = instantiate(&data, schema.graph()).unwrap();
    let mut group = c.benchmark_group("render");

    group.bench_function("defaults", |b| {
        b.iter(|| render(schema.descriptor(), ValueSource::Defaults));
    });

    group.bench_function("instance", |b| {
        b.iter(|| render(schema.descriptor(), ValueSource::Instance(black_box(&record))));
    });

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    c.bench_function("compiled_cache_hit", |b| {
        b.iter(|| compiled::<Mail>(black_box(CompileOptions::default())));
    });
}

criterion_group!(
    benches,
    bench_validate,
    bench_instantiate,
    bench_render,
    bench_registry
);
criterion_main!(benches);
