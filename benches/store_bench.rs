//! Benchmarks for the record store and table renderer
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use formdeck::dom::Document;
use formdeck::record::{Record, UserId};
use formdeck::storage::{FileStorage, MemoryStorage, RecordStore};
use formdeck::table::{TableCallbacks, TableRenderer};
use serde_json::json;
use tempfile::tempdir;

fn create_test_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new()
                .with("userId", i as i64)
                .with("name", format!("Employee {}", i))
                .with("email", format!("employee{}@example.com", i))
                .with("skills", json!(["rust", "sql"]))
                .with("notes", "x".repeat(64))
        })
        .collect()
}

fn seeded_store(count: usize) -> RecordStore<MemoryStorage> {
    let mut store = RecordStore::new("bench", MemoryStorage::new()).unwrap();
    let data = serde_json::to_string(&create_test_records(count)).unwrap();
    store.import_data(&data).unwrap();
    store
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for size in [100, 1000] {
        let extra = Record::new().with("userId", -1).with("name", "New");

        group.bench_function(format!("add_to_{}", size), |b| {
            b.iter_batched(
                || seeded_store(size),
                |mut store| store.add(black_box(&extra)).unwrap(),
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("find_in_{}", size), |b| {
            let store = seeded_store(size);
            let id = UserId::from((size / 2) as i64);
            b.iter(|| store.find(black_box(&id)))
        });

        group.throughput(Throughput::Elements(size as u64));
        let data = serde_json::to_string(&create_test_records(size)).unwrap();
        group.bench_function(format!("import_{}", size), |b| {
            let mut store = RecordStore::new("bench", MemoryStorage::new()).unwrap();
            b.iter(|| store.import_data(black_box(&data)).unwrap())
        });
    }

    group.finish();
}

fn bench_file_backend(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_backend");

    group.bench_function("update_in_1000", |b| {
        let dir = tempdir().unwrap();
        let mut store = RecordStore::new("bench", FileStorage::open(dir.path()).unwrap()).unwrap();
        let data = serde_json::to_string(&create_test_records(1000)).unwrap();
        store.import_data(&data).unwrap();

        let changed = Record::new().with("userId", 500).with("name", "Changed");
        b.iter(|| store.update(black_box(&changed)).unwrap())
    });

    group.finish();
}

fn bench_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("table");

    for size in [100, 1000] {
        let records = create_test_records(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("render_{}", size), |b| {
            let doc = Document::new();
            let root = doc.create_element("div");
            doc.set_attribute(root, "id", "table");
            doc.append_child(doc.body(), root);
            let mut table = TableRenderer::new(&doc, "table", TableCallbacks::new()).unwrap();

            b.iter(|| table.render(black_box(&records)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_store, bench_file_backend, bench_table);
criterion_main!(benches);
