//! Microbenchmarks for identifier minting, saves, and page reads.
//!
//! Run with: `cargo bench -p vigil -- save`

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;
use tempfile::tempdir;
use vigil::{Id, Order, Sample, Store};

/// Creates a store holding `samples` entries for one service.
fn setup_store(samples: usize) -> (Store, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let store = Store::open(temp_dir.path().join("bench_store")).unwrap();

    for i in 0..samples {
        let status = if i % 2 == 0 { 200 } else { 503 };
        let mut sample =
            Sample::new("bench", status, Duration::from_millis(3), Duration::from_millis(9));
        store.save(&mut sample).unwrap();
    }

    (store, temp_dir)
}

fn bench_mint(c: &mut Criterion) {
    c.bench_function("id/new", |b| b.iter(|| black_box(Id::new())));
}

fn bench_save(c: &mut Criterion) {
    let (store, _dir) = setup_store(0);

    c.bench_function("save/single_service", |b| {
        b.iter(|| {
            let mut sample =
                Sample::new("bench", 200, Duration::from_millis(3), Duration::from_millis(9));
            store.save(black_box(&mut sample)).unwrap();
        });
    });
}

fn bench_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("page/newest");
    let (store, _dir) = setup_store(10_000);

    for limit in [1usize, 10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| {
                let page = store.page("bench", limit, Order::Descending).unwrap();
                black_box(page);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mint, bench_save, bench_page);
criterion_main!(benches);
