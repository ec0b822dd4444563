use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridscan::{Dbscan, LshParams, PointStore};
use rand::prelude::*;

/// `n` points spread over `k` square blobs in 2D.
fn blobs(n: usize, k: usize, rng: &mut StdRng) -> PointStore {
    let centers: Vec<(f32, f32)> = (0..k)
        .map(|_| (rng.random::<f32>() * 50.0, rng.random::<f32>() * 50.0))
        .collect();
    let mut data = Vec::with_capacity(2 * n);
    for i in 0..n {
        let (cx, cy) = centers[i % k];
        data.push(cx + rng.random::<f32>() * 2.0 - 1.0);
        data.push(cy + rng.random::<f32>() * 2.0 - 1.0);
    }
    PointStore::new(2, data).unwrap()
}

fn bench_dbscan(c: &mut Criterion) {
    let mut group = c.benchmark_group("dbscan");
    group.sample_size(10);

    let mut rng = StdRng::seed_from_u64(42);
    let small = blobs(1_000, 5, &mut rng);
    let large = blobs(20_000, 20, &mut rng);

    let model = Dbscan::new(0.3, 4);
    let seeded = model.clone().with_lsh_params(LshParams {
        seed: Some(42),
        ..Default::default()
    });

    group.bench_function("brute_force_n1000", |b| {
        b.iter(|| model.fit_brute_force(black_box(&small)).unwrap())
    });
    group.bench_function("grid_n1000", |b| {
        b.iter(|| model.fit_grid(black_box(&small)).unwrap())
    });
    group.bench_function("grid_n20000", |b| {
        b.iter(|| model.fit_grid(black_box(&large)).unwrap())
    });
    group.bench_function("approximate_n20000", |b| {
        b.iter(|| seeded.fit_approximate(black_box(&large)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_dbscan);
criterion_main!(benches);
