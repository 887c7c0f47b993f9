//! Benchmarks comparing KdTree against BruteForceSearch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use surfcrate_algorithms::{BruteForceSearch, KdTree};
use surfcrate_core::{NearestNeighborSearch, Point3f};

fn generate_cloud(size: usize) -> Vec<Point3f> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..size)
        .map(|_| Point3f::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");

    for &size in &[1_000, 10_000, 100_000] {
        let points = generate_cloud(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| black_box(KdTree::new(black_box(points))));
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_queries");
    let queries = generate_cloud(100);

    for &size in &[1_000, 10_000] {
        let points = generate_cloud(size);
        let tree = KdTree::new(&points);
        let brute = BruteForceSearch::new(&points);

        group.bench_with_input(BenchmarkId::new("radius_kdtree", size), &tree, |b, tree| {
            b.iter(|| {
                for q in &queries {
                    black_box(tree.find_radius_neighbors(q, 0.1));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("radius_brute_force", size), &brute, |b, brute| {
            b.iter(|| {
                for q in &queries {
                    black_box(brute.find_radius_neighbors(q, 0.1));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("knn8_kdtree", size), &tree, |b, tree| {
            b.iter(|| {
                for q in &queries {
                    black_box(tree.find_k_nearest(q, 8));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
