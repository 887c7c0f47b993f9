//! Benchmarks for lattice sampling and isosurface extraction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use surfcrate_core::{Aabb, NormalPoint3f, NormalPointCloud3f, Point3f, Vector3f};
use surfcrate_reconstruction::{
    ExtractionVariant, Lattice, MarchingCubes, MarchingCubesConfig, ReconstructionConfig, ReconstructionSession,
    SampledGrid,
};

fn sphere(p: &Point3f) -> f32 {
    p.coords.norm() - 0.7
}

fn generate_sphere_cloud(num_points: usize) -> NormalPointCloud3f {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    (0..num_points)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f32 + 0.5) / num_points as f32;
            let ring = (1.0 - z * z).sqrt();
            let theta = golden_angle * i as f32;
            let normal = Vector3f::new(ring * theta.cos(), ring * theta.sin(), z);
            NormalPoint3f::new(Point3f::origin() + normal, normal)
        })
        .collect()
}

fn bench_analytic_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("marching_cubes_analytic");
    let bounds = Aabb::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));

    for &n in &[16, 32, 64] {
        let grid = SampledGrid::sample(Lattice::new(bounds, [n, n, n]).unwrap(), &sphere);
        for variant in [ExtractionVariant::Standard, ExtractionVariant::FeaturePreserving] {
            let mc = MarchingCubes::new(MarchingCubesConfig::default().with_variant(variant));
            group.bench_with_input(BenchmarkId::new(format!("{:?}", variant), n), &grid, |b, grid| {
                b.iter(|| black_box(mc.extract(black_box(grid), &sphere).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruction_session");
    group.sample_size(10);

    for &points in &[500, 2000] {
        let cloud = generate_sphere_cloud(points);
        let config = ReconstructionConfig::default().with_resolution([20, 20, 20]);
        group.bench_with_input(BenchmarkId::from_parameter(points), &cloud, |b, cloud| {
            b.iter(|| black_box(ReconstructionSession::new(cloud.clone(), config.clone()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analytic_extraction, bench_session);
criterion_main!(benches);
