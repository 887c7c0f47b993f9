use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use surfcrate_core::Point3f;
use surfcrate_fairing::{fair, FairingConfig, IntegrationScheme, LaplacianKind};

const GRID_SIZES: [usize; 3] = [16, 32, 64];

/// Wavy height field over an `n` x `n` vertex grid
fn wavy_grid(n: usize) -> (Vec<Point3f>, Vec<[usize; 3]>) {
    let mut positions = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let z = 0.1 * ((x as f32 * 0.7).sin() + (y as f32 * 1.3).cos());
            positions.push(Point3f::new(x as f32, y as f32, z));
        }
    }
    let mut faces = Vec::with_capacity(2 * (n - 1) * (n - 1));
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let v = y * n + x;
            faces.push([v, v + 1, v + n + 1]);
            faces.push([v, v + n + 1, v + n]);
        }
    }
    (positions, faces)
}

fn fairing(c: &mut Criterion) {
    let mut g = c.benchmark_group("fairing");
    g.sample_size(10);

    let configs = [
        ("uniform", FairingConfig::default()),
        (
            "cotangent",
            FairingConfig::default().with_operator(LaplacianKind::Cotangent),
        ),
        (
            "cotangent semi-implicit",
            FairingConfig::default()
                .with_operator(LaplacianKind::Cotangent)
                .with_scheme(IntegrationScheme::SemiImplicit),
        ),
    ];

    for n in GRID_SIZES {
        let mesh = wavy_grid(n);
        for (name, config) in &configs {
            let config = config.with_iterations(10).with_step_size(0.01);
            g.bench_with_input(BenchmarkId::new(*name, n), &mesh, |b, (positions, faces)| {
                b.iter(|| fair(std::hint::black_box(positions), std::hint::black_box(faces), &config).unwrap());
            });
        }
    }

    g.finish();
}

criterion_group!(benches, fairing);
criterion_main!(benches);
