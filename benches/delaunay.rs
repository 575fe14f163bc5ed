use alpha_shapes::alpha_shape;
use alpha_shapes::delaunay::{self, voronoi, Point};
use alpha_shapes::models::PointCloud;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn generate_random_points(n: usize, width: f64, height: f64) -> Vec<Point> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut points = Vec::with_capacity(n);

    for _ in 0..n {
        let x = rng.random_range(0.0..width);
        let y = rng.random_range(0.0..height);
        points.push(Point::new(x, y));
    }

    points
}

// 坏三角形是全量扫描，点数再大就只是在测平方复杂度
const SIZES: [usize; 3] = [100, 500, 2000];

fn bench_delaunay(c: &mut Criterion) {
    let mut group = c.benchmark_group("Delaunay Triangulation");

    for &n in &SIZES {
        group.bench_function(format!("triangulate_{}", n), |b| {
            let points = generate_random_points(n, 1000.0, 1000.0);
            b.iter(|| {
                black_box(delaunay::triangulate(&points));
            });
        });
    }

    group.finish();
}

fn bench_voronoi(c: &mut Criterion) {
    let mut group = c.benchmark_group("Voronoi Diagram");

    for &n in &SIZES {
        group.bench_function(format!("voronoi_{}", n), |b| {
            let points = generate_random_points(n, 1000.0, 1000.0);
            let triangles = delaunay::triangulate(&points).real_triangles();
            b.iter(|| {
                let _ = black_box(voronoi::compute_voronoi(&triangles, &points));
            });
        });
    }

    group.finish();
}

fn bench_alpha(c: &mut Criterion) {
    let mut group = c.benchmark_group("Alpha Shape");

    for &n in &SIZES {
        group.bench_function(format!("classify_{}", n), |b| {
            let points = generate_random_points(n, 1000.0, 1000.0);
            let triangles = delaunay::triangulate(&points).real_triangles();
            b.iter(|| {
                black_box(alpha_shape::classify(&triangles, &points, 0.05))
            });
        });
    }

    group.bench_function("drag_rebuild_500", |b| {
        let mut cloud = PointCloud::new(generate_random_points(500, 1000.0, 1000.0));
        let mut step = 0.0;
        b.iter(|| {
            step += 0.5;
            let _ = cloud.move_selected(0, 500.0 + step % 50.0, 500.0);
            black_box(cloud.triangles().len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_delaunay, bench_voronoi, bench_alpha);
criterion_main!(benches);
