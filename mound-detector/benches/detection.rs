use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mound_detector::{ExtremaDetector, Smoother};
use pcd_core::raster::{ElevationRaster, GeoTransform};

fn synthetic_surface(size: usize) -> ElevationRaster {
    let mut data = Vec::with_capacity(size * size);
    for r in 0..size {
        for c in 0..size {
            let ripple = ((r as f64 * 0.21).sin() + (c as f64 * 0.17).cos()) * 4.0;
            data.push(640.0 + ripple + ((r * 31 + c * 17) % 7) as f64 * 0.1);
        }
    }
    ElevationRaster::new(
        size,
        size,
        data,
        GeoTransform::north_up(-83.44, 39.38, 1e-5, -1e-5),
    )
    .expect("valid raster")
}

fn bench_smoother(c: &mut Criterion) {
    let surface = synthetic_surface(256);
    let smoother = Smoother::new(2.0).expect("valid sigma");

    c.bench_function("gaussian_sigma2_256x256", |b| {
        b.iter(|| {
            let out = smoother.smooth(black_box(&surface)).expect("smoothed");
            black_box(out);
        });
    });
}

fn bench_extrema(c: &mut Criterion) {
    let smoothed = Smoother::new(2.0)
        .expect("valid sigma")
        .smooth(&synthetic_surface(256))
        .expect("smoothed");
    let detector = ExtremaDetector::new(642.0);

    c.bench_function("extrema_min_distance1_256x256", |b| {
        b.iter(|| {
            let peaks = detector.detect(black_box(&smoothed)).expect("detected");
            black_box(peaks);
        });
    });
}

criterion_group!(benches, bench_smoother, bench_extrema);
criterion_main!(benches);
