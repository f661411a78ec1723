//! Benchmarks for tile rasterization.
//!
//! Compares the generic per-pixel path with the separable fast path, and
//! nearest-neighbor with IDW interpolation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};

use coverage_common::crs::CRS84_URI;
use coverage_common::{BoundingBox, TileCoord};
use grid_processor::{indices_of_nearest, GridDomain, InterpolationMethod, ParameterRange};
use projection::WebMercator;
use renderer::{render_tile_with, GridSource, PaletteRegistry, RasterPath, RenderStyle};

fn global_grid(step: f64) -> (GridDomain, ParameterRange) {
    let nx = (360.0 / step) as usize;
    let ny = (180.0 / step) as usize;
    let lon = (0..nx).map(|i| -180.0 + step / 2.0 + i as f64 * step).collect();
    let lat = (0..ny).map(|i| -90.0 + step / 2.0 + i as f64 * step).collect();
    let domain = GridDomain::new(CRS84_URI, lon, lat, Some(BoundingBox::new(-180.0, -90.0, 180.0, 90.0))).unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let values = (0..nx * ny)
        .map(|_| if rng.gen_bool(0.05) { None } else { Some(rng.gen_range(-2.0..30.0)) })
        .collect();
    let range = ParameterRange::new(&domain, values).unwrap();
    (domain, range)
}

fn bench_paths(c: &mut Criterion) {
    let (domain, range) = global_grid(0.25);
    let registry = PaletteRegistry::with_defaults();
    let palette = registry.get("blues").unwrap();
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    let req = TileCoord::new(3, 4, 2).request(256);

    let mut group = c.benchmark_group("render_tile_256");
    for method in InterpolationMethod::ALL {
        let style = RenderStyle {
            projection: &WebMercator,
            palette,
            interpolation: method,
        };
        for path in [RasterPath::Generic, RasterPath::Separable] {
            group.bench_with_input(
                BenchmarkId::new(method.key(), path.as_str()),
                &path,
                |b, &path| b.iter(|| render_tile_with(black_box(&source), &style, &req, path)),
            );
        }
    }
    group.finish();
}

fn bench_locator(c: &mut Criterion) {
    let axis: Vec<f64> = (0..1440).map(|i| -179.875 + i as f64 * 0.25).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let queries: Vec<f64> = (0..1024).map(|_| rng.gen_range(-185.0..185.0)).collect();

    c.bench_function("indices_of_nearest_1440", |b| {
        b.iter(|| {
            for &q in &queries {
                black_box(indices_of_nearest(black_box(&axis), q));
            }
        })
    });
}

fn bench_png(c: &mut Criterion) {
    let (domain, range) = global_grid(1.0);
    let registry = PaletteRegistry::with_defaults();
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    let style = RenderStyle {
        projection: &WebMercator,
        palette: registry.get("rainbow").unwrap(),
        interpolation: InterpolationMethod::NearestNeighbor,
    };
    let tile = render_tile_with(&source, &style, &TileCoord::new(1, 0, 0).request(256), RasterPath::Auto);

    c.bench_function("tile_to_png_256", |b| b.iter(|| black_box(tile.to_png().unwrap())));
}

criterion_group!(benches, bench_paths, bench_locator, bench_png);
criterion_main!(benches);
