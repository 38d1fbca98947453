//! Benchmarks for the per-load and per-frame hot paths:
//! - dataset build (row filtering, join, classification)
//! - prefix search on every keystroke
//! - choropleth render of a full frame
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gdp_map::data::BoundaryFeature;
use gdp_map::dataset::{DatasetBuilder, Indicator, RawRow};
use gdp_map::map::{Choropleth, MapRenderer, Viewport};

/// Synthetic world: a grid of square countries with ten years of data
fn synthetic(count: usize) -> (Vec<BoundaryFeature>, Vec<RawRow>, Vec<RawRow>) {
    let mut boundaries = Vec::with_capacity(count);
    let mut gdp = Vec::with_capacity(count);
    let mut population = Vec::with_capacity(count);

    let side = (count as f64).sqrt().ceil() as usize;
    let step_lon = 360.0 / side as f64;
    let step_lat = 160.0 / side as f64;

    for i in 0..count {
        let code = format!("C{i:03}");
        let name = format!("Country {i}");
        let x0 = -180.0 + (i % side) as f64 * step_lon;
        let y0 = -80.0 + (i / side) as f64 * step_lat;
        let mut feature = BoundaryFeature::named(&name, &code);
        feature.polygons = vec![vec![vec![
            (x0, y0),
            (x0 + step_lon, y0),
            (x0 + step_lon, y0 + step_lat),
            (x0, y0 + step_lat),
            (x0, y0),
        ]]];
        boundaries.push(feature);

        let mut g = RawRow::new();
        let mut p = RawRow::new();
        g.insert("Country Code".into(), code.clone());
        p.insert("Country Code".into(), code);
        for year in 2009..=2018 {
            let scale = (i % 7) as i32;
            g.insert(year.to_string(), format!("{}", 10f64.powi(8 + scale) * 1.5));
            p.insert(year.to_string(), format!("{}", 10f64.powi(4 + scale) * 2.5));
        }
        gdp.push(g);
        population.push(p);
    }

    (boundaries, gdp, population)
}

fn bench_dataset_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset_build");

    for count in [50, 250] {
        let (boundaries, gdp, population) = synthetic(count);
        let builder = DatasetBuilder::default();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| builder.build(black_box(&boundaries), black_box(&gdp), black_box(&population)))
        });
    }

    group.finish();
}

fn bench_prefix_search(c: &mut Criterion) {
    let (boundaries, gdp, population) = synthetic(250);
    let dataset = DatasetBuilder::default().build(&boundaries, &gdp, &population);

    let mut group = c.benchmark_group("prefix_search");
    for query in ["C", "Country 1", "Country 24", "Nowhere"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, q| {
            b.iter(|| dataset.search.prefix(black_box(q)))
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let (boundaries, gdp, population) = synthetic(250);
    let dataset = DatasetBuilder::default().build(&boundaries, &gdp, &population);
    let renderer = MapRenderer::from_boundaries(&boundaries);
    let bins = dataset.bins(Indicator::Gdp);
    let style = Choropleth {
        bins: &bins,
        bin_count: dataset.gdp_scale.bins(),
        highlight: Some(10),
        label: Some((10, "Country 10")),
    };

    let mut group = c.benchmark_group("render");

    // Typical terminal: 160x48 chars -> 320x192 braille pixels
    let world = Viewport::world(320, 192);
    group.bench_function("world_160x48", |b| {
        b.iter(|| renderer.render(160, 48, black_box(&world), &style))
    });

    let zoomed = Viewport::new(10.0, 20.0, 8.0, 320, 192);
    group.bench_function("zoomed_160x48", |b| {
        b.iter(|| renderer.render(160, 48, black_box(&zoomed), &style))
    });

    group.finish();
}

criterion_group!(benches, bench_dataset_build, bench_prefix_search, bench_render);
criterion_main!(benches);
