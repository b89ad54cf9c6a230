//! Benchmarks for attribute kernels, filters, spectra and section batches.
//!
//! Run with: cargo bench --package attribute-engine --bench attribute_benchmarks

use attribute_engine::filters::{first_derivative, median_filter, uniform_filter};
use attribute_engine::{
    compute_sections, slice_at, spectrum, Attribute, AttributeEngine, AttributeKind,
    AttributeParams, AttributeRequest, EngineConfig, SectionRequest, Window,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seismic_common::{CubeAxis, SampleInterval, SliceAxis};
use test_utils::{create_dipping_reflector, create_noise_cube, shapes};

fn bench_cube() -> ndarray::Array3<f32> {
    let (ni, nj, nk) = shapes::BENCH;
    create_noise_cube(ni, nj, nk, 42)
}

fn attribute(class: &str, name: &str, params: &str) -> Attribute {
    let kind = AttributeKind::lookup(class, name).unwrap();
    Attribute::from_params(kind, &AttributeParams::from_json(params).unwrap()).unwrap()
}

// =============================================================================
// FILTER BENCHMARKS
// =============================================================================

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");
    let cube = bench_cube();
    group.throughput(Throughput::Elements(cube.len() as u64));

    group.bench_function("first_derivative_samples", |b| {
        b.iter(|| first_derivative(black_box(cube.view()), CubeAxis::Sample));
    });

    for dims in [[3, 3, 3], [3, 3, 9], [5, 5, 15]] {
        let window = Window::new(dims).unwrap();
        group.bench_with_input(BenchmarkId::new("uniform", window), &window, |b, &w| {
            b.iter(|| uniform_filter(black_box(cube.view()), w));
        });
    }

    group.sample_size(20);
    group.bench_function("median_3x3x3", |b| {
        b.iter(|| median_filter(black_box(cube.view()), Window::CUBE));
    });

    group.finish();
}

// =============================================================================
// KERNEL BENCHMARKS
// =============================================================================

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernels");
    group.sample_size(20);
    let cube = bench_cube();
    let engine = AttributeEngine::default();
    group.throughput(Throughput::Elements(cube.len() as u64));

    let cases = [
        ("Amplitude", "rms", "{}"),
        ("Amplitude", "agc", "{}"),
        ("CompleTrace", "enve", "{}"),
        ("CompleTrace", "infreq", "{}"),
        ("DipAzm", "dipgrad", "{}"),
        ("DipAzm", "gstdip3d", "{}"),
        ("EdgeDetection", "semblance", "{}"),
        ("EdgeDetection", "eigen", "{}"),
        ("EdgeDetection", "chaos", "{}"),
        ("NoiseReduction", "gaussian", "{}"),
        ("Frequency", "cwt_ricker", r#"{"frequency": 25}"#),
        ("Frequency", "bandpass", r#"{"frequencies": [10, 40]}"#),
    ];

    for (class, name, params) in cases {
        let request = AttributeRequest::volume(attribute(class, name, params));
        group.bench_with_input(BenchmarkId::new(class, name), &request, |b, request| {
            b.iter(|| engine.compute(black_box(&cube), request).unwrap());
        });
    }

    group.finish();
}

// =============================================================================
// SECTION BENCHMARKS
// =============================================================================

fn bench_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("sections");
    group.sample_size(20);
    let (ni, nj, nk) = shapes::BENCH;
    let cube = create_dipping_reflector((ni, nj, nk), 40.0, 0.5, 0.25, 25.0, 0.004);
    let semblance = attribute("EdgeDetection", "semblance", "{}");
    let request = AttributeRequest::section(semblance, SectionRequest::at_index(SliceAxis::Inline, ni / 2));

    let exact = AttributeEngine::default();
    let preview = AttributeEngine::new(EngineConfig {
        exact_sections: false,
        ..Default::default()
    })
    .unwrap();

    group.bench_function("semblance_exact", |b| {
        b.iter(|| exact.compute(black_box(&cube), &request).unwrap());
    });
    group.bench_function("semblance_preview", |b| {
        b.iter(|| preview.compute(black_box(&cube), &request).unwrap());
    });

    let indices: Vec<usize> = (0..nk).step_by(8).collect();
    for (label, engine) in [("exact", &exact), ("preview", &preview)] {
        group.bench_with_input(
            BenchmarkId::new("timeslice_batch", label),
            &indices,
            |b, indices| {
                b.iter(|| {
                    compute_sections(engine, &cube, SliceAxis::Timeslice, indices, &semblance).unwrap()
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// SPECTRUM BENCHMARKS
// =============================================================================

fn bench_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectrum");
    let cube = bench_cube();

    group.bench_function("cube", |b| {
        b.iter(|| spectrum(black_box(cube.view().into_dyn()), SampleInterval::FOUR_MS).unwrap());
    });

    let section = slice_at(cube.view(), SliceAxis::Inline, 0).unwrap();
    group.bench_function("inline_section", |b| {
        b.iter(|| spectrum(black_box(section.view().into_dyn()), SampleInterval::FOUR_MS).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_filters, bench_kernels, bench_sections, bench_spectrum);
criterion_main!(benches);
