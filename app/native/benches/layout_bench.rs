//! Benchmarks for the scatter layout calculation.
//!
//! Run with: `cargo bench -p scatter`
//!
//! Results are saved to `target/criterion/` with HTML reports.
//!
//! ## Benchmark Groups
//!
//! - `layout`: Full layout calculation at various window counts
//! - `layout_4k`: Full layout calculation on a 4K canvas
//! - `packer`: Footprint packing alone
//! - `geometry`: Collision checks

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scatter_lib::scatter::geometry::{Rect, ScreenRect, Size};
use scatter_lib::scatter::layout::packer::Packer;
use scatter_lib::scatter::layout::{LayoutCalculator, overlaps_with_buffer};
use scatter_lib::scatter::window::{SourceWindow, WindowHandle};

// ============================================================================
// Test Data
// ============================================================================

/// A 1080p canvas.
const fn canvas_1080p() -> Size { Size::new(1920.0, 1080.0) }

/// A 4K canvas.
const fn canvas_4k() -> Size { Size::new(3840.0, 2160.0) }

/// Creates `count` windows of mixed sizes, cascaded like a busy desktop.
fn desktop(count: usize) -> Vec<SourceWindow> {
    const SIZES: [(i32, i32); 4] = [(1280, 720), (800, 600), (1600, 900), (640, 480)];

    (0_i32..)
        .zip(SIZES.iter().cycle())
        .take(count)
        .map(|(index, &(width, height))| {
            SourceWindow::new(
                WindowHandle(index as isize + 1),
                format!("Window {index}"),
                ScreenRect::from_origin_size(index * 35, index * 25, width, height),
            )
        })
        .collect()
}

/// Footprints sorted largest first, as the calculator hands them to the packer.
fn footprints(count: usize) -> Vec<Size> {
    let mut sizes: Vec<Size> = (0..count)
        .map(|i| Size::new(180.0 + (i % 5) as f64 * 60.0, 120.0 + (i % 3) as f64 * 50.0))
        .collect();
    sizes.sort_by(|a, b| b.area().total_cmp(&a.area()));
    sizes
}

// ============================================================================
// Layout Benchmarks
// ============================================================================

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let canvas = canvas_1080p();

    for count in [1, 2, 4, 8, 12, 20] {
        let windows = desktop(count);

        group.bench_with_input(BenchmarkId::new("calculate", count), &count, |b, _| {
            let mut calculator = LayoutCalculator::with_seed(42);
            b.iter(|| calculator.calculate(black_box(&windows), black_box(canvas)));
        });
    }

    group.finish();
}

fn bench_layout_4k(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_4k");
    let canvas = canvas_4k();

    for count in [8, 20] {
        let windows = desktop(count);

        group.bench_with_input(BenchmarkId::new("calculate", count), &count, |b, _| {
            let mut calculator = LayoutCalculator::with_seed(42);
            b.iter(|| calculator.calculate(black_box(&windows), black_box(canvas)));
        });
    }

    group.finish();
}

// ============================================================================
// Packer Benchmarks
// ============================================================================

fn bench_packer(c: &mut Criterion) {
    let mut group = c.benchmark_group("packer");
    let packer = Packer::new(canvas_1080p());

    for count in [4, 12, 20] {
        let sizes = footprints(count);

        group.bench_with_input(BenchmarkId::new("pack", count), &count, |b, _| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| packer.pack(black_box(&sizes), &mut rng));
        });
    }

    group.finish();
}

// ============================================================================
// Geometry Benchmarks
// ============================================================================

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");
    let a = Rect::new(100.0, 100.0, 400.0, 300.0);
    let b = Rect::new(505.0, 120.0, 300.0, 200.0);

    group.bench_function("overlaps_with_buffer", |bench| {
        bench.iter(|| overlaps_with_buffer(black_box(&a), black_box(&b)));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_layout, bench_layout_4k, bench_packer, bench_geometry);

criterion_main!(benches);
