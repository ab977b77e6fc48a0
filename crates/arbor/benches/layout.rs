//! Layout and input benchmarks for arbor.

use std::hint::black_box;

use arbor::{
    Core, NodeId, Result,
    geom::{Expanse, Point, Rect},
    grid::{Grid, Proportion},
    testing::{Harness, Probe},
    widgets::{ScrollViewer, StackPanel},
};
use criterion::{Criterion, criterion_group, criterion_main};

/// Cells per grid side.
const SIDE: i64 = 32;

/// Build a square grid of probes with mixed track proportions.
fn build_grid(core: &mut Core, parent: NodeId) -> Result<NodeId> {
    let tracks: Vec<Proportion> = (0..SIDE)
        .map(|i| match i % 4 {
            0 => Proportion::Auto,
            1 => Proportion::Pixels(12),
            2 => Proportion::Part(2.0),
            _ => Proportion::Fill,
        })
        .collect();
    let grid = core
        .add(Grid::new().with_columns(&tracks)?.with_rows(&tracks)?.with_spacing(1, 1))
        .id();
    core.attach(parent, grid)?;
    for row in 0..SIDE {
        for column in 0..SIDE {
            let cell = core.add(Probe::sized(5 + (column % 7) as u32, 3)).id();
            core.attach(grid, cell)?;
            core.try_update_props(cell, |p| p.set_grid(column, row))?;
        }
    }
    Ok(grid)
}

/// Benchmark a full relayout of a large grid.
fn benchmark_grid_layout(c: &mut Criterion) {
    let mut core = Core::new();
    let root = core.root_id();
    let grid = build_grid(&mut core, root).expect("Failed to build grid");
    c.bench_function("grid_full_layout", |b| {
        let mut width = 800;
        b.iter(|| {
            // Alternate the width so the arrange cache never short-circuits.
            width = if width == 800 { 801 } else { 800 };
            core.invalidate_measure(grid);
            core.update_layout(Rect::new(0, 0, width, 600));
            black_box(core.desired_size(grid));
        });
    });
}

/// Benchmark a layout pass where nothing changed.
fn benchmark_clean_layout(c: &mut Criterion) {
    let mut core = Core::new();
    let root = core.root_id();
    build_grid(&mut core, root).expect("Failed to build grid");
    core.update_layout(Rect::new(0, 0, 800, 600));
    c.bench_function("grid_clean_layout", |b| {
        b.iter(|| core.update_layout(black_box(Rect::new(0, 0, 800, 600))));
    });
}

/// Benchmark pointer traffic over a scrolled stack.
fn benchmark_pointer_routing(c: &mut Criterion) {
    let mut h = Harness::new(Expanse::new(200, 200));
    let core = h.core_mut();
    let viewer = core.add(ScrollViewer::vertical()).id();
    core.attach(core.root_id(), viewer).expect("Failed to attach viewer");
    let stack = core.add(StackPanel::vertical()).id();
    core.attach(viewer, stack).expect("Failed to attach stack");
    for _ in 0..500 {
        let row = core.add(Probe::sized(200, 10).with_focus()).id();
        core.attach(stack, row).expect("Failed to attach row");
    }
    h.layout();
    h.core_mut().scroll_to(viewer, Point::new(0, 2000));

    c.bench_function("pointer_click_scrolled", |b| {
        let mut y = 0;
        b.iter(|| {
            y = (y + 7) % 200;
            h.click(Point::new(50, y)).expect("Failed to click");
        });
    });
}

criterion_group!(
    benches,
    benchmark_grid_layout,
    benchmark_clean_layout,
    benchmark_pointer_routing
);
criterion_main!(benches);
