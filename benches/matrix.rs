//! Benchmarks for matrix building and state derivation.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cellgrid::state::{handle_key_down, set_viewport};
use cellgrid::templates::keys::{self, KeyChord};
use cellgrid::{
    derive_state, Cell, CellLocation, CellMatrix, ColumnDef, GridProps, PropsHandle, RowDef,
    State, Viewport,
};

fn grid(rows: usize, columns: usize) -> GridProps {
    GridProps::new(
        (0..rows)
            .map(|r| {
                RowDef::new(format!("r{r}"))
                    .with_height(if r % 7 == 0 { 40.0 } else { 0.0 })
                    .with_cells(
                        (0..columns)
                            .map(|c| match c % 3 {
                                0 => Cell::text(format!("{r}:{c}")),
                                1 => Cell::number((r * c) as f64),
                                _ => Cell::checkbox(r % 2 == 0),
                            })
                            .collect(),
                    )
            })
            .collect(),
        (0..columns).map(|c| ColumnDef::new(format!("c{c}"))).collect(),
    )
    .with_sticky(1, 1)
    .with_focus(CellLocation::new("r0", "c0"))
}

/// Matrix construction at increasing sizes
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_matrix");
    for rows in [100usize, 1_000, 10_000] {
        let handle = PropsHandle::new(grid(rows, 20));
        group.throughput(Throughput::Elements((rows * 20) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &handle, |b, handle| {
            b.iter(|| CellMatrix::build(black_box(handle)).expect("valid grid"))
        });
    }
    group.finish();
}

/// A pass with an unchanged handle should cost next to nothing
fn bench_derive_unchanged(c: &mut Criterion) {
    let handle = PropsHandle::new(grid(5_000, 20));
    let state = set_viewport(
        derive_state(&handle, State::new()),
        Viewport::new(1280.0, 720.0),
    );
    c.bench_function("derive_unchanged", |b| {
        b.iter(|| derive_state(black_box(&handle), state.clone()))
    });
}

/// A pass after the host replaced the definition
fn bench_derive_changed(c: &mut Criterion) {
    let first = PropsHandle::new(grid(5_000, 20));
    let state = set_viewport(derive_state(&first, State::new()), Viewport::new(1280.0, 720.0));
    let next = PropsHandle::new(grid(5_000, 20));
    c.bench_function("derive_changed", |b| {
        b.iter(|| derive_state(black_box(&next), state.clone()))
    });
}

/// Page-down navigation through a large grid
fn bench_navigation(c: &mut Criterion) {
    let handle = PropsHandle::new(grid(5_000, 20));
    let state = set_viewport(derive_state(&handle, State::new()), Viewport::new(1280.0, 720.0));
    c.bench_function("page_down", |b| {
        b.iter(|| handle_key_down(state.clone(), black_box(KeyChord::plain(keys::PAGE_DOWN))))
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_derive_unchanged,
    bench_derive_changed,
    bench_navigation
);
criterion_main!(benches);
