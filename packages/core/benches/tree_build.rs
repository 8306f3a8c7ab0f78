//! Performance benchmarks for the page tree
//!
//! Run with: `cargo bench -p pagespace-core`
//!
//! These benchmarks measure the work done on every list change:
//! - Forest construction from flat rows
//! - Flattening to visible rows with everything expanded
//! - Drop placement against a wide sibling set

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagespace_core::tree::{build_forest, compute_placement, flatten_visible};
use pagespace_core::{DropTargetId, DropZone, NewPage, Page};
use std::collections::HashSet;

/// `count` pages, each root followed by a chain of three descendants
fn generate_pages(count: usize) -> Vec<Page> {
    let mut pages = Vec::with_capacity(count);
    for i in 0..count {
        let parent_id = if i % 4 == 0 {
            None
        } else {
            Some(format!("page-{}", i - 1))
        };
        let mut page = Page::from_new(
            NewPage::new("bench-user", parent_id, (count - i) as f64).with_title(format!("Page {}", i)),
        );
        page.id = format!("page-{}", i);
        pages.push(page);
    }
    pages
}

fn bench_build_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_forest");

    for size in [100, 1000, 5000] {
        let pages = generate_pages(size);
        group.bench_function(format!("{}_pages", size), |b| {
            b.iter(|| build_forest(black_box(&pages)))
        });
    }

    group.finish();
}

fn bench_flatten_visible(c: &mut Criterion) {
    let pages = generate_pages(1000);
    let forest = build_forest(&pages);
    let expanded: HashSet<String> = pages.iter().map(|page| page.id.clone()).collect();

    c.bench_function("flatten_1000_expanded", |b| {
        b.iter(|| flatten_visible(black_box(&forest), black_box(&expanded)))
    });
}

fn bench_compute_placement(c: &mut Criterion) {
    let pages = generate_pages(1000);
    let target = DropTargetId::Page("page-500".to_string());

    c.bench_function("placement_before_in_1000", |b| {
        b.iter(|| compute_placement(black_box(&pages), "page-4", &target, DropZone::Before))
    });
}

criterion_group!(
    benches,
    bench_build_forest,
    bench_flatten_visible,
    bench_compute_placement
);
criterion_main!(benches);
