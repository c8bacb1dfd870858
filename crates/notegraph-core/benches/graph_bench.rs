//! # Graph Benchmarks
//!
//! Performance benchmarks for notegraph-core scanning, graph building and
//! traversal.
//!
//! Run with: `cargo bench -p notegraph-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use notegraph_core::{Note, NoteGraph, ScanOptions, Vault};
use std::hint::black_box;
use std::path::PathBuf;
use tempfile::TempDir;

/// Note `i` links to `i + 1` through a `NEXT` property and to `i * 7 % size`
/// in its body.
fn note_text(i: usize, size: usize) -> String {
    format!(
        "---\ntitle: Note {i}\nNEXT:\n  - \"[[N{}]]\"\n---\nSee [[N{}]].\n",
        (i + 1) % size,
        (i * 7) % size
    )
}

/// Create an in-memory vault of `size` notes.
fn create_vault(size: usize) -> Vault {
    let notes = (0..size)
        .map(|i| Note::parse(PathBuf::from(format!("N{i}.md")), &note_text(i, size)))
        .collect();
    Vault::from_notes(PathBuf::from("."), notes, Vec::new())
}

/// Write a vault of `size` notes to a temporary directory.
fn create_vault_on_disk(size: usize) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for i in 0..size {
        std::fs::write(dir.path().join(format!("N{i}.md")), note_text(i, size)).expect("write");
    }
    dir
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for size in [100, 1000].iter() {
        let dir = create_vault_on_disk(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(Vault::scan(dir.path(), &ScanOptions::default())));
        });
    }

    group.finish();
}

fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for size in [100, 1000, 5000].iter() {
        let vault = create_vault(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(NoteGraph::build(&vault)));
        });
    }

    group.finish();
}

fn bench_bfs(c: &mut Criterion) {
    let mut group = c.benchmark_group("bfs");

    for size in [100, 1000, 5000].iter() {
        let vault = create_vault(*size);
        let graph = NoteGraph::build(&vault);

        group.bench_with_input(BenchmarkId::new("hops_2", size), &2usize, |b, &hops| {
            b.iter(|| black_box(graph.bfs(&vault, "N0", hops)));
        });

        group.bench_with_input(BenchmarkId::new("hops_10", size), &10usize, |b, &hops| {
            b.iter(|| black_box(graph.bfs(&vault, "N0", hops)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan, bench_graph_build, bench_bfs);
criterion_main!(benches);
