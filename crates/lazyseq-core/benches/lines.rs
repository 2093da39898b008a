//! Criterion benchmarks: lazy prefix reads against eager full reads.

use std::io::{BufWriter, Write};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use lazyseq_core::{count_to, lines, read_lines_eagerly, ClosableSource, ReaderOptions};

fn fixture(total: usize) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut out = BufWriter::new(file.reopen().unwrap());
    for n in 1..=total {
        writeln!(out, "Line {n}: the quick brown fox jumps over the lazy dog").unwrap();
    }
    out.flush().unwrap();
    file
}

fn bench_first_lines(c: &mut Criterion) {
    let sizes = [1_000usize, 10_000, 100_000];
    let opts = ReaderOptions::default();

    let mut group = c.benchmark_group("FirstTenLines");
    for &size in &sizes {
        let file = fixture(size);
        group.bench_with_input(BenchmarkId::new("lazy", size), &size, |b, _| {
            b.iter(|| lines(file.path()).take(10).count());
        });
        group.bench_with_input(BenchmarkId::new("eager", size), &size, |b, _| {
            b.iter(|| {
                read_lines_eagerly(file.path(), &opts)
                    .unwrap()
                    .into_iter()
                    .take(10)
                    .count()
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("ReadToString");
    for &size in &sizes {
        let file = fixture(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                ClosableSource::open(file.path(), &opts)
                    .unwrap()
                    .read_to_string()
                    .unwrap()
                    .len()
            });
        });
    }
    group.finish();
}

fn bench_counter(c: &mut Criterion) {
    c.bench_function("count_to_10000", |b| b.iter(|| count_to(10_000).sum::<u64>()));
}

criterion_group!(benches, bench_first_lines, bench_counter);
criterion_main!(benches);
