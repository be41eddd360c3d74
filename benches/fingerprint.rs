//! Fingerprinting throughput benchmarks.
//!
//! Polls fingerprint a whole document on every tick, so this tracks how the
//! checksum scales with typical page sizes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use deploy_watch::core::fingerprint;

fn page_of_size(bytes: usize) -> String {
    let chunk = "<div class=\"row\"><script src=\"/assets/app.3f9a1c.js\"></script></div>\n";
    chunk.repeat(bytes / chunk.len() + 1)[..bytes].to_string()
}

/// Benchmark fingerprinting ASCII documents of increasing size
fn benchmark_fingerprint_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    for size in [1_024, 16 * 1_024, 256 * 1_024] {
        let page = page_of_size(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &page, |b, page| {
            b.iter(|| black_box(fingerprint(black_box(page))));
        });
    }

    group.finish();
}

/// Benchmark a document dominated by non-ASCII text
fn benchmark_fingerprint_unicode(c: &mut Criterion) {
    let page = "日本語のページ🙂".repeat(4_096);

    let mut group = c.benchmark_group("fingerprint_unicode");
    group.throughput(Throughput::Bytes(page.len() as u64));
    group.bench_function("mixed_width", |b| {
        b.iter(|| black_box(fingerprint(black_box(&page))));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_fingerprint_sizes,
    benchmark_fingerprint_unicode
);
criterion_main!(benches);
