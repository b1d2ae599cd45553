//! Criterion benchmarks for the relay envelope codec.
//!
//! Every broadcast encodes exactly one envelope, so encoding cost is paid
//! once per inbound message regardless of how many receivers are connected.
//!
//! Run with:
//! ```bash
//! cargo bench --package relay-core --bench envelope_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relay_core::{decode_envelope, encode_envelope, Envelope};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_envelope");
    for size in [16usize, 256, 4096, 65536] {
        let payload = vec![b'a'; size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, p| {
            b.iter(|| encode_envelope(&Envelope::relayed(black_box(p))).unwrap())
        });
    }
    group.finish();
}

fn bench_encode_escaped(c: &mut Criterion) {
    // Quotes and control characters force the escaping path.
    let payload = "\"quoted\"\n\ttab ".repeat(64).into_bytes();
    c.bench_function("encode_envelope_escaped", |b| {
        b.iter(|| encode_envelope(&Envelope::relayed(black_box(&payload))).unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let text = encode_envelope(&Envelope::relayed(&[b'z'; 1024])).unwrap();
    c.bench_function("decode_envelope_1k", |b| {
        b.iter(|| decode_envelope(black_box(&text)).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_encode_escaped, bench_decode);
criterion_main!(benches);
