//! Benchmarks for the byte-to-reading path
//!
//! Measures framing alone and framing plus parsing over a mixed stream, fed in
//! chunk sizes typical of TCP reads and UDP datagrams.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sailstream::nmea::{SentenceFramer, parse_sentence};
use sailstream::test_utils::mixed_stream;
use std::hint::black_box;

fn bench_framing(c: &mut Criterion) {
    let stream = mixed_stream(1_000);
    let mut group = c.benchmark_group("framing");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    for chunk_size in [64usize, 512, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk_size), &chunk_size, |b, &size| {
            b.iter(|| {
                let mut framer = SentenceFramer::new();
                let mut count = 0;
                for chunk in stream.chunks(size) {
                    count += framer.push(black_box(chunk)).sentences.len();
                }
                black_box(count)
            })
        });
    }

    group.finish();
}

fn bench_frame_and_parse(c: &mut Criterion) {
    let stream = mixed_stream(1_000);
    let mut group = c.benchmark_group("frame_and_parse");
    group.throughput(Throughput::Elements(1_000));

    group.bench_function("4096_byte_chunks", |b| {
        b.iter(|| {
            let mut framer = SentenceFramer::new();
            let mut readings = 0;
            for chunk in stream.chunks(4096) {
                for sentence in framer.push(chunk).sentences {
                    if let Ok(outcome) = parse_sentence(&sentence) {
                        readings += outcome.into_reading().is_some() as usize;
                    }
                }
            }
            black_box(readings)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_framing, bench_frame_and_parse);
criterion_main!(benches);
