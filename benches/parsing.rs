//! Benchmarks for ticker body decoding
//!
//! Target: >200 MB/s on a full bookTicker snapshot

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ticker_delta::exchanges::BookTicker;
use ticker_delta::parsing::{parse_f64_best_effort, RecordDecoder, Schema, StreamLimits};

/// Snapshot shaped like the Binance bookTicker endpoint
fn book_snapshot(n: usize) -> Vec<u8> {
    let mut body = String::from("[");
    for i in 0..n {
        if i > 0 {
            body.push(',');
        }
        body.push_str(&format!(
            r#"{{"symbol":"SYM{i}USDT","bidPrice":"{}.{:08}","bidQty":"12.50000000","askPrice":"{}.{:08}","askQty":"3.10000000"}}"#,
            100 + i,
            i * 7,
            100 + i,
            i * 7 + 1
        ));
    }
    body.push(']');
    body.into_bytes()
}

fn bench_decode_snapshot(c: &mut Criterion) {
    let schema = Schema::<BookTicker>::build().unwrap();
    let body = book_snapshot(2000);

    let mut group = c.benchmark_group("decode_snapshot");
    group.throughput(Throughput::Bytes(body.len() as u64));

    for window in [256usize, 1500, 16 * 1024] {
        let limits = StreamLimits {
            window_capacity: window,
            ..StreamLimits::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(window), &limits, |b, limits| {
            b.iter(|| {
                let mut sum = 0.0;
                let mut decoder = RecordDecoder::with_limits(&schema, black_box(&body[..]), 1, limits);
                let n = decoder
                    .read(|t| {
                        sum += t.bid;
                        Ok::<_, ()>(())
                    })
                    .unwrap();
                black_box((n, sum));
            })
        });
    }

    group.finish();
}

fn bench_parse_float(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_float");
    for input in [&b"\"0.05123000\""[..], &b"25000.50"[..], &b"1.5e-7"[..]] {
        let name = String::from_utf8_lossy(input).into_owned();
        group.bench_function(name, |b| b.iter(|| black_box(parse_f64_best_effort(black_box(input)))));
    }
    group.finish();
}

criterion_group!(benches, bench_decode_snapshot, bench_parse_float);
criterion_main!(benches);
