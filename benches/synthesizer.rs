use core::hint::black_box;
use std::time::Duration;

use bytes::BytesMut;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use luhngen::domain::presets::builtin_issuers;
use luhngen::domain::{GenerationRequest, IssuerDefinition};
use luhngen::service::export::{ExportOptions, ExportSession};
use luhngen::service::{Synthesizer, luhn};
use luhngen::storage::MemorySink;
use rand::SeedableRng;
use rand::rngs::StdRng;

// Numbers synthesized per benchmark iteration.
const TOTAL_NUMBERS: u64 = 4096;

fn bench_check_digit(c: &mut Criterion) {
    let mut group = c.benchmark_group("luhn");
    group.throughput(Throughput::Elements(1));

    group.bench_function("check_digit/15", |b| {
        b.iter(|| luhn::check_digit(black_box(b"411111111111111")));
    });
    group.bench_function("check_digit/31", |b| {
        b.iter(|| luhn::check_digit(black_box(b"1234567890123456789012345678901")));
    });

    group.finish();
}

fn bench_synthesizer(c: &mut Criterion, group_name: &str, synth: &Synthesizer) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_NUMBERS));

    group.bench_function(format!("elems/{TOTAL_NUMBERS}"), |b| {
        let mut rng = StdRng::seed_from_u64(0);
        let mut out = BytesMut::with_capacity(64 * 1024);
        b.iter(|| {
            out.clear();
            for _ in 0..TOTAL_NUMBERS {
                synth.write_next(&mut rng, &mut out);
            }
            black_box(&out);
        });
    });

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    group.throughput(Throughput::Elements(TOTAL_NUMBERS));
    group.measurement_time(Duration::from_secs(10));

    let visa = IssuerDefinition::new("Visa", 16, "4").unwrap();
    for chunk_size in [512usize, 4096, 65536] {
        group.bench_function(format!("chunk/{chunk_size}"), |b| {
            b.iter(|| {
                let request = GenerationRequest::new(vec![visa.clone()], TOTAL_NUMBERS).unwrap();
                let options = ExportOptions {
                    chunk_size,
                    seed: Some(1),
                    ..ExportOptions::default()
                };
                let session =
                    ExportSession::start(request, Box::new(MemorySink::new()), options).unwrap();
                black_box(session.join().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_all(c: &mut Criterion) {
    bench_check_digit(c);

    let visa = Synthesizer::new(vec![IssuerDefinition::new("Visa", 16, "4").unwrap()]).unwrap();
    bench_synthesizer(c, "synthesize/visa", &visa);

    let ranges = Synthesizer::new(vec![
        IssuerDefinition::new("Wide", 32, "1-99999999999999999999999999999").unwrap(),
    ])
    .unwrap();
    bench_synthesizer(c, "synthesize/wide-range", &ranges);

    let presets = Synthesizer::new(builtin_issuers().unwrap()).unwrap();
    bench_synthesizer(c, "synthesize/presets", &presets);

    bench_export(c);
}

criterion_group!(benches, bench_all);
criterion_main!(benches);
