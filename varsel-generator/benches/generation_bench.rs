#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use varsel_config::GeneratorConfig;
use varsel_generator::TelemetryGenerator;

fn benchmark_generation_throughput(c: &mut Criterion) {
    let generator = TelemetryGenerator::new(GeneratorConfig::default()).unwrap();

    c.bench_function("generate_log", |b| {
        b.iter(|| black_box(generator.generate_log()))
    });

    c.bench_function("generate_metric_correlated", |b| {
        b.iter(|| black_box(generator.generate_metric(true)))
    });

    c.bench_function("run_iteration", |b| {
        b.iter(|| {
            generator.run_iteration();
            // Keep the queues from growing without bound across samples.
            generator.try_dequeue_log();
            generator.try_dequeue_metric();
        })
    });
}

criterion_group!(benches, benchmark_generation_throughput);
criterion_main!(benches);
