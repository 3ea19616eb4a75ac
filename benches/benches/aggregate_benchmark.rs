//! Aggregation and end-to-end pipeline benchmarks.
//!
//! Run with: `cargo bench --package xetl-bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::sync::Arc;
use std::time::Duration;
use xetl_bench::{BenchmarkConfig, synthetic_batch, synthetic_store};
use xetl_lib::{
    DailyAggregator, EtlConfig, LoggingConfig, MemoryStore, MetaConfig, Pipeline, SourceConfig,
    StorageConfig, TargetConfig,
};

/// Benchmark configurations for different data sizes.
fn benchmark_configs() -> Vec<(&'static str, BenchmarkConfig)> {
    vec![
        (
            "10x5x100",
            BenchmarkConfig {
                instruments: 10,
                days: 5,
                trades_per_day: 100,
            },
        ),
        (
            "100x5x100",
            BenchmarkConfig {
                instruments: 100,
                days: 5,
                trades_per_day: 100,
            },
        ),
        (
            "500x2x200",
            BenchmarkConfig {
                instruments: 500,
                days: 2,
                trades_per_day: 200,
            },
        ),
    ]
}

fn aggregate_benchmark(c: &mut Criterion) {
    let aggregator = DailyAggregator::new(SourceConfig::default());
    let start = BenchmarkConfig::first_date();

    let mut group = c.benchmark_group("aggregate");
    for (name, config) in benchmark_configs() {
        let batch = synthetic_batch(&config);
        group.throughput(Throughput::Elements(config.rows()));
        group.bench_with_input(BenchmarkId::new("transform", name), &batch, |b, batch| {
            b.iter(|| aggregator.transform(batch, start).unwrap());
        });
    }
    group.finish();
}

fn pipeline_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let now = BenchmarkConfig::first_date()
        .checked_add_days(chrono::Days::new(30))
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    for (name, config) in benchmark_configs().into_iter().take(2) {
        let source = runtime.block_on(synthetic_store(&config));
        let etl = bench_config();

        group.throughput(Throughput::Elements(config.rows()));
        group.bench_with_input(BenchmarkId::new("run", name), &etl, |b, etl| {
            b.to_async(&runtime).iter(|| {
                // Fresh target so every iteration is a first run.
                let pipeline = Pipeline::new(
                    etl.clone(),
                    Arc::new(source.clone()),
                    Arc::new(MemoryStore::new()),
                )
                .unwrap();
                async move { pipeline.run_at(now).await.unwrap() }
            });
        });
    }
    group.finish();
}

fn bench_config() -> EtlConfig {
    EtlConfig {
        source: SourceConfig {
            first_extract_date: BenchmarkConfig::first_date().to_string(),
            ..SourceConfig::default()
        },
        target: TargetConfig::default(),
        meta: MetaConfig::default(),
        storage: StorageConfig::default(),
        logging: LoggingConfig::default(),
    }
}

criterion_group!(benches, aggregate_benchmark, pipeline_benchmark);
criterion_main!(benches);
