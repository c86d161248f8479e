//! Criterion benchmarks for hkbt-core's hot paths.
//!
//! Benchmarks:
//! 1. Indicator engine update (one symbol's full indicator stack, per bar)
//! 2. Full simulator replay (warm-up + backtest slice, end to end)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hkbt_core::data::validation::DataQualityReport;
use hkbt_core::data::PreparedData;
use hkbt_core::domain::{AdjustedCandle, Candle, Instrument, Interval};
use hkbt_core::engine::{Simulator, SimulatorConfig};
use hkbt_core::indicators::IndicatorEngine;

fn make_candles(n: usize) -> Vec<AdjustedCandle> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.05).sin() * 8.0 + i as f64 * 0.01;
            let ts = base + chrono::Duration::minutes(30 * i as i64);
            AdjustedCandle::unadjusted(Candle::new(
                ts,
                close - 0.3,
                close + 1.2,
                close - 1.2,
                close,
                1_000_000 + (i as u64 % 500_000),
                close * 1_000_000.0,
            ))
        })
        .collect()
}

fn bench_indicator_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_engine");

    for &bar_count in &[252usize, 1260, 2520] {
        let candles = make_candles(bar_count);
        group.bench_with_input(BenchmarkId::new("update", bar_count), &bar_count, |b, _| {
            b.iter(|| {
                let mut engine = IndicatorEngine::new();
                for candle in &candles {
                    engine.update(black_box(&candle.candle));
                }
                black_box(engine.snapshot(candles.last().unwrap().candle.close));
            });
        });
    }

    group.finish();
}

fn bench_simulator_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator_replay");

    for &bar_count in &[300usize, 1000] {
        let candles = make_candles(bar_count);
        let warmup_end = 100;
        let quality = DataQualityReport::new(bar_count as u64, 0, 0, 0, 0, 0);
        let instrument = Instrument::new("BENCH.HK", 100, false);
        let data = PreparedData::new(candles, warmup_end, quality, instrument.clone()).unwrap();

        group.bench_with_input(BenchmarkId::new("run", bar_count), &bar_count, |b, _| {
            b.iter(|| {
                let config = SimulatorConfig::new(1_000_000.0, Interval::M30, 200_000.0);
                let mut simulator = Simulator::new(config, instrument.clone());
                black_box(simulator.run(black_box(&data), &Default::default()));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_indicator_engine, bench_simulator_replay);
criterion_main!(benches);
