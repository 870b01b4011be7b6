//! Benchmarks for the candle-series analysis pipeline.

use chartist::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl Ohlcv for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        1000.0
    }
}

/// Generate realistic random bars
fn generate_bars(n: usize) -> Vec<TestBar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
        let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

        let o = price;
        let c = price + change;
        let h = o.max(c) + volatility * 0.5;
        let l = o.min(c) - volatility * 0.5;

        bars.push(TestBar { o, h, l, c });
        price = c;
    }

    bars
}

fn bench_full_pipeline(c: &mut Criterion) {
    let analyzer = Analyzer::default();
    let mut group = c.benchmark_group("analyze");

    for n in [1_000usize, 10_000] {
        let bars = generate_bars(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| {
                let _ = black_box(analyzer.analyze(black_box(bars)));
            })
        });
    }

    group.finish();
}

fn bench_pattern_recognition(c: &mut Criterion) {
    let bars = generate_bars(5_000);
    let config = PatternConfig::default();

    c.bench_function("recognize_patterns_5000_bars", |b| {
        b.iter(|| {
            let _ = black_box(recognize_patterns(black_box(&bars), &config));
        })
    });
}

/// The formation scan is the hot path; compare the running-sum slope pass
/// against refitting every window from scratch.
fn bench_window_slopes(c: &mut Criterion) {
    let bars = generate_bars(5_000);
    let highs: Vec<f64> = bars.iter().map(|b| b.high()).collect();
    let window = 30;

    let mut group = c.benchmark_group("window_slopes");
    group.bench_function("rolling", |b| {
        b.iter(|| {
            let _ = black_box(rolling_slopes(black_box(&highs), window));
        })
    });
    group.bench_function("refit_each_window", |b| {
        b.iter(|| {
            let slopes: Vec<f64> = (0..=highs.len() - window)
                .map(|s| ols_slope(&highs[s..s + window]))
                .collect();
            black_box(slopes);
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_full_pipeline,
    bench_pattern_recognition,
    bench_window_slopes
);
criterion_main!(benches);
