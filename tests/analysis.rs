//! Integration tests for the candle-series analysis pipeline.
//!
//! These tests validate the public API and the documented behavior of each
//! analysis over synthetic series with known shapes.

use chartist::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
        Self { o, h, l, c }
    }

    /// A quiet candle around 100 with a one-point range to each side.
    fn base() -> Self {
        Self::new(100.0, 101.0, 99.0, 100.0)
    }
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

/// Deterministic pseudo-random walk
fn generate_walk(n: usize) -> Vec<TestBar> {
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let drift = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0;
            let vol = 2.0 + ((i * 3) % 10) as f64 / 5.0;
            let o = price;
            let c = price + drift;
            let h = o.max(c) + vol * 0.5;
            let l = o.min(c) - vol * 0.5;
            price = c;
            TestBar::new(o, h, l, c)
        })
        .collect()
}

// ============================================================
// SUPPORT / RESISTANCE
// ============================================================

#[test]
fn support_resistance_dedups_nearby_levels() {
    let mut bars: Vec<TestBar> = (0..80).map(|_| TestBar::base()).collect();
    bars[40] = TestBar::new(100.0, 101.0, 95.0, 100.0);
    bars[60] = TestBar::new(100.0, 101.0, 90.0, 100.0);
    bars[70] = TestBar::new(100.0, 101.0, 90.2, 100.0);
    bars[50] = TestBar::new(100.0, 110.0, 99.0, 100.0);
    bars[65] = TestBar::new(100.0, 110.3, 99.0, 100.0);

    let levels = support_resistance(&bars, &LevelConfig::default());
    // latest close 100 puts the minimum separation at 0.5: the 90.2 dip and
    // the 110.3 peak collapse into their neighbors
    assert_eq!(levels.supports, vec![90.0, 95.0]);
    assert_eq!(levels.resistances, vec![110.0]);
}

#[test]
fn support_resistance_empty_below_minimum_history() {
    let bars: Vec<TestBar> = (0..52).map(|_| TestBar::base()).collect();
    assert!(support_resistance(&bars, &LevelConfig::default()).is_empty());
}

#[test]
fn levels_are_stable_when_a_quiet_candle_is_appended() {
    let mut bars: Vec<TestBar> = (0..80).map(|_| TestBar::base()).collect();
    bars[60] = TestBar::new(100.0, 101.0, 90.0, 100.0);
    bars[65] = TestBar::new(100.0, 111.0, 99.0, 100.0);

    let before = support_resistance(&bars, &LevelConfig::default());
    bars.push(TestBar::base());
    let after = support_resistance(&bars, &LevelConfig::default());

    assert_eq!(before.supports, vec![90.0]);
    assert_eq!(before, after);
}

// ============================================================
// CHART PATTERNS
// ============================================================

#[test]
fn double_top_is_reported_at_the_second_peak() {
    let mut bars: Vec<TestBar> = (0..100).map(|_| TestBar::new(89.0, 90.0, 88.0, 89.0)).collect();
    bars[20] = TestBar::new(89.0, 100.0, 88.0, 89.0);
    bars[45] = TestBar::new(89.0, 100.0, 88.0, 89.0);

    let report = recognize_patterns(&bars, &PatternConfig::default());
    assert_eq!(report.double_tops, vec![45]);
    assert!(report.head_and_shoulders.is_empty());
    assert!(report.double_bottoms.is_empty());
}

#[test]
fn twin_peaks_too_close_or_too_far_are_ignored() {
    // 8 candles apart: below the gap floor
    let mut bars: Vec<TestBar> = (0..100).map(|_| TestBar::new(89.0, 90.0, 88.0, 89.0)).collect();
    bars[20] = TestBar::new(89.0, 100.0, 88.0, 89.0);
    bars[28] = TestBar::new(89.0, 100.0, 88.0, 89.0);
    let report = recognize_patterns(&bars, &PatternConfig::default());
    assert!(report.double_tops.is_empty());

    // 55 apart: beyond the ceiling
    let mut bars: Vec<TestBar> = (0..100).map(|_| TestBar::new(89.0, 90.0, 88.0, 89.0)).collect();
    bars[20] = TestBar::new(89.0, 100.0, 88.0, 89.0);
    bars[75] = TestBar::new(89.0, 100.0, 88.0, 89.0);
    let report = recognize_patterns(&bars, &PatternConfig::default());
    assert!(report.double_tops.is_empty());
}

#[test]
fn converging_range_reads_as_symmetrical_triangle() {
    let bars: Vec<TestBar> = (0..120)
        .map(|i| {
            let h = 110.0 - 0.05 * i as f64;
            let l = 90.0 + 0.05 * i as f64;
            TestBar::new(100.0, h, l, 100.0)
        })
        .collect();

    let report = recognize_patterns(&bars, &PatternConfig::default());
    assert_eq!(report.triangles.len(), 120 - 30 + 1);
    assert!(report.triangles.iter().all(|t| t.kind == TriangleKind::Symmetrical));
    assert!(report.wedges.is_empty());
}

#[test]
fn flat_highs_over_rising_lows_read_as_ascending_triangle() {
    let bars: Vec<TestBar> = (0..120)
        .map(|i| {
            let l = 50.0 + 0.2 * i as f64;
            let mid = (100.0 + l) / 2.0;
            TestBar::new(mid, 100.0, l, mid)
        })
        .collect();

    let report = recognize_patterns(&bars, &PatternConfig::default());
    assert!(!report.triangles.is_empty());
    assert!(report.triangles.iter().all(|t| t.kind == TriangleKind::Ascending));
}

#[test]
fn steeper_falling_highs_read_as_falling_wedge() {
    let bars: Vec<TestBar> = (0..120)
        .map(|i| {
            let h = 200.0 - 0.5 * i as f64;
            let l = 100.0 - 0.2 * i as f64;
            let mid = (h + l) / 2.0;
            TestBar::new(mid, h, l, mid)
        })
        .collect();

    let report = recognize_patterns(&bars, &PatternConfig::default());
    assert_eq!(report.wedges.len(), 120 - 30 + 1);
    assert!(report.wedges.iter().all(|w| w.kind == WedgeKind::Falling));
    assert!(report.triangles.is_empty());
}

#[test]
fn formation_scan_matches_a_per_window_refit() {
    let bars = generate_walk(400);
    let config = PatternConfig::default();
    let report = recognize_patterns(&bars, &config);

    let window = config.regression_window;
    let flat = config.flat_slope;
    let highs: Vec<f64> = bars.iter().map(|b| b.high()).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low()).collect();

    let mut triangles = Vec::new();
    let mut wedges = Vec::new();
    for start in 0..=bars.len() - window {
        let high_slope = ols_slope(&highs[start..start + window]);
        let low_slope = ols_slope(&lows[start..start + window]);
        let end = start + window - 1;

        let high_flat = high_slope.abs() < flat;
        let low_flat = low_slope.abs() < flat;
        if high_flat && low_slope > flat {
            triangles.push(TrianglePattern { start, end, kind: TriangleKind::Ascending });
        } else if high_slope < -flat && low_flat {
            triangles.push(TrianglePattern { start, end, kind: TriangleKind::Descending });
        } else if high_slope < -flat && low_slope > flat {
            triangles.push(TrianglePattern { start, end, kind: TriangleKind::Symmetrical });
        } else if high_slope < -flat && low_slope < -flat && high_slope.abs() > low_slope.abs() {
            wedges.push(WedgePattern { start, end, kind: WedgeKind::Falling });
        } else if high_slope > flat && low_slope > flat && low_slope.abs() > high_slope.abs() {
            wedges.push(WedgePattern { start, end, kind: WedgeKind::Rising });
        }
    }

    assert_eq!(report.triangles, triangles);
    assert_eq!(report.wedges, wedges);
}

// ============================================================
// TRENDLINES
// ============================================================

#[test]
fn trendline_segments_stay_in_the_trailing_window() {
    let bars = generate_walk(300);
    let config = TrendlineConfig::default();
    for seg in detect_trendlines(&bars, &config) {
        assert!(seg.start >= 300 - config.lookback);
        assert!(seg.start < seg.end && seg.end < 300);
        match seg.direction {
            TrendlineDirection::Up => assert!(bars[seg.end].low() > bars[seg.start].low()),
            TrendlineDirection::Down => assert!(bars[seg.end].high() < bars[seg.start].high()),
        }
    }
}

// ============================================================
// FULL PIPELINE
// ============================================================

#[test]
fn full_pipeline_over_a_long_series() {
    let bars = generate_walk(300);
    let analyzer = AnalyzerBuilder::new().validate_data(true).build().unwrap();
    let report = analyzer.analyze(&bars).unwrap();

    assert_eq!(report.rsi.len(), 300);
    assert!(report.rsi.iter().all(|v| (0.0..=100.0).contains(v)));
    assert_eq!(report.macd.macd.len(), 300 - 26 + 1);
    assert_eq!(report.macd.signal.len(), report.macd.macd.len() - 9 + 1);
    assert_eq!(report.macd.histogram.len(), report.macd.signal.len());
    assert!(report.fibonacci.is_some());

    // signal indices are chronological
    assert!(report.signals.entries.windows(2).all(|w| w[0] < w[1]));
    assert!(report.signals.exits.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn overlap_suppression_composes_with_recognition() {
    let bars: Vec<TestBar> = (0..120)
        .map(|i| {
            let h = 110.0 - 0.05 * i as f64;
            let l = 90.0 + 0.05 * i as f64;
            TestBar::new(100.0, h, l, 100.0)
        })
        .collect();

    let report = recognize_patterns(&bars, &PatternConfig::default());
    let kept = suppress_overlaps(&bars, &report.instances(), 5);
    // every 30-candle window qualifies, but the boxes all intersect, so only
    // disjoint spans survive
    assert!(kept.len() < report.instances().len());
    assert!(!kept.is_empty());
    for pair in kept.windows(2) {
        let (_, a_end) = pair[0].index_span(5, bars.len());
        let (b_start, _) = pair[1].index_span(5, bars.len());
        assert!(b_start > a_end);
    }
}
