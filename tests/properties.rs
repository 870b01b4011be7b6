//! Property tests: bounds, identities, determinism, and quiet degradation on
//! arbitrary candle series.

use chartist::prelude::*;
use proptest::prelude::*;

fn arb_candle() -> impl Strategy<Value = Candle> {
    (1.0f64..500.0, 0.0f64..50.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(low, spread, open_pos, close_pos)| Candle {
            open_time: 0,
            open: low + open_pos * spread,
            high: low + spread,
            low,
            close: low + close_pos * spread,
            volume: 1000.0,
            close_time: 0,
            quote_asset_volume: 0.0,
            number_of_trades: 0,
        },
    )
}

fn arb_series(max_len: usize) -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec(arb_candle(), 0..max_len)
}

proptest! {
    #[test]
    fn rsi_stays_within_bounds(bars in arb_series(300)) {
        for value in rsi(&bars, &RsiConfig::default()) {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal(bars in arb_series(300)) {
        let out = macd(&bars, &MacdConfig::default());
        let head = out.macd.len() - out.signal.len();
        for (i, &h) in out.histogram.iter().enumerate() {
            prop_assert_eq!(h, out.macd[i + head] - out.signal[i]);
        }
    }

    #[test]
    fn analysis_is_deterministic(bars in arb_series(200)) {
        let analyzer = Analyzer::default();
        let first = analyzer.analyze(&bars).unwrap();
        let second = analyzer.analyze(&bars).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn kept_levels_respect_the_minimum_separation(bars in arb_series(200)) {
        let config = LevelConfig::default();
        let levels = support_resistance(&bars, &config);
        if let Some(last) = bars.last() {
            let min_distance = config.min_distance_ratio.get() * last.close;
            for pair in levels.supports.windows(2) {
                prop_assert!(pair[1] - pair[0] >= min_distance);
            }
            for pair in levels.resistances.windows(2) {
                prop_assert!(pair[1] - pair[0] >= min_distance);
            }
        }
    }

    #[test]
    fn trendline_segments_are_strictly_ordered(bars in arb_series(200)) {
        for seg in detect_trendlines(&bars, &TrendlineConfig::default()) {
            prop_assert!(seg.start < seg.end);
            match seg.direction {
                TrendlineDirection::Up => {
                    prop_assert!(bars[seg.end].low > bars[seg.start].low);
                }
                TrendlineDirection::Down => {
                    prop_assert!(bars[seg.end].high < bars[seg.start].high);
                }
            }
        }
    }

    #[test]
    fn short_series_degrade_without_panicking(bars in arb_series(30)) {
        let report = Analyzer::default().analyze(&bars).unwrap();
        prop_assert!(report.signals.is_empty());
        prop_assert!(report.signals.protective.is_none());
        prop_assert!(report.patterns.is_empty());
        prop_assert!(report.fibonacci.is_none());
        prop_assert!(report.levels.is_empty());
        prop_assert_eq!(report.trend, Trend::Neutral);
    }

    #[test]
    fn rolling_slopes_agree_with_per_window_refit(
        values in prop::collection::vec(-1000.0f64..1000.0, 2..120),
        window in 2usize..40,
    ) {
        prop_assume!(values.len() >= window);
        let rolled = rolling_slopes(&values, window);
        prop_assert_eq!(rolled.len(), values.len() - window + 1);
        for (start, &slope) in rolled.iter().enumerate() {
            let naive = ols_slope(&values[start..start + window]);
            prop_assert!((slope - naive).abs() <= 1e-6 * (1.0 + naive.abs()));
        }
    }

    #[test]
    fn suppression_output_is_mutually_disjoint_or_price_separated(bars in arb_series(150)) {
        let report = recognize_patterns(&bars, &PatternConfig::default());
        let kept = suppress_overlaps(&bars, &report.instances(), 5);
        for (i, a) in kept.iter().enumerate() {
            for b in kept.iter().skip(i + 1) {
                let (a_start, a_end) = a.index_span(5, bars.len());
                let (b_start, b_end) = b.index_span(5, bars.len());
                let index_overlap = a_start <= b_end && b_start <= a_end;
                if index_overlap {
                    // accepted despite overlapping indices: the price boxes
                    // must have been disjoint
                    let env = |s: usize, e: usize| {
                        let slice = &bars[s..=e.min(bars.len() - 1)];
                        let lo = slice.iter().map(|c| c.low).fold(f64::MAX, f64::min);
                        let hi = slice.iter().map(|c| c.high).fold(f64::MIN, f64::max);
                        (lo, hi)
                    };
                    let (a_lo, a_hi) = env(a_start, a_end);
                    let (b_lo, b_hi) = env(b_start, b_end);
                    prop_assert!(a_hi < b_lo || b_hi < a_lo);
                }
            }
        }
    }
}
