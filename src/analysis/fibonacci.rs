//! Fibonacci retracement levels over a trailing high/low range.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::params::{get_period, ParamMeta, ParameterizedAnalysis};
use crate::{Ohlcv, Result};

/// The standard retracement ratios, in emission order.
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Configuration for [`fibonacci_levels`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FibonacciConfig {
    /// Trailing candles searched for the high/low range.
    pub lookback: usize,
}

impl Default for FibonacciConfig {
    fn default() -> Self {
        Self { lookback: 100 }
    }
}

impl FibonacciConfig {
    pub fn validate(&self) -> Result<()> {
        crate::Period::new(self.lookback).map(|_| ())
    }
}

impl ParameterizedAnalysis for FibonacciConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static META: [ParamMeta; 1] = [ParamMeta::period(
            "lookback",
            100.0,
            (20.0, 500.0, 20.0),
            "Trailing candles searched for the high/low range",
        )];
        &META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self { lookback: get_period(params, "lookback", 100)?.get() })
    }

    fn analysis_name() -> &'static str {
        "fibonacci_levels"
    }
}

/// Retracement prices for each ratio in [`FIB_RATIOS`], measured down from
/// the window high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FibonacciLevels {
    pub levels: [f64; 7],
}

/// Compute retracement levels from the highest high and lowest low of the
/// trailing [`lookback`](FibonacciConfig::lookback) candles.
///
/// Each level is `high - ratio * (high - low)`, so the ratios measure
/// pullbacks of a downswing from the window high; consumers tracking an
/// upswing read the same ladder from the opposite end. Returns `None` when
/// the series is shorter than the lookback.
pub fn fibonacci_levels<T: Ohlcv>(bars: &[T], config: &FibonacciConfig) -> Option<FibonacciLevels> {
    let n = bars.len();
    if config.lookback == 0 || n < config.lookback {
        return None;
    }
    let window = &bars[n - config.lookback..];
    let mut highest = f64::MIN;
    let mut lowest = f64::MAX;
    for bar in window {
        highest = highest.max(bar.high());
        lowest = lowest.min(bar.low());
    }
    let range = highest - lowest;
    let mut levels = [0.0; 7];
    for (slot, ratio) in levels.iter_mut().zip(FIB_RATIOS) {
        *slot = highest - ratio * range;
    }
    Some(FibonacciLevels { levels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    fn candle(h: f64, l: f64) -> Candle {
        Candle {
            open_time: 0,
            open: (h + l) / 2.0,
            high: h,
            low: l,
            close: (h + l) / 2.0,
            volume: 1000.0,
            close_time: 0,
            quote_asset_volume: 0.0,
            number_of_trades: 0,
        }
    }

    #[test]
    fn levels_span_the_window_range() {
        let mut bars: Vec<Candle> = (0..100).map(|_| candle(101.0, 99.0)).collect();
        bars[30] = candle(130.0, 99.0);
        bars[70] = candle(101.0, 80.0);
        let fib = fibonacci_levels(&bars, &FibonacciConfig::default()).unwrap();
        assert_eq!(fib.levels[0], 130.0);
        assert_eq!(fib.levels[6], 80.0);
        assert!((fib.levels[3] - 105.0).abs() < 1e-12);
        assert!((fib.levels[1] - (130.0 - 0.236 * 50.0)).abs() < 1e-12);
    }

    #[test]
    fn range_ignores_candles_before_the_window() {
        let mut bars: Vec<Candle> = (0..120).map(|_| candle(101.0, 99.0)).collect();
        bars[5] = candle(500.0, 99.0); // outside the trailing 100
        bars[60] = candle(130.0, 99.0);
        let fib = fibonacci_levels(&bars, &FibonacciConfig::default()).unwrap();
        assert_eq!(fib.levels[0], 130.0);
    }

    #[test]
    fn short_series_yields_none() {
        let bars: Vec<Candle> = (0..99).map(|_| candle(101.0, 99.0)).collect();
        assert!(fibonacci_levels(&bars, &FibonacciConfig::default()).is_none());
    }
}
