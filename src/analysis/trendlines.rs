//! Trend-line segments connecting consecutive local extrema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::helpers::{local_maxima, local_minima};
use crate::params::{get_period, ParamMeta, ParameterizedAnalysis};
use crate::{AnalysisError, Ohlcv, Result};

/// Configuration for [`detect_trendlines`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendlineConfig {
    /// Trailing candles scanned for connectable extrema.
    pub lookback: usize,
    /// Extremum window, tighter than the one used for levels.
    pub window: usize,
}

impl Default for TrendlineConfig {
    fn default() -> Self {
        Self { lookback: 50, window: 2 }
    }
}

impl TrendlineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "extremum window must be positive".to_string(),
            ));
        }
        if self.lookback < 2 * self.window + 1 {
            return Err(AnalysisError::InvalidConfig(format!(
                "lookback {} cannot fit an extremum window of {}",
                self.lookback, self.window
            )));
        }
        Ok(())
    }
}

impl ParameterizedAnalysis for TrendlineConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static META: [ParamMeta; 2] = [
            ParamMeta::period(
                "lookback",
                50.0,
                (20.0, 200.0, 10.0),
                "Trailing candles scanned for connectable extrema",
            ),
            ParamMeta::period(
                "window",
                2.0,
                (1.0, 5.0, 1.0),
                "Neighbors an extremum must beat on each side",
            ),
        ];
        &META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let config = Self {
            lookback: get_period(params, "lookback", 50)?.get(),
            window: get_period(params, "window", 2)?.get(),
        };
        config.validate()?;
        Ok(config)
    }

    fn analysis_name() -> &'static str {
        "trendlines"
    }
}

/// Whether a segment connects rising lows or falling highs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendlineDirection {
    Up,
    Down,
}

/// A line between two local extrema, in full-series coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendlineSegment {
    pub start: usize,
    pub end: usize,
    /// Price change per candle between the two anchor points.
    pub slope: f64,
    pub direction: TrendlineDirection,
}

/// Connect consecutive local extrema over the trailing
/// [`lookback`](TrendlineConfig::lookback) candles into trend-line segments.
///
/// Consecutive minima form an [`Up`](TrendlineDirection::Up) segment only
/// when the later low is strictly higher; consecutive maxima form a
/// [`Down`](TrendlineDirection::Down) segment only when the later high is
/// strictly lower. Pairs failing the ordering are skipped, not reported as
/// flat. Up segments come first in the output, each group in chronological
/// order, with indices translated back to full-series coordinates.
pub fn detect_trendlines<T: Ohlcv>(bars: &[T], config: &TrendlineConfig) -> Vec<TrendlineSegment> {
    let n = bars.len();
    let span = config.lookback.min(n);
    let offset = n - span;
    let window = &bars[offset..];

    let mut segments = Vec::new();
    for pair in local_minima(window, config.window).windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (low_a, low_b) = (window[a].low(), window[b].low());
        if low_b > low_a {
            segments.push(TrendlineSegment {
                start: a + offset,
                end: b + offset,
                slope: (low_b - low_a) / (b - a) as f64,
                direction: TrendlineDirection::Up,
            });
        }
    }
    for pair in local_maxima(window, config.window).windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (high_a, high_b) = (window[a].high(), window[b].high());
        if high_b < high_a {
            segments.push(TrendlineSegment {
                start: a + offset,
                end: b + offset,
                slope: (high_b - high_a) / (b - a) as f64,
                direction: TrendlineDirection::Down,
            });
        }
    }
    segments
}
