//! Momentum oscillators: RSI and MACD.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::helpers::{ema_series, wilder_smooth};
use crate::params::{get_period, ParamMeta, ParameterizedAnalysis};
use crate::{AnalysisError, Ohlcv, Period, Result};

/// Placeholder emitted for candles with insufficient RSI history.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Substituted for a zero average loss so the relative strength stays finite.
const ZERO_LOSS_EPSILON: f64 = 0.001;

// ============================================================
// RSI
// ============================================================

/// Configuration for [`rsi`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsiConfig {
    pub period: Period,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self { period: Period::new_const(14) }
    }
}

impl RsiConfig {
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl ParameterizedAnalysis for RsiConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static META: [ParamMeta; 1] = [ParamMeta::period(
            "period",
            14.0,
            (2.0, 50.0, 1.0),
            "Candles in the Wilder smoothing window",
        )];
        &META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self { period: get_period(params, "period", 14)? })
    }

    fn analysis_name() -> &'static str {
        "rsi"
    }
}

/// Relative Strength Index over the close-price sequence.
///
/// Average gain and loss are seeded with the simple mean of the first
/// `period` deltas, then advanced with Wilder smoothing. Output length always
/// matches the input length: the first `period` entries hold the
/// [`NEUTRAL_RSI`] placeholder, and an input no longer than `period` yields
/// only placeholders.
pub fn rsi<T: Ohlcv>(bars: &[T], config: &RsiConfig) -> Vec<f64> {
    let period = config.period.get();
    let n = bars.len();
    if n <= period {
        return vec![NEUTRAL_RSI; n];
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close()).collect();
    let mut out = vec![NEUTRAL_RSI; n];

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = closes[i] - closes[i - 1];
        if delta >= 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in period + 1..n {
        let delta = closes[i] - closes[i - 1];
        let (gain, loss) = if delta >= 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = wilder_smooth(avg_gain, gain, period);
        avg_loss = wilder_smooth(avg_loss, loss, period);
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let loss = if avg_loss == 0.0 { ZERO_LOSS_EPSILON } else { avg_loss };
    let rs = avg_gain / loss;
    100.0 - 100.0 / (1.0 + rs)
}

// ============================================================
// MACD
// ============================================================

/// Configuration for [`macd`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdConfig {
    pub fast: Period,
    pub slow: Period,
    pub signal: Period,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: Period::new_const(12),
            slow: Period::new_const(26),
            signal: Period::new_const(9),
        }
    }
}

impl MacdConfig {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self> {
        let config = Self {
            fast: Period::new(fast)?,
            slow: Period::new(slow)?,
            signal: Period::new(signal)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fast.get() >= self.slow.get() {
            return Err(AnalysisError::InvalidConfig(format!(
                "fast period {} must be shorter than slow period {}",
                self.fast.get(),
                self.slow.get()
            )));
        }
        Ok(())
    }
}

impl ParameterizedAnalysis for MacdConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static META: [ParamMeta; 3] = [
            ParamMeta::period("fast_period", 12.0, (2.0, 20.0, 1.0), "Fast EMA period"),
            ParamMeta::period("slow_period", 26.0, (10.0, 50.0, 2.0), "Slow EMA period"),
            ParamMeta::period("signal_period", 9.0, (2.0, 20.0, 1.0), "Signal EMA period"),
        ];
        &META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let config = Self {
            fast: get_period(params, "fast_period", 12)?,
            slow: get_period(params, "slow_period", 26)?,
            signal: get_period(params, "signal_period", 9)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn analysis_name() -> &'static str {
        "macd"
    }
}

/// MACD line, signal line, and histogram, tail-aligned to each other.
///
/// `macd` starts once the slow EMA is seeded, `signal` once its own EMA over
/// the MACD line is seeded, and `histogram[i]` pairs `signal[i]` with the
/// MACD value at the same candle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }
}

/// Moving Average Convergence Divergence over the close-price sequence.
///
/// Both EMAs are seeded with a simple average, the MACD line is the fast EMA
/// minus the slow EMA aligned on the tail, the signal line is an EMA of the
/// MACD line, and the histogram is their tail-aligned difference. A series no
/// longer than the slow period yields an empty [`MacdSeries`]; callers must
/// guard before indexing.
pub fn macd<T: Ohlcv>(bars: &[T], config: &MacdConfig) -> MacdSeries {
    let n = bars.len();
    let slow = config.slow.get();
    if n <= slow {
        return MacdSeries::default();
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close()).collect();

    let fast_ema = ema_series(&closes, config.fast.get());
    let slow_ema = ema_series(&closes, slow);
    // the fast EMA seeds earlier; trim its head so both end on the same candle
    let offset = fast_ema.len() - slow_ema.len();
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, &s)| fast_ema[i + offset] - s)
        .collect();

    let signal_line = ema_series(&macd_line, config.signal.get());
    let head = macd_line.len() - signal_line.len();
    let histogram: Vec<f64> = signal_line
        .iter()
        .enumerate()
        .map(|(i, &s)| macd_line[i + head] - s)
        .collect();

    MacdSeries { macd: macd_line, signal: signal_line, histogram }
}

// ============================================================
// TESTS
// ============================================================
