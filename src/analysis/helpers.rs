//! Shared numeric primitives for the analysis functions.
//!
//! Everything here is pure: moving averages, Wilder smoothing, least-squares
//! slopes, true range, and the windowed local-extremum scan that level,
//! trend-line, and chart-pattern detection are built on.

use crate::{Ohlcv, OhlcvExt};

// ============================================================
// MOVING AVERAGES
// ============================================================

/// Simple moving average over the trailing `period` values.
///
/// Returns `None` when fewer than `period` values are available.
pub fn trailing_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let tail = &values[values.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

/// Exponential moving average series.
///
/// Seeded with the simple average of the first `period` values, then the
/// standard recurrence `ema = (value - prev) * mult + prev` with
/// `mult = 2 / (period + 1)`. Output length is `values.len() - period + 1`;
/// empty when there is not enough data to seed.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let mult = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out.push(ema);
    for &value in &values[period..] {
        ema = (value - ema) * mult + ema;
        out.push(ema);
    }
    out
}

/// One Wilder smoothing step: `(prev * (period - 1) + value) / period`.
#[inline]
pub fn wilder_smooth(prev: f64, value: f64, period: usize) -> f64 {
    (prev * (period as f64 - 1.0) + value) / period as f64
}

// ============================================================
// LINEAR REGRESSION
// ============================================================

/// Ordinary least-squares slope of `values` against x = 0, 1, 2, ...
///
/// Returns `0.0` when the slope is undefined (fewer than two points).
pub fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// OLS slope of every `window`-sized slice of `values`, computed in O(n)
/// from running sums instead of refitting each window.
///
/// Output index `i` holds the slope of `values[i..i + window]`. Empty when
/// `window < 2` or the series is shorter than `window`.
pub fn rolling_slopes(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    if window < 2 || n < window {
        return Vec::new();
    }
    // prefix[i] = sum of values[..i]; weighted[i] = sum of j * values[j], j < i
    let mut prefix = vec![0.0; n + 1];
    let mut weighted = vec![0.0; n + 1];
    for (i, &y) in values.iter().enumerate() {
        prefix[i + 1] = prefix[i] + y;
        weighted[i + 1] = weighted[i] + i as f64 * y;
    }
    let wf = window as f64;
    let mean_x = (wf - 1.0) / 2.0;
    // sum of (x - mean_x)^2 for x = 0..window is constant across windows
    let sxx = wf * (wf * wf - 1.0) / 12.0;
    (0..=n - window)
        .map(|start| {
            let sum_y = prefix[start + window] - prefix[start];
            let sum_iy = weighted[start + window] - weighted[start];
            // translate absolute x back to window-local x = 0..window
            let sum_xy = sum_iy - start as f64 * sum_y;
            (sum_xy - mean_x * sum_y) / sxx
        })
        .collect()
}

// ============================================================
// VOLATILITY
// ============================================================

/// True range of a candle given the previous close, if any.
#[inline]
pub fn true_range<T: Ohlcv>(bar: &T, prev_close: Option<f64>) -> f64 {
    let hl = bar.range();
    match prev_close {
        Some(pc) => hl.max((bar.high() - pc).abs()).max((bar.low() - pc).abs()),
        None => hl,
    }
}

/// Average true range over the `period` candles ending at `index`, inclusive.
///
/// Returns `None` when fewer than `period` candles are available up to
/// `index`, or when `index` is out of bounds.
pub fn atr_at<T: Ohlcv>(bars: &[T], index: usize, period: usize) -> Option<f64> {
    if period == 0 || index >= bars.len() || index + 1 < period {
        return None;
    }
    let start = index + 1 - period;
    let sum: f64 = (start..=index)
        .map(|i| {
            let prev_close = if i == 0 { None } else { Some(bars[i - 1].close()) };
            true_range(&bars[i], prev_close)
        })
        .sum();
    Some(sum / period as f64)
}

// ============================================================
// LOCAL EXTREMA
// ============================================================

/// Indices whose `low` is strictly below the `low` of every neighbor within
/// `window` candles on each side.
///
/// Ties never qualify, so plateaus produce no detections. Empty when the
/// series is shorter than `2 * window + 1` or `window` is zero.
pub fn local_minima<T: Ohlcv>(bars: &[T], window: usize) -> Vec<usize> {
    local_extrema(bars, window, |bar| bar.low(), |candidate, other| candidate < other)
}

/// Indices whose `high` is strictly above the `high` of every neighbor within
/// `window` candles on each side. Same tie policy as [`local_minima`].
pub fn local_maxima<T: Ohlcv>(bars: &[T], window: usize) -> Vec<usize> {
    local_extrema(bars, window, |bar| bar.high(), |candidate, other| candidate > other)
}

fn local_extrema<T, P, B>(bars: &[T], window: usize, price: P, beats: B) -> Vec<usize>
where
    T: Ohlcv,
    P: Fn(&T) -> f64,
    B: Fn(f64, f64) -> bool,
{
    let n = bars.len();
    if window == 0 || n < 2 * window + 1 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for i in window..n - window {
        let candidate = price(&bars[i]);
        let is_extremum =
            (i - window..=i + window).all(|j| j == i || beats(candidate, price(&bars[j])));
        if is_extremum {
            out.push(i);
        }
    }
    out
}

// ============================================================
// TESTS
// ============================================================
