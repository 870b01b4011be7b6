//! Chart-pattern recognition: head-and-shoulders, double tops/bottoms,
//! triangles, and wedges.
//!
//! Reversal patterns are read off consecutive local extrema; formation
//! patterns (triangles, wedges) come from least-squares slopes of the highs
//! and lows in a sliding window. The window scan classifies every starting
//! offset, so overlapping detections are expected; presentation layers that
//! need disjoint boxes run [`suppress_overlaps`] afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::helpers::{local_maxima, local_minima, rolling_slopes};
use crate::params::{get_period, get_ratio, get_value, ParamMeta, ParameterizedAnalysis};
use crate::{AnalysisError, Ohlcv, Ratio, Result};

// ============================================================
// CONFIG
// ============================================================

/// Configuration for [`recognize_patterns`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternConfig {
    /// Extremum window for peaks and troughs, wider than the one for levels.
    pub extremum_window: usize,
    /// Candles strictly between twin peaks/troughs, lower bound (exclusive).
    pub min_peak_gap: usize,
    /// Candles strictly between twin peaks/troughs, upper bound (exclusive).
    pub max_peak_gap: usize,
    /// Maximum relative height difference between twin peaks/troughs.
    pub double_tolerance: Ratio,
    /// Maximum relative height difference between the two shoulders.
    pub shoulder_tolerance: Ratio,
    /// Sliding-window length for triangle/wedge regression.
    pub regression_window: usize,
    /// Slopes below this magnitude (price units per candle) read as flat.
    pub flat_slope: f64,
    /// Series shorter than this yield an empty report.
    pub min_len: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            extremum_window: 5,
            min_peak_gap: 10,
            max_peak_gap: 50,
            double_tolerance: Ratio::new_const(0.015),
            shoulder_tolerance: Ratio::new_const(0.05),
            regression_window: 30,
            flat_slope: 0.001,
            min_len: 100,
        }
    }
}

impl PatternConfig {
    pub fn validate(&self) -> Result<()> {
        if self.extremum_window == 0 || self.regression_window < 2 {
            return Err(AnalysisError::InvalidConfig(
                "extremum and regression windows must be positive".to_string(),
            ));
        }
        if self.min_peak_gap >= self.max_peak_gap {
            return Err(AnalysisError::InvalidConfig(format!(
                "peak gap bounds ({}, {}) are inverted",
                self.min_peak_gap, self.max_peak_gap
            )));
        }
        if self.flat_slope <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "flat slope threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl ParameterizedAnalysis for PatternConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static META: [ParamMeta; 7] = [
            ParamMeta::period(
                "extremum_window",
                5.0,
                (2.0, 10.0, 1.0),
                "Neighbors a peak or trough must beat on each side",
            ),
            ParamMeta::period("min_peak_gap", 10.0, (5.0, 30.0, 5.0), "Twin peak gap lower bound"),
            ParamMeta::period("max_peak_gap", 50.0, (20.0, 100.0, 10.0), "Twin peak gap upper bound"),
            ParamMeta::ratio(
                "double_tolerance",
                0.015,
                (0.005, 0.05, 0.005),
                "Relative height tolerance for twin peaks/troughs",
            ),
            ParamMeta::ratio(
                "shoulder_tolerance",
                0.05,
                (0.01, 0.1, 0.01),
                "Relative height tolerance between shoulders",
            ),
            ParamMeta::period(
                "regression_window",
                30.0,
                (10.0, 60.0, 5.0),
                "Sliding-window length for triangle/wedge slopes",
            ),
            ParamMeta::value(
                "flat_slope",
                0.001,
                (0.0001, 0.01, 0.0001),
                "Slope magnitude below which a boundary reads flat",
            ),
        ];
        &META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let config = Self {
            extremum_window: get_period(params, "extremum_window", 5)?.get(),
            min_peak_gap: get_period(params, "min_peak_gap", 10)?.get(),
            max_peak_gap: get_period(params, "max_peak_gap", 50)?.get(),
            double_tolerance: get_ratio(params, "double_tolerance", 0.015)?,
            shoulder_tolerance: get_ratio(params, "shoulder_tolerance", 0.05)?,
            regression_window: get_period(params, "regression_window", 30)?.get(),
            flat_slope: get_value(params, "flat_slope", 0.001),
            min_len: 100,
        };
        config.validate()?;
        Ok(config)
    }

    fn analysis_name() -> &'static str {
        "recognize_patterns"
    }
}

// ============================================================
// OUTPUT
// ============================================================

/// Triangle classification by boundary slopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriangleKind {
    Ascending,
    Descending,
    Symmetrical,
}

/// Wedge classification by boundary slopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WedgeKind {
    Rising,
    Falling,
}

/// A triangle formation spanning `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrianglePattern {
    pub start: usize,
    pub end: usize,
    pub kind: TriangleKind,
}

/// A wedge formation spanning `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WedgePattern {
    pub start: usize,
    pub end: usize,
    pub kind: WedgeKind,
}

/// One detected pattern, tagged by shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "camelCase")]
pub enum PatternInstance {
    HeadAndShoulders { head: usize },
    DoubleTop { peak: usize },
    DoubleBottom { trough: usize },
    Triangle { start: usize, end: usize, kind: TriangleKind },
    Wedge { start: usize, end: usize, kind: WedgeKind },
}

impl PatternInstance {
    /// Candle span covered by this pattern. Point-shaped patterns extend
    /// `point_halfwidth` candles to each side, clamped to the series.
    pub fn index_span(&self, point_halfwidth: usize, series_len: usize) -> (usize, usize) {
        let clamp = |i: usize| i.min(series_len.saturating_sub(1));
        match *self {
            PatternInstance::HeadAndShoulders { head } => {
                (head.saturating_sub(point_halfwidth), clamp(head + point_halfwidth))
            }
            PatternInstance::DoubleTop { peak } => {
                (peak.saturating_sub(point_halfwidth), clamp(peak + point_halfwidth))
            }
            PatternInstance::DoubleBottom { trough } => {
                (trough.saturating_sub(point_halfwidth), clamp(trough + point_halfwidth))
            }
            PatternInstance::Triangle { start, end, .. } => (start, clamp(end)),
            PatternInstance::Wedge { start, end, .. } => (start, clamp(end)),
        }
    }
}

/// All patterns found in one pass, grouped by shape. Derived fresh per call;
/// there is no cross-call memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternReport {
    /// Head indices of head-and-shoulders formations.
    pub head_and_shoulders: Vec<usize>,
    /// Second-peak indices of double tops.
    pub double_tops: Vec<usize>,
    /// Second-trough indices of double bottoms.
    pub double_bottoms: Vec<usize>,
    pub triangles: Vec<TrianglePattern>,
    pub wedges: Vec<WedgePattern>,
}

impl PatternReport {
    pub fn is_empty(&self) -> bool {
        self.head_and_shoulders.is_empty()
            && self.double_tops.is_empty()
            && self.double_bottoms.is_empty()
            && self.triangles.is_empty()
            && self.wedges.is_empty()
    }

    /// Flatten into tagged instances: reversal patterns first (doubles, then
    /// head-and-shoulders), then formation windows merged by start index.
    pub fn instances(&self) -> Vec<PatternInstance> {
        let mut out: Vec<PatternInstance> = Vec::new();
        out.extend(self.double_tops.iter().map(|&peak| PatternInstance::DoubleTop { peak }));
        out.extend(
            self.double_bottoms.iter().map(|&trough| PatternInstance::DoubleBottom { trough }),
        );
        out.extend(
            self.head_and_shoulders.iter().map(|&head| PatternInstance::HeadAndShoulders { head }),
        );

        let mut formations: Vec<PatternInstance> = self
            .triangles
            .iter()
            .map(|t| PatternInstance::Triangle { start: t.start, end: t.end, kind: t.kind })
            .chain(
                self.wedges
                    .iter()
                    .map(|w| PatternInstance::Wedge { start: w.start, end: w.end, kind: w.kind }),
            )
            .collect();
        formations.sort_by_key(|p| match *p {
            PatternInstance::Triangle { start, .. } | PatternInstance::Wedge { start, .. } => start,
            _ => 0,
        });
        out.extend(formations);
        out
    }
}

// ============================================================
// RECOGNITION
// ============================================================

/// Detect chart patterns across the full series.
///
/// A series shorter than [`min_len`](PatternConfig::min_len) yields an empty
/// report. Peaks and troughs use the wide
/// [`extremum_window`](PatternConfig::extremum_window); formations classify
/// every [`regression_window`](PatternConfig::regression_window)-sized window
/// at step 1, so overlapping detections are expected and left to
/// [`suppress_overlaps`].
pub fn recognize_patterns<T: Ohlcv>(bars: &[T], config: &PatternConfig) -> PatternReport {
    let n = bars.len();
    if n < config.min_len {
        return PatternReport::default();
    }
    let maxima = local_maxima(bars, config.extremum_window);
    let minima = local_minima(bars, config.extremum_window);

    let mut report = PatternReport::default();

    // twin peaks: close in height, separated by an intermediate pullback
    for pair in maxima.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if twin_gap_ok(a, b, config) {
            let (first, second) = (bars[a].high(), bars[b].high());
            if relative_difference(first, second) < config.double_tolerance.get() {
                report.double_tops.push(b);
            }
        }
    }
    for pair in minima.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if twin_gap_ok(a, b, config) {
            let (first, second) = (bars[a].low(), bars[b].low());
            if relative_difference(first, second) < config.double_tolerance.get() {
                report.double_bottoms.push(b);
            }
        }
    }

    // three consecutive peaks with a dominant head and level shoulders
    for triple in maxima.windows(3) {
        let (left, head, right) = (triple[0], triple[1], triple[2]);
        let (left_high, head_high, right_high) =
            (bars[left].high(), bars[head].high(), bars[right].high());
        if head_high > left_high
            && head_high > right_high
            && relative_difference(left_high, right_high) < config.shoulder_tolerance.get()
        {
            report.head_and_shoulders.push(head);
        }
    }

    scan_formations(bars, config, &mut report);
    report
}

#[inline]
fn twin_gap_ok(a: usize, b: usize, config: &PatternConfig) -> bool {
    let gap = b - a;
    gap > config.min_peak_gap && gap < config.max_peak_gap
}

#[inline]
fn relative_difference(first: f64, second: f64) -> f64 {
    ((first - second) / first).abs()
}

/// Classify every sliding window by the OLS slopes of its highs and lows.
fn scan_formations<T: Ohlcv>(bars: &[T], config: &PatternConfig, report: &mut PatternReport) {
    let window = config.regression_window;
    if bars.len() < window {
        return;
    }
    let highs: Vec<f64> = bars.iter().map(|b| b.high()).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low()).collect();
    let high_slopes = rolling_slopes(&highs, window);
    let low_slopes = rolling_slopes(&lows, window);

    for (start, (&high_slope, &low_slope)) in high_slopes.iter().zip(&low_slopes).enumerate() {
        let end = start + window - 1;
        match classify_formation(high_slope, low_slope, config.flat_slope) {
            Some(Formation::Triangle(kind)) => {
                report.triangles.push(TrianglePattern { start, end, kind });
            }
            Some(Formation::Wedge(kind)) => {
                report.wedges.push(WedgePattern { start, end, kind });
            }
            None => {}
        }
    }
}

enum Formation {
    Triangle(TriangleKind),
    Wedge(WedgeKind),
}

fn classify_formation(high_slope: f64, low_slope: f64, flat: f64) -> Option<Formation> {
    let high_flat = high_slope.abs() < flat;
    let low_flat = low_slope.abs() < flat;
    let high_rising = high_slope > flat;
    let high_falling = high_slope < -flat;
    let low_rising = low_slope > flat;
    let low_falling = low_slope < -flat;

    if high_flat && low_rising {
        Some(Formation::Triangle(TriangleKind::Ascending))
    } else if high_falling && low_flat {
        Some(Formation::Triangle(TriangleKind::Descending))
    } else if high_falling && low_rising {
        Some(Formation::Triangle(TriangleKind::Symmetrical))
    } else if high_falling && low_falling && high_slope.abs() > low_slope.abs() {
        Some(Formation::Wedge(WedgeKind::Falling))
    } else if high_rising && low_rising && low_slope.abs() > high_slope.abs() {
        Some(Formation::Wedge(WedgeKind::Rising))
    } else {
        None
    }
}

// ============================================================
// OVERLAP SUPPRESSION
// ============================================================

/// Drop candidates whose index range AND price range both intersect an
/// already-accepted pattern, processing candidates in order.
///
/// The price range of a pattern is the low/high envelope of the candles in
/// its [`index_span`](PatternInstance::index_span); `point_halfwidth` sets
/// how far point-shaped patterns extend to each side. This is a presentation
/// policy, deliberately separate from recognition.
pub fn suppress_overlaps<T: Ohlcv>(
    bars: &[T],
    candidates: &[PatternInstance],
    point_halfwidth: usize,
) -> Vec<PatternInstance> {
    let mut accepted_boxes: Vec<(usize, usize, f64, f64)> = Vec::new();
    let mut accepted = Vec::new();
    for &candidate in candidates {
        let (start, end) = candidate.index_span(point_halfwidth, bars.len());
        let Some((low, high)) = price_envelope(bars, start, end) else {
            continue;
        };
        let clashes = accepted_boxes.iter().any(|&(s, e, lo, hi)| {
            start <= e && s <= end && low <= hi && lo <= high
        });
        if !clashes {
            accepted_boxes.push((start, end, low, high));
            accepted.push(candidate);
        }
    }
    accepted
}

fn price_envelope<T: Ohlcv>(bars: &[T], start: usize, end: usize) -> Option<(f64, f64)> {
    let slice = bars.get(start..=end.min(bars.len().saturating_sub(1)))?;
    if slice.is_empty() {
        return None;
    }
    let mut low = f64::MAX;
    let mut high = f64::MIN;
    for bar in slice {
        low = low.min(bar.low());
        high = high.max(bar.high());
    }
    Some((low, high))
}

// ============================================================
// TESTS
// ============================================================
