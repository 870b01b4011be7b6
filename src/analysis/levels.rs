//! Support and resistance detection from windowed local extrema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::helpers::{local_maxima, local_minima};
use crate::params::{get_period, get_ratio, ParamMeta, ParameterizedAnalysis};
use crate::{AnalysisError, Ohlcv, Ratio, Result};

// ============================================================
// CONFIG
// ============================================================

/// Configuration for [`support_resistance`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    /// Number of trailing candles scanned for levels.
    pub lookback: usize,
    /// Extremum window: a level candle must beat this many neighbors on each side.
    pub significance: usize,
    /// Minimum distance between kept levels, as a fraction of the latest close.
    pub min_distance_ratio: Ratio,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            lookback: 50,
            significance: 3,
            min_distance_ratio: Ratio::new_const(0.005),
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lookback == 0 || self.significance == 0 {
            return Err(AnalysisError::InvalidConfig(
                "lookback and significance must be positive".to_string(),
            ));
        }
        if self.lookback < 2 * self.significance + 1 {
            return Err(AnalysisError::InvalidConfig(format!(
                "lookback {} cannot fit an extremum window of {}",
                self.lookback, self.significance
            )));
        }
        Ok(())
    }
}

impl ParameterizedAnalysis for LevelConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static META: [ParamMeta; 3] = [
            ParamMeta::period(
                "lookback",
                50.0,
                (20.0, 200.0, 10.0),
                "Trailing candles scanned for levels",
            ),
            ParamMeta::period(
                "significance",
                3.0,
                (1.0, 10.0, 1.0),
                "Neighbors a level candle must beat on each side",
            ),
            ParamMeta::ratio(
                "min_distance_ratio",
                0.005,
                (0.001, 0.02, 0.001),
                "Minimum level separation as a fraction of the latest close",
            ),
        ];
        &META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let config = Self {
            lookback: get_period(params, "lookback", 50)?.get(),
            significance: get_period(params, "significance", 3)?.get(),
            min_distance_ratio: get_ratio(params, "min_distance_ratio", 0.005)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn analysis_name() -> &'static str {
        "support_resistance"
    }
}

// ============================================================
// OUTPUT
// ============================================================

/// Deduplicated support and resistance prices, each list internally ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLevels {
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
}

impl PriceLevels {
    pub fn is_empty(&self) -> bool {
        self.supports.is_empty() && self.resistances.is_empty()
    }
}

// ============================================================
// DETECTION
// ============================================================

/// Detect support and resistance levels over the trailing
/// [`lookback`](LevelConfig::lookback) candles.
///
/// Local lows become candidate supports and local highs candidate
/// resistances; each candidate list is sorted ascending and thinned so that
/// kept levels sit at least `min_distance_ratio x latest close` apart, keeping
/// the first level of each cluster. Levels are recomputed from scratch on
/// every call.
///
/// Returns empty levels when the series is shorter than
/// `lookback + significance`.
pub fn support_resistance<T: Ohlcv>(bars: &[T], config: &LevelConfig) -> PriceLevels {
    let n = bars.len();
    if n < config.lookback + config.significance {
        return PriceLevels::default();
    }
    let window = &bars[n - config.lookback..];
    let min_distance = config.min_distance_ratio.get() * bars[n - 1].close();

    let supports: Vec<f64> = local_minima(window, config.significance)
        .into_iter()
        .map(|i| window[i].low())
        .collect();
    let resistances: Vec<f64> = local_maxima(window, config.significance)
        .into_iter()
        .map(|i| window[i].high())
        .collect();

    PriceLevels {
        supports: dedup_levels(supports, min_distance),
        resistances: dedup_levels(resistances, min_distance),
    }
}

/// Sort ascending and keep the first candidate of each cluster, dropping any
/// follower closer than `min_distance` to the last kept level.
fn dedup_levels(mut levels: Vec<f64>, min_distance: f64) -> Vec<f64> {
    levels.sort_by(f64::total_cmp);
    let mut kept: Vec<f64> = Vec::with_capacity(levels.len());
    for level in levels {
        match kept.last() {
            Some(&prev) if level - prev < min_distance => {}
            _ => kept.push(level),
        }
    }
    kept
}

// ============================================================
// TESTS
// ============================================================
