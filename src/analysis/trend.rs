//! Trend classification from short/long moving-average spread.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::helpers::trailing_sma;
use crate::params::{get_period, get_ratio, ParamMeta, ParameterizedAnalysis};
use crate::{AnalysisError, Ohlcv, Period, Ratio, Result};

/// Market direction label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    #[default]
    Neutral,
    Bearish,
}

impl Trend {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Trend::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Trend::Bearish)
    }
}

/// Configuration for [`classify_trend`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendConfig {
    pub short_period: Period,
    pub long_period: Period,
    /// Neutral band around the long average, as a fraction of its value.
    pub band: Ratio,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            short_period: Period::new_const(20),
            long_period: Period::new_const(50),
            band: Ratio::new_const(0.005),
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> Result<()> {
        if self.short_period.get() >= self.long_period.get() {
            return Err(AnalysisError::InvalidConfig(format!(
                "short period {} must be below long period {}",
                self.short_period.get(),
                self.long_period.get()
            )));
        }
        Ok(())
    }
}

impl ParameterizedAnalysis for TrendConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static META: [ParamMeta; 3] = [
            ParamMeta::period("short_period", 20.0, (5.0, 50.0, 5.0), "Short SMA period"),
            ParamMeta::period("long_period", 50.0, (20.0, 200.0, 10.0), "Long SMA period"),
            ParamMeta::ratio(
                "band",
                0.005,
                (0.0, 0.02, 0.0025),
                "Neutral band around the long average",
            ),
        ];
        &META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let config = Self {
            short_period: get_period(params, "short_period", 20)?,
            long_period: get_period(params, "long_period", 50)?,
            band: get_ratio(params, "band", 0.005)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn analysis_name() -> &'static str {
        "trend"
    }
}

/// Label the series bullish, bearish, or neutral by comparing the short and
/// long simple moving averages of the close.
///
/// Bullish when the short average clears the long average by more than the
/// configured band, bearish when it undercuts by more than the band, neutral
/// otherwise. A series shorter than the longer period is always neutral.
pub fn classify_trend<T: Ohlcv>(bars: &[T], config: &TrendConfig) -> Trend {
    let need = config.short_period.get().max(config.long_period.get());
    if bars.len() < need {
        return Trend::Neutral;
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close()).collect();
    let (Some(short), Some(long)) = (
        trailing_sma(&closes, config.short_period.get()),
        trailing_sma(&closes, config.long_period.get()),
    ) else {
        return Trend::Neutral;
    };
    let band = config.band.get();
    if short > long * (1.0 + band) {
        Trend::Bullish
    } else if short < long * (1.0 - band) {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    fn closes(values: impl Iterator<Item = f64>) -> Vec<Candle> {
        values
            .map(|c| Candle {
                open_time: 0,
                open: c,
                high: c + 0.5,
                low: c - 0.5,
                close: c,
                volume: 1000.0,
                close_time: 0,
                quote_asset_volume: 0.0,
                number_of_trades: 0,
            })
            .collect()
    }

    #[test]
    fn rising_closes_are_bullish() {
        let bars = closes((0..60).map(|i| 100.0 + i as f64));
        assert_eq!(classify_trend(&bars, &TrendConfig::default()), Trend::Bullish);
    }

    #[test]
    fn falling_closes_are_bearish() {
        let bars = closes((0..60).map(|i| 200.0 - i as f64));
        assert_eq!(classify_trend(&bars, &TrendConfig::default()), Trend::Bearish);
    }

    #[test]
    fn flat_closes_are_neutral() {
        let bars = closes((0..60).map(|_| 100.0));
        assert_eq!(classify_trend(&bars, &TrendConfig::default()), Trend::Neutral);
    }

    #[test]
    fn short_history_defaults_to_neutral() {
        let bars = closes((0..49).map(|i| 100.0 + i as f64));
        assert_eq!(classify_trend(&bars, &TrendConfig::default()), Trend::Neutral);
    }
}
