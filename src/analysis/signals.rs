//! Entry/exit signal points from RSI crossovers, with ATR-sized protective
//! levels for the most recent entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::helpers::atr_at;
use crate::analysis::momentum::{rsi, RsiConfig};
use crate::params::{get_period, get_value, ParamMeta, ParameterizedAnalysis};
use crate::{AnalysisError, Ohlcv, Period, Result};

// ============================================================
// CONFIG
// ============================================================

/// Configuration for [`signal_points`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalConfig {
    pub rsi: RsiConfig,
    /// RSI level whose downward cross marks an entry.
    pub oversold: f64,
    /// RSI level whose upward cross marks an exit.
    pub overbought: f64,
    pub atr_period: Period,
    /// ATR multiples between entry price and stop-loss.
    pub stop_mult: f64,
    /// ATR multiples between entry price and take-profit.
    pub target_mult: f64,
    /// Series shorter than this yield an empty report.
    pub min_len: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi: RsiConfig::default(),
            oversold: 30.0,
            overbought: 70.0,
            atr_period: Period::new_const(14),
            stop_mult: 2.0,
            target_mult: 3.0,
            min_len: 30,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.oversold) || !(0.0..=100.0).contains(&self.overbought) {
            return Err(AnalysisError::InvalidConfig(
                "oversold and overbought must lie within the RSI range".to_string(),
            ));
        }
        if self.oversold >= self.overbought {
            return Err(AnalysisError::InvalidConfig(format!(
                "oversold {} must be below overbought {}",
                self.oversold, self.overbought
            )));
        }
        if self.stop_mult <= 0.0 || self.target_mult <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "stop and target multiples must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl ParameterizedAnalysis for SignalConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static META: [ParamMeta; 6] = [
            ParamMeta::period("rsi_period", 14.0, (2.0, 50.0, 1.0), "RSI period"),
            ParamMeta::value("oversold", 30.0, (10.0, 40.0, 5.0), "Entry RSI threshold"),
            ParamMeta::value("overbought", 70.0, (60.0, 90.0, 5.0), "Exit RSI threshold"),
            ParamMeta::period("atr_period", 14.0, (2.0, 50.0, 1.0), "ATR period"),
            ParamMeta::value("stop_mult", 2.0, (0.5, 5.0, 0.5), "ATR multiples to the stop-loss"),
            ParamMeta::value(
                "target_mult",
                3.0,
                (0.5, 10.0, 0.5),
                "ATR multiples to the take-profit",
            ),
        ];
        &META
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let config = Self {
            rsi: RsiConfig { period: get_period(params, "rsi_period", 14)? },
            oversold: get_value(params, "oversold", 30.0),
            overbought: get_value(params, "overbought", 70.0),
            atr_period: get_period(params, "atr_period", 14)?,
            stop_mult: get_value(params, "stop_mult", 2.0),
            target_mult: get_value(params, "target_mult", 3.0),
            min_len: 30,
        };
        config.validate()?;
        Ok(config)
    }

    fn analysis_name() -> &'static str {
        "signal_points"
    }
}

// ============================================================
// OUTPUT
// ============================================================

/// Stop-loss and take-profit prices derived from the most recent entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectiveLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Entry and exit candle indices in chronological order, plus protective
/// levels when at least one entry exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReport {
    pub entries: Vec<usize>,
    pub exits: Vec<usize>,
    /// `None` when no entry signal exists; never a zeroed placeholder.
    pub protective: Option<ProtectiveLevels>,
}

impl SignalReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.exits.is_empty()
    }
}

// ============================================================
// DETECTION
// ============================================================

/// Collect entry and exit signal points from RSI threshold crossings.
///
/// An entry is a candle where RSI crosses from above the oversold level to at
/// or below it; an exit crosses from below the overbought level to at or
/// above it. All crossings are reported, oldest first.
///
/// Protective levels come from the most recent entry only: with the entry
/// price below the latest close the position reads long and the stop sits
/// `stop_mult` ATRs below the entry with the target `target_mult` ATRs above;
/// an entry at or above the latest close inverts both. The ATR window is the
/// `atr_period` candles ending at the entry.
///
/// A series shorter than [`min_len`](SignalConfig::min_len) yields an empty
/// report.
pub fn signal_points<T: Ohlcv>(bars: &[T], config: &SignalConfig) -> SignalReport {
    let n = bars.len();
    if n < config.min_len {
        return SignalReport::default();
    }
    let rsi_series = rsi(bars, &config.rsi);

    let mut entries = Vec::new();
    let mut exits = Vec::new();
    for i in 1..n {
        if rsi_series[i - 1] > config.oversold && rsi_series[i] <= config.oversold {
            entries.push(i);
        }
        if rsi_series[i - 1] < config.overbought && rsi_series[i] >= config.overbought {
            exits.push(i);
        }
    }

    let protective = entries.last().and_then(|&entry_index| {
        let atr = atr_at(bars, entry_index, config.atr_period.get())?;
        let entry_price = bars[entry_index].close();
        let latest_close = bars[n - 1].close();
        Some(if entry_price < latest_close {
            ProtectiveLevels {
                stop_loss: entry_price - config.stop_mult * atr,
                take_profit: entry_price + config.target_mult * atr,
            }
        } else {
            ProtectiveLevels {
                stop_loss: entry_price + config.stop_mult * atr,
                take_profit: entry_price - config.target_mult * atr,
            }
        })
    });

    SignalReport { entries, exits, protective }
}
