//! # Chartist
//!
//! Technical-analysis engine for OHLCV candle series: support/resistance
//! levels, momentum oscillators (RSI, MACD), trend classification, entry/exit
//! signal points, Fibonacci retracements, trend-line detection, and chart
//! pattern recognition.
//!
//! The engine is a pipeline of independent, pure functions over an ordered
//! candle series. Nothing is cached between calls and inputs are never
//! mutated, so every function is safe to call concurrently. Short series
//! degrade to empty or neutral output instead of failing, which keeps a
//! rendering pipeline alive when a feed delivers too little history.
//!
//! ## Quick Start
//!
//! ```rust
//! use chartist::prelude::*;
//!
//! // Candles typically arrive from an exchange feed, oldest first
//! let candles: Vec<Candle> = Vec::new();
//!
//! let analyzer = AnalyzerBuilder::new().build().unwrap();
//! let report = analyzer.analyze(&candles).unwrap();
//!
//! assert_eq!(report.trend, Trend::Neutral);
//! assert!(report.levels.is_empty());
//! assert!(report.signals.protective.is_none());
//! ```
//!
//! Each analysis is also callable on its own with an explicit configuration:
//!
//! ```rust
//! use chartist::prelude::*;
//!
//! let candles: Vec<Candle> = Vec::new();
//! let trend = classify_trend(&candles, &TrendConfig::default());
//! assert_eq!(trend, Trend::Neutral);
//! ```

pub mod analysis;
pub mod params;

pub mod prelude {
    pub use crate::{
        // Analysis functions and their configs
        analysis::*,
        // Parallel fan-out
        analyze_parallel,
        // Engine
        Analyzer,
        AnalyzerBuilder,
        // Errors
        AnalysisError,
        AnalysisReport,
        Candle,
        // Core traits
        Ohlcv,
        OhlcvExt,
        // Parameters
        params::{get_period, get_ratio, get_value, ParamMeta, ParamType, ParameterizedAnalysis},
        Period,
        Ratio,
        Result,
        SymbolError,
        SymbolReport,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while configuring or running an analysis
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: need {need} candles, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalysisError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period in candles (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAIT + CANDLE
// ============================================================

/// Core OHLCV data trait: the input seam every analysis is generic over
pub trait Ohlcv {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Bucket open time in epoch milliseconds, when the source carries one
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OhlcvExt: Ohlcv {
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        if self.high() < self.low() {
            return Err(AnalysisError::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        if self.open().is_nan()
            || self.high().is_nan()
            || self.low().is_nan()
            || self.close().is_nan()
        {
            return Err(AnalysisError::InvalidCandle {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if self.open().is_infinite()
            || self.high().is_infinite()
            || self.low().is_infinite()
            || self.close().is_infinite()
        {
            return Err(AnalysisError::InvalidCandle {
                index: 0,
                reason: "infinite value in OHLCV",
            });
        }
        if self.open() < self.low()
            || self.open() > self.high()
            || self.close() < self.low()
            || self.close() > self.high()
        {
            return Err(AnalysisError::InvalidCandle {
                index: 0,
                reason: "open/close outside low..high",
            });
        }
        Ok(())
    }
}

impl<T: Ohlcv> OhlcvExt for T {}

/// One time-bucketed OHLCV record as delivered by an exchange feed.
///
/// The series handed to the engine must be ordered ascending by `open_time`;
/// the engine reads candles but never mutates them.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
    pub quote_asset_volume: f64,
    pub number_of_trades: u64,
}

impl Ohlcv for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.open_time)
    }
}

// ============================================================
// ANALYSIS REPORT
// ============================================================

use analysis::{
    classify_trend, detect_trendlines, fibonacci_levels, macd, recognize_patterns, rsi,
    signal_points, support_resistance, FibonacciConfig, FibonacciLevels, LevelConfig, MacdConfig,
    MacdSeries, PatternConfig, PatternReport, PriceLevels, RsiConfig, SignalConfig, SignalReport,
    Trend, TrendConfig, TrendlineConfig, TrendlineSegment,
};

/// Full-pipeline output for one candle series.
///
/// Every field is an independent value derived from the input; none of them
/// borrow from or alias the series they were computed from.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub levels: PriceLevels,
    pub rsi: Vec<f64>,
    pub macd: MacdSeries,
    pub trend: Trend,
    pub signals: SignalReport,
    pub fibonacci: Option<FibonacciLevels>,
    pub trendlines: Vec<TrendlineSegment>,
    pub patterns: PatternReport,
}

// ============================================================
// ANALYZER
// ============================================================

/// Runs the whole analysis pipeline with one bundle of configurations.
///
/// Construct with [`AnalyzerBuilder`], or use [`Analyzer::default`] for the
/// stock dashboard settings. The individual analysis functions stay public
/// for callers that only need one transform.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    levels: LevelConfig,
    rsi: RsiConfig,
    macd: MacdConfig,
    trend: TrendConfig,
    signals: SignalConfig,
    fibonacci: FibonacciConfig,
    trendlines: TrendlineConfig,
    patterns: PatternConfig,
    validate_data: bool,
    min_history: Option<usize>,
}

impl Analyzer {
    /// Run every analysis over `bars` and collect the results.
    ///
    /// Fails only when data validation is enabled and a candle is malformed,
    /// or when a required minimum history is configured and not met. Short
    /// series otherwise produce empty/neutral fields per function.
    pub fn analyze<T: Ohlcv>(&self, bars: &[T]) -> Result<AnalysisReport> {
        if let Some(need) = self.min_history {
            if bars.len() < need {
                return Err(AnalysisError::InsufficientData { need, got: bars.len() });
            }
        }
        if self.validate_data {
            self.validate_bars(bars)?;
        }
        Ok(AnalysisReport {
            levels: support_resistance(bars, &self.levels),
            rsi: rsi(bars, &self.rsi),
            macd: macd(bars, &self.macd),
            trend: classify_trend(bars, &self.trend),
            signals: signal_points(bars, &self.signals),
            fibonacci: fibonacci_levels(bars, &self.fibonacci),
            trendlines: detect_trendlines(bars, &self.trendlines),
            patterns: recognize_patterns(bars, &self.patterns),
        })
    }

    fn validate_bars<T: Ohlcv>(&self, bars: &[T]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                AnalysisError::InvalidCandle { reason, .. } => {
                    AnalysisError::InvalidCandle { index: i, reason }
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for [`Analyzer`] instances
#[derive(Debug, Clone, Default)]
pub struct AnalyzerBuilder {
    analyzer: Analyzer,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(mut self, config: LevelConfig) -> Self {
        self.analyzer.levels = config;
        self
    }

    pub fn rsi(mut self, config: RsiConfig) -> Self {
        self.analyzer.rsi = config;
        self
    }

    pub fn macd(mut self, config: MacdConfig) -> Self {
        self.analyzer.macd = config;
        self
    }

    pub fn trend(mut self, config: TrendConfig) -> Self {
        self.analyzer.trend = config;
        self
    }

    pub fn signals(mut self, config: SignalConfig) -> Self {
        self.analyzer.signals = config;
        self
    }

    pub fn fibonacci(mut self, config: FibonacciConfig) -> Self {
        self.analyzer.fibonacci = config;
        self
    }

    pub fn trendlines(mut self, config: TrendlineConfig) -> Self {
        self.analyzer.trendlines = config;
        self
    }

    pub fn patterns(mut self, config: PatternConfig) -> Self {
        self.analyzer.patterns = config;
        self
    }

    /// Reject series containing malformed candles instead of analyzing them
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.analyzer.validate_data = enable;
        self
    }

    /// Require at least `candles` of history before analyzing
    pub fn require_history(mut self, candles: usize) -> Self {
        self.analyzer.min_history = Some(candles);
        self
    }

    /// Build the analyzer, validating every configuration
    pub fn build(self) -> Result<Analyzer> {
        let a = &self.analyzer;
        a.levels.validate()?;
        a.rsi.validate()?;
        a.macd.validate()?;
        a.trend.validate()?;
        a.signals.validate()?;
        a.fibonacci.validate()?;
        a.trendlines.validate()?;
        a.patterns.validate()?;
        Ok(self.analyzer)
    }
}

// ============================================================
// PARALLEL ANALYSIS
// ============================================================

use rayon::prelude::*;

/// Result of analyzing a single instrument
#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: String,
    pub report: AnalysisReport,
}

/// Error from analyzing a single instrument
#[derive(Debug)]
pub struct SymbolError {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Run one analyzer over multiple instruments in parallel
pub fn analyze_parallel<'a, T, I>(
    analyzer: &Analyzer,
    instruments: I,
) -> (Vec<SymbolReport>, Vec<SymbolError>)
where
    T: Ohlcv + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            analyzer
                .analyze(bars)
                .map(|report| SymbolReport {
                    symbol: symbol.to_string(),
                    report,
                })
                .map_err(|error| SymbolError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
