//! Parameter metadata for the analysis configurations.
//!
//! This module describes each tunable of an analysis, enabling:
//! - Grid search over configuration values
//! - Parameter documentation
//! - Automatic configuration UI generation
//!
//! # Example
//!
//! ```rust
//! use chartist::params::{ParamMeta, ParamType, ParameterizedAnalysis};
//! use chartist::prelude::*;
//!
//! for param in RsiConfig::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{AnalysisError, Period, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Fractional value, usually within 0.0..=1.0
    Ratio,
    /// Candle count (positive integer)
    Period,
    /// Free numeric value (thresholds, multiples)
    Value,
}

/// Metadata for a single analysis parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
    /// Parameter name (e.g., "min_distance_ratio")
    pub name: &'static str,
    /// Parameter type
    pub param_type: ParamType,
    /// Default value
    pub default: f64,
    /// Range for optimization: (min, max, step)
    pub range: (f64, f64, f64),
    /// Human-readable description
    pub description: &'static str,
}

impl ParamMeta {
    /// Create a new ParamMeta for a Ratio parameter
    pub const fn ratio(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, param_type: ParamType::Ratio, default, range, description }
    }

    /// Create a new ParamMeta for a Period parameter
    pub const fn period(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, param_type: ParamType::Period, default, range, description }
    }

    /// Create a new ParamMeta for a free-valued parameter
    pub const fn value(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, param_type: ParamType::Value, default, range, description }
    }

    /// Generate all values for grid search
    pub fn generate_grid(&self) -> Vec<f64> {
        let (min, max, step) = self.range;
        let mut values = Vec::new();
        let mut v = min;
        while v <= max + f64::EPSILON {
            values.push(v);
            v += step;
        }
        values
    }

    /// Validate a value for this parameter
    pub fn validate(&self, value: f64) -> Result<()> {
        let (min, max, _) = self.range;
        if value < min || value > max {
            return Err(AnalysisError::OutOfRange { field: self.name, value, min, max });
        }
        match self.param_type {
            ParamType::Period => {
                if value < 1.0 || value.fract() != 0.0 {
                    return Err(AnalysisError::InvalidValue("Period must be a positive integer"));
                }
                Ok(())
            }
            // Ratio bounds are enforced by Ratio::new on construction
            ParamType::Ratio | ParamType::Value => Ok(()),
        }
    }
}

// ============================================================
// PARAMETERIZED ANALYSIS TRAIT
// ============================================================

/// Trait for analysis configurations that expose their tunables.
///
/// Implementing this trait enables:
/// - Discovery of available parameters
/// - Construction from a name/value map, with validation
/// - Grid search optimization
pub trait ParameterizedAnalysis: Sized {
    /// Returns metadata for all configurable parameters
    fn param_meta() -> &'static [ParamMeta];

    /// Creates a configuration with parameters from a HashMap
    ///
    /// Missing parameters use their default values.
    fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

    /// Returns the analysis function this configuration drives
    fn analysis_name() -> &'static str;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
    let value = params.get(key).copied().unwrap_or(default);
    Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
    let value = params.get(key).copied().unwrap_or(default as f64);
    Period::new(value as usize)
}

/// Helper to get a free numeric value with default fallback
pub fn get_value(params: &HashMap<&str, f64>, key: &str, default: f64) -> f64 {
    params.get(key).copied().unwrap_or(default)
}

// ============================================================
// TESTS
// ============================================================
