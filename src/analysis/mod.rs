//! The analysis pipeline: independent, composable transforms over an ordered
//! candle series.
//!
//! Every function here is pure and synchronous, with no shared state and no
//! mutation of the input, so the whole module is safe to call concurrently.
//! Each analysis takes its own configuration struct with the defaults the
//! dashboard ships with, and degrades to empty/neutral output on a series
//! too short to analyze.

pub mod fibonacci;
pub mod helpers;
pub mod levels;
pub mod momentum;
pub mod patterns;
pub mod signals;
pub mod trend;
pub mod trendlines;

pub use fibonacci::*;
pub use helpers::*;
pub use levels::*;
pub use momentum::*;
pub use patterns::*;
pub use signals::*;
pub use trend::*;
pub use trendlines::*;
