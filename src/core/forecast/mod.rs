//! Spend forecasting: daily series construction, Holt smoothing, output shaping.

pub mod holt;
pub mod series;

pub use holt::{FittedModel, HoltLinear, Smoothing, SmoothingParams};
pub use series::DailySeriesBuilder;

use crate::errors::{Result, SplitError};

/// Minimum number of days a series needs on top of the horizon margin.
pub const MIN_EXPENSES_TO_PREDICT: usize = 3;
/// Forecasted values below this are reported as no spend at all.
pub const PREDICTION_CUTOFF_AMOUNT: f64 = 0.01;

/// Number of days to predict. Always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionHorizon(usize);

impl PredictionHorizon {
    pub fn new(days: usize) -> Result<Self> {
        if days == 0 {
            return Err(horizon_error());
        }
        Ok(Self(days))
    }

    pub fn days(self) -> usize {
        self.0
    }

    /// Series length needed before a forecast of this horizon is attempted.
    pub fn required_len(self) -> usize {
        MIN_EXPENSES_TO_PREDICT + 2 * self.0
    }
}

impl TryFrom<f64> for PredictionHorizon {
    type Error = SplitError;

    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > u32::MAX as f64 {
            return Err(horizon_error());
        }
        Self::new(value as usize)
    }
}

fn horizon_error() -> SplitError {
    SplitError::invalid("Prediction length must be at least 1 and an integer")
}

/// Clamps near-zero noise (and negative values) to zero and truncates the rest to cents.
pub fn post_process(raw: &[f64]) -> Vec<f64> {
    raw.iter().map(|&value| shape_value(value)).collect()
}

fn shape_value(value: f64) -> f64 {
    if !value.is_finite() || value < PREDICTION_CUTOFF_AMOUNT {
        return 0.0;
    }
    (value * 100.0).trunc() / 100.0
}
