//! Double exponential smoothing with an additive trend (Holt's linear method).
//!
//! ```text
//! L_t = α·x_t + (1 − α)·(L_{t−1} + T_{t−1})
//! T_t = β·(L_t − L_{t−1}) + (1 − β)·T_{t−1}
//! F_{t+k} = L_t + k·T_t
//! ```
//!
//! Updates are evaluated in the equivalent error-correction form
//! `L_t = L_{t−1} + T_{t−1} + α·e_t`, `T_t = T_{t−1} + α·β·e_t`, so a perfectly
//! predicted day leaves the state bit-for-bit unchanged.
//!
//! The state is seeded with `L_0 = x_0` and `T_0 = x_1 − x_0`. In-sample
//! fitted values are one-step-ahead predictions, with `x_0` standing in for
//! the first day. No seasonal component is modelled.

use serde::{Deserialize, Serialize};

/// Minimum number of observations the model needs to seed level and trend.
pub const MIN_FIT_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
}

impl SmoothingParams {
    pub fn is_valid(&self) -> bool {
        self.alpha > 0.0 && self.alpha <= 1.0 && (0.0..=1.0).contains(&self.beta)
    }
}

/// How α and β are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Smoothing {
    /// Grid search over `(0, 1)` with `grid_steps` evenly spaced values per
    /// parameter, keeping the pair with the lowest one-step-ahead squared error.
    Fitted { grid_steps: u32 },
    Fixed { alpha: f64, beta: f64 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Fitted { grid_steps: 19 }
    }
}

#[derive(Debug, Clone)]
pub struct HoltLinear {
    smoothing: Smoothing,
    max_evaluations: usize,
}

impl Default for HoltLinear {
    fn default() -> Self {
        Self::new(Smoothing::default(), 400)
    }
}

impl HoltLinear {
    pub fn new(smoothing: Smoothing, max_evaluations: usize) -> Self {
        Self {
            smoothing,
            max_evaluations: max_evaluations.max(1),
        }
    }

    /// Fits the model to `series`. Returns `None` when the series is too short,
    /// holds non-finite values, or no parameter pair yields a finite error.
    pub fn fit(&self, series: &[f64]) -> Option<FittedModel> {
        if series.len() < MIN_FIT_LEN || series.iter().any(|value| !value.is_finite()) {
            return None;
        }
        let model = match self.smoothing {
            Smoothing::Fixed { alpha, beta } => {
                let params = SmoothingParams { alpha, beta };
                if !params.is_valid() {
                    return None;
                }
                run(series, params)
            }
            Smoothing::Fitted { grid_steps } => self.search(series, grid_steps)?,
        };
        model.sse.is_finite().then_some(model)
    }

    fn search(&self, series: &[f64], grid_steps: u32) -> Option<FittedModel> {
        let budget = (self.max_evaluations as f64).sqrt().floor() as usize;
        let steps = (grid_steps as usize).clamp(1, budget.max(1));
        let grid: Vec<f64> = (1..=steps)
            .map(|i| i as f64 / (steps + 1) as f64)
            .collect();

        let mut best: Option<FittedModel> = None;
        for &alpha in &grid {
            for &beta in &grid {
                let candidate = run(series, SmoothingParams { alpha, beta });
                if !candidate.sse.is_finite() {
                    continue;
                }
                let better = best
                    .as_ref()
                    .map_or(true, |current| candidate.sse < current.sse);
                if better {
                    best = Some(candidate);
                }
            }
        }
        best
    }
}

fn run(series: &[f64], params: SmoothingParams) -> FittedModel {
    let SmoothingParams { alpha, beta } = params;
    let mut level = series[0];
    let mut trend = series[1] - series[0];
    let mut fitted = Vec::with_capacity(series.len());
    fitted.push(series[0]);
    let mut sse = 0.0;

    for &observed in &series[1..] {
        let predicted = level + trend;
        fitted.push(predicted);
        let error = observed - predicted;
        sse += error * error;

        // error-correction form of the two recurrences; exact when error == 0
        level = predicted + alpha * error;
        trend += alpha * beta * error;
    }

    FittedModel {
        params,
        level,
        trend,
        fitted,
        sse,
    }
}

/// Final smoothing state plus the in-sample reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    params: SmoothingParams,
    level: f64,
    trend: f64,
    fitted: Vec<f64>,
    sse: f64,
}

impl FittedModel {
    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn trend(&self) -> f64 {
        self.trend
    }

    /// In-sample one-step-ahead values, one per observed day.
    pub fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    /// Sum of squared one-step-ahead errors.
    pub fn sse(&self) -> f64 {
        self.sse
    }

    /// `horizon` predictions, starting the day after the last observation.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|step| self.level + step as f64 * self.trend)
            .collect()
    }

    /// Reconstruction followed by the forecast: `len(series) + horizon` values.
    pub fn augmented(&self, horizon: usize) -> Vec<f64> {
        let mut values = self.fitted.clone();
        values.extend(self.forecast(horizon));
        values
    }
}
