//! Radiative cooling curve
//!
//! The magnetosphere temperature law only needs the pair of inverse maps
//! between temperature and the logarithm of the radiative loss rate. The
//! default curve tabulates log₁₀Λ against log₁₀T for an optically thin
//! hydrogen-dominated plasma between ~3×10³ K and 10⁵ K, where the loss rate
//! rises monotonically (steeply through hydrogen ionisation near 10⁴ K).
//!
//! Both maps interpolate linearly in log-log space and extrapolate the end
//! segments, so each is a bijection of the real line.

use crate::error::{ModelError, ModelResult};
use std::cmp::Ordering;

/// Monotonic mapping between temperature and log₁₀ of a cooling-rate proxy
pub trait CoolingCurve: Send + Sync {
    /// Temperature (K) for a log₁₀ radiative loss rate
    fn temperature(&self, log_rate: f64) -> f64;

    /// log₁₀ radiative loss rate for a temperature (K)
    fn log_rate(&self, temperature: f64) -> f64;
}

/// (log₁₀T [K], log₁₀Λ [erg cm³ s⁻¹])
const DEFAULT_TABLE: [(f64, f64); 17] = [
    (3.50, -26.90),
    (3.60, -26.20),
    (3.70, -25.40),
    (3.80, -24.60),
    (3.90, -23.60),
    (4.00, -22.60),
    (4.10, -21.95),
    (4.20, -21.62),
    (4.30, -21.45),
    (4.40, -21.35),
    (4.50, -21.26),
    (4.60, -21.18),
    (4.70, -21.10),
    (4.80, -21.02),
    (4.90, -20.95),
    (5.00, -20.89),
    (5.10, -20.84),
];

/// Piecewise log-log cooling table
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedCoolingCurve {
    log_t: Vec<f64>,
    log_lambda: Vec<f64>,
}

impl Default for TabulatedCoolingCurve {
    fn default() -> Self {
        Self {
            log_t: DEFAULT_TABLE.iter().map(|&(t, _)| t).collect(),
            log_lambda: DEFAULT_TABLE.iter().map(|&(_, l)| l).collect(),
        }
    }
}

impl TabulatedCoolingCurve {
    /// Build a curve from log₁₀T and log₁₀Λ columns.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if the columns differ in length
    /// or hold fewer than two rows, and [`ModelError::InvalidParameter`] if a
    /// column is not strictly increasing.
    pub fn new(log_t: Vec<f64>, log_lambda: Vec<f64>) -> ModelResult<Self> {
        if log_t.len() != log_lambda.len() || log_t.len() < 2 {
            return Err(ModelError::ShapeMismatch(format!(
                "cooling table needs two columns of equal length >= 2, got {} and {}",
                log_t.len(),
                log_lambda.len()
            )));
        }
        for (name, col) in [("log_t", &log_t), ("log_lambda", &log_lambda)] {
            if let Some(w) = col
                .windows(2)
                .find(|w| w[1].partial_cmp(&w[0]) != Some(Ordering::Greater))
            {
                return Err(ModelError::InvalidParameter {
                    name,
                    value: w[1],
                    reason: "cooling table column must be strictly increasing",
                });
            }
        }
        Ok(Self { log_t, log_lambda })
    }

    /// Tabulated temperature range (K)
    pub fn temperature_range(&self) -> (f64, f64) {
        (
            10f64.powf(self.log_t[0]),
            10f64.powf(self.log_t[self.log_t.len() - 1]),
        )
    }
}

/// Linear interpolation of `ys(xs)` at `x`, extrapolating the end segments.
/// `xs` must be strictly increasing with at least two entries.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    // Index of the segment [k, k+1] holding x, clamped to the end segments
    let k = xs.partition_point(|&v| v <= x).clamp(1, n - 1) - 1;
    let slope = (ys[k + 1] - ys[k]) / (xs[k + 1] - xs[k]);
    ys[k] + slope * (x - xs[k])
}

impl CoolingCurve for TabulatedCoolingCurve {
    fn temperature(&self, log_rate: f64) -> f64 {
        10f64.powf(interpolate(&self.log_lambda, &self.log_t, log_rate))
    }

    fn log_rate(&self, temperature: f64) -> f64 {
        interpolate(&self.log_t, &self.log_lambda, temperature.log10())
    }
}
