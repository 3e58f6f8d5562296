//! # Linear Prediction
//!
//! The continuous prediction is the intercept plus the dot product of the
//! frozen coefficients with the scaled vector. Deterministic and stateless:
//! the same vector always yields the same score.

use crate::artifacts::ModelArtifacts;
use ndarray::Array1;

/// Computes the linear predictor for one scaled vector.
pub fn predict(scaled: &Array1<f64>, artifacts: &ModelArtifacts) -> f64 {
    debug_assert_eq!(scaled.len(), artifacts.coefficients().len());
    artifacts.intercept() + artifacts.coefficients().dot(scaled)
}
