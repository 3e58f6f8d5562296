//! # Feature Standardization
//!
//! Applies the frozen per-feature statistics: each entry becomes
//! `(value - mean) / std`. A feature whose training std is zero carries no
//! information the model could have used, so its scaled entry is defined as
//! zero rather than raising a division fault.

use crate::artifacts::ModelArtifacts;
use ndarray::Array1;

/// Standardizes an encoded vector. Purely functional; the statistics are
/// position-aligned to the encoded vector by construction of the artifact
/// bundle.
pub fn scale(encoded: &Array1<f64>, artifacts: &ModelArtifacts) -> Array1<f64> {
    debug_assert_eq!(encoded.len(), artifacts.means().len());
    let mut scaled = encoded - artifacts.means();
    scaled.zip_mut_with(artifacts.stds(), |value, &std| {
        *value = if std == 0.0 { 0.0 } else { *value / std };
    });
    scaled
}
