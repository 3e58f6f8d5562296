//! # Model Artifact Loading and Validation
//!
//! This module is the exclusive entry point for the frozen model state the
//! engine serves from. Fitting happens offline, once, and hands over three
//! immutable TOML blobs:
//!
//! - `encoders.toml`: the closed category vocabulary per categorical
//!   feature, mapping category strings to the integer indices used at fit
//!   time. The assignment is opaque artifact data; it is never re-derived.
//! - `scaler.toml`: per-feature standardization statistics (mean, std).
//! - `model.toml`: the canonical feature order, one coefficient per
//!   feature, the intercept, and the bucket table that maps a continuous
//!   score back to a human-readable performance range.
//!
//! Loading cross-checks the three blobs against each other and against the
//! request schema. A bundle that loads successfully is a guarantee that
//! every downstream stage can run without re-validating artifact state:
//! vector position `i` always corresponds to `feature_order()[i]`, every
//! categorical feature has a non-empty vocabulary, and the bucket table
//! partitions its range with no gap or overlap.

use crate::validate::{NUMERIC_FIELDS, SCHEMA_FIELDS};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the category-vocabulary blob inside an artifact directory.
pub const ENCODERS_FILE: &str = "encoders.toml";
/// File name of the normalization-statistics blob.
pub const SCALER_FILE: &str = "scaler.toml";
/// File name of the linear-model blob.
pub const MODEL_FILE: &str = "model.toml";

/// A comprehensive error type for all artifact loading and validation
/// failures. Every variant is fatal: a process that cannot assemble a
/// consistent bundle must not serve predictions.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read or write artifact file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML artifact file: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize artifact to TOML format: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Artifact file '{0}' was not found. The engine cannot serve without it.")]
    MissingBlob(PathBuf),
    #[error(
        "The model declares {expected} features but carries {found} coefficients. \
         The blobs do not come from the same fit."
    )]
    CoefficientCountMismatch { expected: usize, found: usize },
    #[error(
        "Feature '{0}' appears in the model's feature order but is not a field of the \
         request schema."
    )]
    UnknownFeature(String),
    #[error("Feature '{0}' appears more than once in the model's feature order.")]
    DuplicateFeature(String),
    #[error("No normalization statistics were found for feature '{0}'.")]
    MissingStats(String),
    #[error(
        "Normalization statistics for feature '{feature}' carry a negative standard \
         deviation ({std})."
    )]
    NegativeStdDev { feature: String, std: f64 },
    #[error("No category map was found for categorical feature '{0}'.")]
    MissingCategoryMap(String),
    #[error("The category map for feature '{0}' is empty.")]
    EmptyCategoryMap(String),
    #[error("The bucket table is empty.")]
    EmptyBucketTable,
    #[error("Bucket '{label}' has lower bound {lower} not below its upper bound {upper}.")]
    InvertedBucket {
        label: String,
        lower: f64,
        upper: f64,
    },
    #[error(
        "Bucket '{label}' starts at {lower} but the previous bucket ends at \
         {previous_upper}. The table must partition its range with no gap or overlap."
    )]
    DiscontinuousBuckets {
        label: String,
        lower: f64,
        previous_upper: f64,
    },
}

/// Blob 1: the frozen category vocabulary per categorical feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMaps {
    pub version: u32,
    /// category string -> integer index, keyed by feature name. Closed: a
    /// value absent from its map is rejected at encode time, never guessed.
    pub features: HashMap<String, HashMap<String, u32>>,
}

/// Standardization statistics for a single feature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureStats {
    pub mean: f64,
    pub std: f64,
}

/// Blob 2: per-feature normalization statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormStats {
    pub version: u32,
    pub features: HashMap<String, FeatureStats>,
}

/// One row of the score-to-range reverse mapping. Lower bounds are
/// inclusive, upper bounds exclusive; the topmost bucket of a table is
/// closed on both ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub label: String,
    pub message: String,
}

/// Blob 3: the linear model itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub version: u32,
    /// Defines the vector position of every feature. This order is strictly
    /// enforced across encoding, scaling and prediction; it must match the
    /// order used at fit time.
    pub feature_order: Vec<String>,
    /// One weight per feature, aligned to `feature_order`.
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    /// Score-to-range table, sorted ascending and contiguous.
    pub buckets: Vec<Bucket>,
}

macro_rules! impl_toml_blob {
    ($ty:ty) => {
        impl $ty {
            /// Saves the blob to a human-readable TOML file.
            pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
                let toml_string = toml::to_string_pretty(self)?;
                let mut file = BufWriter::new(fs::File::create(path)?);
                file.write_all(toml_string.as_bytes())?;
                Ok(())
            }

            /// Loads the blob from a TOML file.
            pub fn load(path: &Path) -> Result<Self, ArtifactError> {
                if !path.exists() {
                    return Err(ArtifactError::MissingBlob(path.to_path_buf()));
                }
                let toml_string = fs::read_to_string(path)?;
                Ok(toml::from_str(&toml_string)?)
            }
        }
    };
}

impl_toml_blob!(CategoryMaps);
impl_toml_blob!(NormStats);
impl_toml_blob!(LinearModel);

/// The availability surface reported to the serving layer before it accepts
/// inference requests. One flag per blob, produced by probing the artifact
/// directory without assembling the bundle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArtifactStatus {
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub encoders_loaded: bool,
}

impl ArtifactStatus {
    /// Probes each blob in `dir` independently. A flag is true only when
    /// the corresponding file exists and parses.
    pub fn probe(dir: &Path) -> Self {
        Self {
            model_loaded: LinearModel::load(&dir.join(MODEL_FILE)).is_ok(),
            scaler_loaded: NormStats::load(&dir.join(SCALER_FILE)).is_ok(),
            encoders_loaded: CategoryMaps::load(&dir.join(ENCODERS_FILE)).is_ok(),
        }
    }

    pub fn all_loaded(&self) -> bool {
        self.model_loaded && self.scaler_loaded && self.encoders_loaded
    }
}

/// The assembled, cross-validated artifact bundle.
///
/// Fields are private so the consistency established by [`from_parts`] can
/// never be bypassed: a `ModelArtifacts` in hand is proof that the three
/// blobs agree with each other and with the request schema. The bundle is
/// loaded once per process and shared read-only by every inference call.
///
/// [`from_parts`]: ModelArtifacts::from_parts
#[derive(Debug)]
pub struct ModelArtifacts {
    encoders: CategoryMaps,
    scaler: NormStats,
    model: LinearModel,
    /// Per-feature means, aligned to `model.feature_order`.
    means: Array1<f64>,
    /// Per-feature standard deviations, aligned to `model.feature_order`.
    stds: Array1<f64>,
}

impl ModelArtifacts {
    /// Loads and cross-validates the three blobs from an artifact directory.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let encoders = CategoryMaps::load(&dir.join(ENCODERS_FILE))?;
        let scaler = NormStats::load(&dir.join(SCALER_FILE))?;
        let model = LinearModel::load(&dir.join(MODEL_FILE))?;
        let artifacts = Self::from_parts(encoders, scaler, model)?;
        log::info!(
            "loaded model artifacts from {}: {} features, {} category maps, {} buckets \
             (versions: encoders v{}, scaler v{}, model v{})",
            dir.display(),
            artifacts.feature_order().len(),
            artifacts.encoders.features.len(),
            artifacts.buckets().len(),
            artifacts.encoders_version(),
            artifacts.scaler_version(),
            artifacts.model_version(),
        );
        Ok(artifacts)
    }

    /// Assembles a bundle from already-deserialized blobs, enforcing every
    /// cross-blob invariant the inference stages rely on.
    pub fn from_parts(
        encoders: CategoryMaps,
        scaler: NormStats,
        model: LinearModel,
    ) -> Result<Self, ArtifactError> {
        if model.coefficients.len() != model.feature_order.len() {
            return Err(ArtifactError::CoefficientCountMismatch {
                expected: model.feature_order.len(),
                found: model.coefficients.len(),
            });
        }

        let mut seen = HashSet::new();
        let mut means = Vec::with_capacity(model.feature_order.len());
        let mut stds = Vec::with_capacity(model.feature_order.len());
        for feature in &model.feature_order {
            if !SCHEMA_FIELDS.contains(&feature.as_str()) {
                return Err(ArtifactError::UnknownFeature(feature.clone()));
            }
            if !seen.insert(feature.as_str()) {
                return Err(ArtifactError::DuplicateFeature(feature.clone()));
            }
            let stats = scaler
                .features
                .get(feature)
                .ok_or_else(|| ArtifactError::MissingStats(feature.clone()))?;
            if stats.std < 0.0 {
                return Err(ArtifactError::NegativeStdDev {
                    feature: feature.clone(),
                    std: stats.std,
                });
            }
            means.push(stats.mean);
            stds.push(stats.std);

            if !NUMERIC_FIELDS.contains(&feature.as_str()) {
                let map = encoders
                    .features
                    .get(feature)
                    .ok_or_else(|| ArtifactError::MissingCategoryMap(feature.clone()))?;
                if map.is_empty() {
                    return Err(ArtifactError::EmptyCategoryMap(feature.clone()));
                }
            }
        }

        validate_bucket_table(&model.buckets)?;

        Ok(Self {
            encoders,
            scaler,
            model,
            means: Array1::from(means),
            stds: Array1::from(stds),
        })
    }

    // --- Read-only accessors for the inference stages ---

    pub fn feature_order(&self) -> &[String] {
        &self.model.feature_order
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.model.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.model.intercept
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.model.buckets
    }

    /// Per-feature means, position-aligned to `feature_order()`.
    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    /// Per-feature standard deviations, position-aligned to
    /// `feature_order()`.
    pub fn stds(&self) -> &Array1<f64> {
        &self.stds
    }

    /// Looks up the frozen integer index of a category value. `None` means
    /// the value lies outside the training vocabulary.
    pub fn category_index(&self, feature: &str, value: &str) -> Option<u32> {
        self.encoders.features.get(feature)?.get(value).copied()
    }

    pub fn encoders_version(&self) -> u32 {
        self.encoders.version
    }

    pub fn scaler_version(&self) -> u32 {
        self.scaler.version
    }

    pub fn model_version(&self) -> u32 {
        self.model.version
    }
}

fn validate_bucket_table(buckets: &[Bucket]) -> Result<(), ArtifactError> {
    if buckets.is_empty() {
        return Err(ArtifactError::EmptyBucketTable);
    }
    let mut previous_upper: Option<f64> = None;
    for bucket in buckets {
        if bucket.lower >= bucket.upper {
            return Err(ArtifactError::InvertedBucket {
                label: bucket.label.clone(),
                lower: bucket.lower,
                upper: bucket.upper,
            });
        }
        if let Some(previous) = previous_upper {
            if bucket.lower != previous {
                return Err(ArtifactError::DiscontinuousBuckets {
                    label: bucket.label.clone(),
                    lower: bucket.lower,
                    previous_upper: previous,
                });
            }
        }
        previous_upper = Some(bucket.upper);
    }
    Ok(())
}
