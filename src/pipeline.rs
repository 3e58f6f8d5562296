//! # The Inference Pipeline
//!
//! One pure pass per request, in fixed order: validate, encode, scale,
//! predict, classify. There is no retry, no branching back and no state
//! between stages; concurrent requests share the artifact bundle read-only
//! and nothing else, so arbitrarily many may run in parallel without
//! locking.

use crate::artifacts::ModelArtifacts;
use crate::encode::{self, EncodeError};
use crate::validate::{self, RawStudentRecord, StudentRecord, ValidationError};
use crate::{classify, predict, scale};
use serde::Serialize;
use thiserror::Error;

/// The response contract: the continuous prediction plus its
/// human-readable interpretation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Prediction {
    pub predicted_cgpa: f64,
    pub cgpa_range: String,
    pub message: String,
}

/// The union of per-request failures. Both are local to the request: they
/// never affect other in-flight requests or the artifact bundle.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Runs the full pipeline on one raw record.
pub fn predict_record(
    raw: &RawStudentRecord,
    artifacts: &ModelArtifacts,
) -> Result<Prediction, PredictError> {
    let record = validate::validate(raw)?;
    Ok(predict_validated(&record, artifacts)?)
}

/// Runs the artifact-dependent stages on an already-validated record.
pub fn predict_validated(
    record: &StudentRecord,
    artifacts: &ModelArtifacts,
) -> Result<Prediction, EncodeError> {
    let encoded = encode::encode(record, artifacts)?;
    let scaled = scale::scale(&encoded, artifacts);
    let score = predict::predict(&scaled, artifacts);
    let bucket = classify::classify(score, artifacts.buckets());
    Ok(Prediction {
        predicted_cgpa: score,
        cgpa_range: bucket.label.clone(),
        message: bucket.message.clone(),
    })
}
