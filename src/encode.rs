//! # Feature Encoding
//!
//! Turns a validated record into the ordered numeric vector the model was
//! fitted on. Categorical fields are looked up in the frozen category maps;
//! the returned index is the encoded value. Course is categorical here too:
//! at inference time its vocabulary is whatever existed at fit time, not
//! free text. The numeric field (age) passes through unchanged.
//!
//! A value outside a feature's frozen vocabulary is rejected, never mapped
//! to a default. Silently guessing would shift the input distribution the
//! linear model was fitted on; rejection also surfaces vocabulary drift
//! (new course names and the like), which is why the rejection is logged at
//! `warn` level.

use crate::artifacts::ModelArtifacts;
use crate::validate::StudentRecord;
use ndarray::Array1;
use thiserror::Error;

/// A per-request encoding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error(
        "Value '{value}' for feature '{feature}' is outside the frozen training \
         vocabulary."
    )]
    UnknownCategory { feature: String, value: String },
}

enum FieldValue<'a> {
    Numeric(f64),
    Categorical(&'a str),
}

/// The binding between artifact feature names and record fields. The
/// feature order is validated against the request schema at artifact load,
/// so every name reaching this match is covered.
fn field_value<'a>(record: &'a StudentRecord, feature: &str) -> FieldValue<'a> {
    match feature {
        "age" => FieldValue::Numeric(f64::from(record.age)),
        "gender" => FieldValue::Categorical(record.gender.label()),
        "course" => FieldValue::Categorical(&record.course),
        "year" => FieldValue::Categorical(record.year.label()),
        "marital_status" => FieldValue::Categorical(record.marital_status.label()),
        "depression" => FieldValue::Categorical(record.depression.label()),
        "anxiety" => FieldValue::Categorical(record.anxiety.label()),
        "panic_attack" => FieldValue::Categorical(record.panic_attack.label()),
        "treatment" => FieldValue::Categorical(record.treatment.label()),
        other => unreachable!("feature '{other}' not caught by artifact validation"),
    }
}

/// Encodes a validated record into a vector position-aligned to the
/// artifact's feature order.
pub fn encode(
    record: &StudentRecord,
    artifacts: &ModelArtifacts,
) -> Result<Array1<f64>, EncodeError> {
    let order = artifacts.feature_order();
    let mut values = Vec::with_capacity(order.len());
    for feature in order {
        let value = match field_value(record, feature) {
            FieldValue::Numeric(x) => x,
            FieldValue::Categorical(raw) => match artifacts.category_index(feature, raw) {
                Some(index) => f64::from(index),
                None => {
                    log::warn!(
                        "rejecting record: value '{raw}' for feature '{feature}' is outside \
                         the frozen vocabulary"
                    );
                    return Err(EncodeError::UnknownCategory {
                        feature: feature.clone(),
                        value: raw.to_string(),
                    });
                }
            },
        };
        values.push(value);
    }
    Ok(Array1::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::fixtures::reference_artifacts;
    use crate::validate::{fixtures::reference_raw, validate};

    #[test]
    fn vector_is_aligned_to_feature_order() {
        let artifacts = reference_artifacts();
        let record = validate(&reference_raw()).expect("valid record");
        let encoded = encode(&record, &artifacts).expect("known categories");

        assert_eq!(encoded.len(), artifacts.feature_order().len());
        // age passes through; Male -> 1, Engineering -> 1, year 2 -> 1,
        // No -> 0, No -> 0, Yes -> 1, No -> 0, No -> 0.
        assert_eq!(
            encoded,
            ndarray::array![21.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn unknown_course_is_rejected_not_coerced() {
        let artifacts = reference_artifacts();
        let mut raw = reference_raw();
        raw.course = "Astrobiology".to_string();
        let record = validate(&raw).expect("schema-valid record");
        let err = encode(&record, &artifacts).unwrap_err();
        assert_eq!(
            err,
            EncodeError::UnknownCategory {
                feature: "course".to_string(),
                value: "Astrobiology".to_string(),
            }
        );
    }
}
