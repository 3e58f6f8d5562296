//! # Bulk Scoring
//!
//! Scores a CSV of student records across a rayon worker pool. Each record
//! is an independent pipeline pass over the shared read-only bundle, so
//! rows parallelize with no locking. Output rows are written in input
//! order.
//!
//! A rejected row aborts the batch with a row-numbered message; batch
//! input is assumed to be operator-supplied and worth fixing at the
//! source, unlike the one-request-at-a-time serving path.

use crate::artifacts::ModelArtifacts;
use crate::pipeline::{self, PredictError, Prediction};
use crate::validate::RawStudentRecord;
use rayon::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to read or write batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse batch input: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row} of the batch input was rejected: {source}")]
    Record {
        /// 1-based data row number, counting from the line after the
        /// header.
        row: usize,
        source: PredictError,
    },
}

/// Scores every record in `input` and writes one prediction row per input
/// row to `output`. Returns the number of records scored.
pub fn score_csv(
    input: &Path,
    output: &Path,
    artifacts: &ModelArtifacts,
) -> Result<usize, BatchError> {
    let mut reader = csv::Reader::from_path(input)?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<RawStudentRecord>, csv::Error>>()?;

    let predictions = records
        .par_iter()
        .enumerate()
        .map(|(index, raw)| {
            pipeline::predict_record(raw, artifacts).map_err(|source| BatchError::Record {
                row: index + 1,
                source,
            })
        })
        .collect::<Result<Vec<Prediction>, BatchError>>()?;

    let mut writer = csv::Writer::from_path(output)?;
    for prediction in &predictions {
        writer.serialize(prediction)?;
    }
    writer.flush()?;
    Ok(predictions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::fixtures::reference_artifacts;
    use std::fs;

    const HEADER: &str =
        "age,gender,course,year,marital_status,depression,anxiety,panic_attack,treatment";

    #[test]
    fn scores_every_row_in_input_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("records.csv");
        let output = dir.path().join("scores.csv");
        fs::write(
            &input,
            format!(
                "{HEADER}\n\
                 21,Male,Engineering,year 2,No,No,Yes,No,No\n\
                 24,Female,Psychology,year 4,Yes,Yes,No,No,Yes\n"
            ),
        )
        .expect("write input");

        let artifacts = reference_artifacts();
        let scored = score_csv(&input, &output, &artifacts).expect("batch succeeds");
        assert_eq!(scored, 2);

        let written = fs::read_to_string(&output).expect("read output");
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("predicted_cgpa,cgpa_range,message"),
            "header row"
        );
        let first = lines.next().expect("first data row");
        assert!(first.starts_with("3.25"), "got row: {first}");
        assert!(first.contains("Good (3.00 - 3.49)"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn rejected_rows_are_reported_by_number() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("records.csv");
        let output = dir.path().join("scores.csv");
        fs::write(
            &input,
            format!(
                "{HEADER}\n\
                 21,Male,Engineering,year 2,No,No,Yes,No,No\n\
                 17,Male,Engineering,year 2,No,No,Yes,No,No\n"
            ),
        )
        .expect("write input");

        let artifacts = reference_artifacts();
        let err = score_csv(&input, &output, &artifacts).unwrap_err();
        match err {
            BatchError::Record { row, .. } => assert_eq!(row, 2),
            other => panic!("expected a row error, got {other}"),
        }
    }
}
