//! # Score Classification
//!
//! Maps a continuous prediction onto the bucket table: lower bounds are
//! inclusive, upper bounds exclusive, and the topmost bucket is closed on
//! both ends, so a score exactly on the top boundary still classifies.
//!
//! Linear extrapolation can push a score outside the covered range; the
//! underlying grade metric has a known natural range, so out-of-range
//! scores clamp to the nearest boundary bucket instead of erroring.

use crate::artifacts::Bucket;

/// Finds the bucket containing `score`. The table is validated non-empty,
/// sorted and contiguous at artifact load.
pub fn classify(score: f64, buckets: &[Bucket]) -> &Bucket {
    let (last, rest) = buckets
        .split_last()
        .expect("bucket table is validated non-empty at artifact load");
    rest.iter().find(|b| score < b.upper).unwrap_or(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::fixtures::bucket_table;

    fn label_for(score: f64) -> String {
        classify(score, &bucket_table()).label.clone()
    }

    #[test]
    fn every_score_maps_to_exactly_one_bucket() {
        assert_eq!(label_for(0.0), "Poor (0.00 - 1.99)");
        assert_eq!(label_for(1.999), "Poor (0.00 - 1.99)");
        assert_eq!(label_for(2.0), "Below Average (2.00 - 2.49)");
        assert_eq!(label_for(2.5), "Average (2.50 - 2.99)");
        assert_eq!(label_for(3.25), "Good (3.00 - 3.49)");
        assert_eq!(label_for(3.49), "Good (3.00 - 3.49)");
    }

    #[test]
    fn boundaries_are_inclusive_lower_exclusive_upper() {
        // Exactly 3.50 belongs to the upper bucket.
        assert_eq!(label_for(3.5), "Excellent (3.50 - 4.00)");
        assert_eq!(label_for(3.0), "Good (3.00 - 3.49)");
    }

    #[test]
    fn topmost_bucket_is_closed_on_both_ends() {
        assert_eq!(label_for(4.0), "Excellent (3.50 - 4.00)");
    }

    #[test]
    fn out_of_range_scores_clamp_to_boundary_buckets() {
        assert_eq!(label_for(-0.75), "Poor (0.00 - 1.99)");
        assert_eq!(label_for(4.8), "Excellent (3.50 - 4.00)");
    }
}
