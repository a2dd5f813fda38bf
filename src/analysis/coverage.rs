//! Data-sufficiency gating.

use crate::content::{fill, CoverageCopy};
use crate::models::{Dimension, ProfileResult};

/// Minimum number of dimensions both participants must have scores for.
pub const MIN_COMPARABLE_DIMENSIONS: usize = 4;

/// Outcome of the coverage evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageAssessment {
    pub comparable_dimensions: usize,
    pub total_dimensions: usize,
    pub is_data_sufficient: bool,
}

impl CoverageAssessment {
    fn from_count(comparable_dimensions: usize) -> Self {
        Self {
            comparable_dimensions,
            total_dimensions: Dimension::ALL.len(),
            is_data_sufficient: comparable_dimensions >= MIN_COMPARABLE_DIMENSIONS,
        }
    }

    /// The literal ratio, e.g. `3/6 Dimensionen belastbar`.
    pub fn ratio(&self, copy: &CoverageCopy) -> String {
        fill(
            &copy.ratio,
            &[
                ("comparable", &self.comparable_dimensions.to_string()),
                ("total", &self.total_dimensions.to_string()),
            ],
        )
    }

    /// Coverage note. Always rendered, phrased positively when sufficient.
    pub fn note(&self, copy: &CoverageCopy) -> String {
        let ratio = self.ratio(copy);
        if self.is_data_sufficient {
            fill(&copy.sufficient, &[("ratio", &ratio)])
        } else {
            let head = fill(
                &copy.insufficient,
                &[
                    ("ratio", &ratio),
                    ("min", &MIN_COMPARABLE_DIMENSIONS.to_string()),
                ],
            );
            format!("{} {}", head, copy.suppressed)
        }
    }
}

/// Dimensions where both participants have a score.
pub fn comparable_dimensions(a: &ProfileResult, b: &ProfileResult) -> Vec<Dimension> {
    Dimension::ALL
        .into_iter()
        .filter(|d| a.score(*d).is_some() && b.score(*d).is_some())
        .collect()
}

/// Evaluate whether two profiles support a valid comparison.
pub fn evaluate_pair(a: &ProfileResult, b: &ProfileResult) -> CoverageAssessment {
    CoverageAssessment::from_count(comparable_dimensions(a, b).len())
}

/// Evaluate a single profile against the same threshold.
pub fn evaluate_single(profile: &ProfileResult) -> CoverageAssessment {
    CoverageAssessment::from_count(profile.scored_dimensions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentPack;
    use crate::test_support::profile_with_scores;

    #[test]
    fn test_three_of_six_is_insufficient() {
        let a = profile_with_scores("a", &[Some(2.0), Some(3.0), Some(4.0), None, None, Some(5.0)]);
        let b = profile_with_scores("b", &[Some(2.0), Some(3.0), Some(4.0), Some(1.0), None, None]);

        let assessment = evaluate_pair(&a, &b);
        assert_eq!(assessment.comparable_dimensions, 3);
        assert!(!assessment.is_data_sufficient);

        let pack = ContentPack::default_pack().unwrap();
        let note = assessment.note(&pack.narrative.coverage);
        assert!(note.contains("3/6"));
        assert!(note.contains("3/6 Dimensionen belastbar"));
        assert!(note.contains("Teamklassifikation wird ausgesetzt"));
    }

    #[test]
    fn test_four_of_six_is_sufficient() {
        let a = profile_with_scores("a", &[Some(2.0), Some(3.0), Some(4.0), Some(4.0), None, None]);
        let b = profile_with_scores("b", &[Some(2.0), Some(3.0), Some(4.0), Some(1.0), Some(3.0), None]);

        let assessment = evaluate_pair(&a, &b);
        assert_eq!(assessment.comparable_dimensions, 4);
        assert!(assessment.is_data_sufficient);

        let pack = ContentPack::default_pack().unwrap();
        let note = assessment.note(&pack.narrative.coverage);
        assert!(note.contains("4/6 Dimensionen belastbar"));
        assert!(!note.contains("ausgesetzt"));
    }

    #[test]
    fn test_single_profile_coverage() {
        let a = profile_with_scores("a", &[Some(2.0), None, None, None, None, Some(5.0)]);
        let assessment = evaluate_single(&a);
        assert_eq!(assessment.comparable_dimensions, 2);
        assert!(!assessment.is_data_sufficient);
    }
}
