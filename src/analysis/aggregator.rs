//! Dimension aggregation and coverage statistics.
//!
//! Groups normalized answers by dimension into averaged scores and keeps
//! the answer counts the coverage note is built from.

use crate::analysis::normalize::{
    in_scale, normalize, parse_raw_choice, remap_four_point, LEGACY_SCALE_MAX,
};
use crate::models::{
    round_to, Answer, Dimension, DimensionStats, ParticipantCoverage, QuestionIndex,
    QuestionMeta,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Normalize one answer against its question metadata.
///
/// Non-numeric values and values outside the declared scale are dropped.
pub fn normalize_answer(answer: &Answer, meta: &QuestionMeta) -> Option<f64> {
    let raw = parse_raw_choice(&answer.raw_choice_value)?;
    match meta.scale_max {
        Some(max) => in_scale(raw, max).then(|| normalize(raw, max)),
        None => in_scale(raw, LEGACY_SCALE_MAX).then(|| remap_four_point(raw)),
    }
}

/// Collapse duplicate answers so the last answer per question wins.
pub fn latest_answers(answers: &[Answer]) -> BTreeMap<&str, &Answer> {
    let mut latest = BTreeMap::new();
    for answer in answers {
        if latest.insert(answer.question_id.as_str(), answer).is_some() {
            debug!("Duplicate answer for {}, keeping the latest", answer.question_id);
        }
    }
    latest
}

/// Whether a question belongs to the values pipeline.
pub fn is_values_question(meta: &QuestionMeta, values_category: &str) -> bool {
    meta.category.trim().eq_ignore_ascii_case(values_category)
}

/// Count the declared questions per dimension.
pub fn expected_per_dimension(
    index: &QuestionIndex,
    values_category: &str,
) -> BTreeMap<Dimension, usize> {
    let mut expected: BTreeMap<Dimension, usize> =
        Dimension::ALL.iter().map(|d| (*d, 0)).collect();

    for meta in index.iter() {
        if is_values_question(meta, values_category) {
            continue;
        }
        if let Some(dimension) = Dimension::from_label(&meta.dimension_label) {
            *expected.entry(dimension).or_default() += 1;
        }
    }

    expected
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Scores and coverage of one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionAggregate {
    pub scores: BTreeMap<Dimension, Option<f64>>,
    pub coverage: ParticipantCoverage,
}

/// Aggregate one participant's answers into per-dimension scores.
pub fn aggregate_dimensions(
    answers: &[Answer],
    index: &QuestionIndex,
    values_category: &str,
    expected: &BTreeMap<Dimension, usize>,
) -> DimensionAggregate {
    let mut accumulators: BTreeMap<Dimension, Accumulator> = BTreeMap::new();

    for (question_id, answer) in latest_answers(answers) {
        let Some(meta) = index.get(question_id) else {
            debug!("Answer for unknown question {} skipped", question_id);
            continue;
        };
        if is_values_question(meta, values_category) {
            continue;
        }
        let Some(dimension) = Dimension::from_label(&meta.dimension_label) else {
            warn!(
                "Question {} has unknown dimension label '{}', skipped",
                meta.id, meta.dimension_label
            );
            continue;
        };
        match normalize_answer(answer, meta) {
            Some(value) => {
                let acc = accumulators.entry(dimension).or_default();
                acc.sum += value;
                acc.count += 1;
            }
            None => debug!("Answer for {} is not a valid numeric choice", question_id),
        }
    }

    let mut scores = BTreeMap::new();
    let mut per_dimension = BTreeMap::new();
    for dimension in Dimension::ALL {
        let acc = accumulators.get(&dimension).copied().unwrap_or_default();
        let score = (acc.count > 0).then(|| round_to(acc.sum / acc.count as f64, 2));
        scores.insert(dimension, score);
        per_dimension.insert(
            dimension,
            DimensionStats {
                answered_numeric: acc.count,
                expected: expected.get(&dimension).copied().unwrap_or(0),
            },
        );
    }

    let total_answered: usize = per_dimension.values().map(|s| s.answered_numeric).sum();
    let total_expected: usize = per_dimension.values().map(|s| s.expected).sum();
    let coverage_percent = (total_expected > 0)
        .then(|| round_to(100.0 * total_answered as f64 / total_expected as f64, 2));

    DimensionAggregate {
        scores,
        coverage: ParticipantCoverage {
            per_dimension,
            total_answered,
            total_expected,
            coverage_percent,
        },
    }
}
