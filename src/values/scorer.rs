//! Values sub-scoring.
//!
//! Turns values answers into per-archetype cluster scores, a primary and
//! secondary archetype, and a position on the 1–6 values continuum.
//! Two continuum positions yield a symmetric alignment percentage.

use crate::analysis::aggregator::{is_values_question, latest_answers, normalize_answer};
use crate::models::{round_to, Answer, QuestionIndex, ValuesArchetype, ValuesProfile, ValuesTier};
use crate::values::classify::ArchetypeClassifier;
use std::collections::BTreeMap;
use tracing::debug;

/// Continuum weight every archetype receives regardless of proximity.
pub const BASE_WEIGHT: f64 = 0.35;

/// Continuum weight earned by proximity to the center.
pub const PROXIMITY_WEIGHT: f64 = 0.65;

/// Extra continuum weight of the primary archetype.
pub const PRIMARY_BONUS: f64 = 0.2;

/// Width of the continuum used to scale distances.
pub const CONTINUUM_SPAN: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
struct WeightedSum {
    value_weight: f64,
    weight: f64,
}

/// Weighted answer average per archetype.
pub fn cluster_scores(
    answers: &[Answer],
    index: &QuestionIndex,
    values_category: &str,
    classifier: &dyn ArchetypeClassifier,
) -> (BTreeMap<ValuesArchetype, f64>, usize) {
    let mut sums: BTreeMap<ValuesArchetype, WeightedSum> = BTreeMap::new();
    let mut answered = 0;

    for (question_id, answer) in latest_answers(answers) {
        let Some(meta) = index.get(question_id) else {
            continue;
        };
        if !is_values_question(meta, values_category) {
            continue;
        }
        let Some(value) = normalize_answer(answer, meta) else {
            continue;
        };

        let mut archetypes = classifier.classify(meta);
        if archetypes.is_empty() {
            archetypes = ValuesArchetype::ALL.to_vec();
        }
        archetypes.sort();
        archetypes.dedup();

        let weight = 1.0 / archetypes.len() as f64;
        for archetype in archetypes {
            let sum = sums.entry(archetype).or_default();
            sum.value_weight += value * weight;
            sum.weight += weight;
        }
        answered += 1;
    }

    let scores = sums
        .into_iter()
        .filter(|(_, sum)| sum.weight > 0.0)
        .map(|(archetype, sum)| (archetype, round_to(sum.value_weight / sum.weight, 2)))
        .collect();

    (scores, answered)
}

/// Highest-scoring archetype not in `exclude`, ties by declaration order.
fn best_archetype(
    scores: &BTreeMap<ValuesArchetype, f64>,
    exclude: Option<ValuesArchetype>,
) -> Option<ValuesArchetype> {
    let mut best: Option<(ValuesArchetype, f64)> = None;
    for archetype in ValuesArchetype::ALL {
        if Some(archetype) == exclude {
            continue;
        }
        let Some(score) = scores.get(&archetype).copied() else {
            continue;
        };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((archetype, score)),
        }
    }
    best.map(|(archetype, _)| archetype)
}

/// Renormalized continuum weights around a center position.
pub fn continuum_weights(
    center: f64,
    primary: ValuesArchetype,
) -> BTreeMap<ValuesArchetype, f64> {
    let raw: Vec<(ValuesArchetype, f64)> = ValuesArchetype::ALL
        .into_iter()
        .map(|archetype| {
            let distance = ((archetype.anchor() - center).abs() / CONTINUUM_SPAN).min(1.0);
            let mut weight = BASE_WEIGHT + PROXIMITY_WEIGHT * (1.0 - distance);
            if archetype == primary {
                weight += PRIMARY_BONUS;
            }
            (archetype, weight)
        })
        .collect();

    let total: f64 = raw.iter().map(|(_, w)| w).sum();
    raw.into_iter().map(|(a, w)| (a, w / total)).collect()
}

/// Build a values profile, or `None` when no values answer is usable.
pub fn score_values(
    answers: &[Answer],
    index: &QuestionIndex,
    values_category: &str,
    classifier: &dyn ArchetypeClassifier,
) -> Option<ValuesProfile> {
    let (scores, answered) = cluster_scores(answers, index, values_category, classifier);
    let expected = index.in_category(values_category).count();
    let primary = best_archetype(&scores, None)?;
    let secondary = best_archetype(&scores, Some(primary));

    let score_total: f64 = scores.values().sum();
    let center = scores
        .iter()
        .map(|(archetype, score)| archetype.anchor() * score)
        .sum::<f64>()
        / score_total;

    let weights = continuum_weights(center, primary);
    let continuum_score = round_to(
        weights
            .iter()
            .map(|(archetype, weight)| archetype.anchor() * weight)
            .sum(),
        2,
    );

    debug!(
        "Values profile: primary {}, center {:.2}, continuum {}, {}/{} answered",
        primary, center, continuum_score, answered, expected
    );

    Some(ValuesProfile {
        cluster_scores: scores,
        weights,
        primary_archetype_id: primary,
        secondary_archetype_id: secondary,
        continuum_score,
        answered,
        expected,
    })
}

/// Alignment of two continuum positions in percent. Symmetric.
pub fn alignment_percent(a: Option<f64>, b: Option<f64>) -> Option<u8> {
    let (a, b) = (a?, b?);
    let closeness = (1.0 - (a - b).abs() / CONTINUUM_SPAN).max(0.0);
    Some((100.0 * closeness).round() as u8)
}

/// Alignment and tier, only when both profiles are resolvable.
pub fn values_alignment(
    a: Option<&ValuesProfile>,
    b: Option<&ValuesProfile>,
) -> Option<(u8, ValuesTier)> {
    let percent = alignment_percent(
        a.map(|p| p.continuum_score),
        b.map(|p| p.continuum_score),
    )?;
    Some((percent, ValuesTier::from_alignment(percent)))
}
