//! Pairwise comparison of two profiles.
//!
//! Produces one block per dimension, the aggregate team type and the
//! deterministic match/tension rankings. All orderings tie-break on the
//! dimension declaration order.

use crate::analysis::classifier::classify;
use crate::analysis::coverage::evaluate_pair;
use crate::content::{ContentPack, DiffThresholds};
use crate::models::{
    round_to, CompareDimensionBlock, CompareLabel, CompareResult, Dimension, DiffClass,
    ProfileResult, TeamType, Zone, NEUTRAL_SCORE,
};
use tracing::debug;

/// Number of blocks kept for top matches and top tensions.
pub const TOP_BLOCKS: usize = 3;

/// Number of key insights kept.
pub const MAX_KEY_INSIGHTS: usize = 3;

/// Team type boundaries on the summed deltas.
pub const HARMONIC_MAX_SUM: f64 = 6.0;
pub const BALANCED_MAX_SUM: f64 = 12.0;

/// Classify an absolute delta.
pub fn diff_class(diff: f64, thresholds: &DiffThresholds) -> DiffClass {
    if diff < thresholds.medium_from {
        DiffClass::Small
    } else if diff <= thresholds.large_above {
        DiffClass::Medium
    } else {
        DiffClass::Large
    }
}

/// Rounded absolute delta, `None` unless both scores are present.
pub fn score_diff(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(round_to((a - b).abs(), 2)),
        _ => None,
    }
}

/// Team type for a delta sum. Insufficient data always wins.
pub fn team_type(diff_sum: f64, is_data_sufficient: bool) -> TeamType {
    if !is_data_sufficient {
        TeamType::DatenlageUnvollstaendig
    } else if diff_sum <= HARMONIC_MAX_SUM {
        TeamType::HarmonischeStabilisatoren
    } else if diff_sum <= BALANCED_MAX_SUM {
        TeamType::BalancierteStrategen
    } else {
        TeamType::HighFrictionPowerDuo
    }
}

/// Compare one dimension of two profiles.
pub fn compare_dimension(
    dimension: Dimension,
    a: &ProfileResult,
    b: &ProfileResult,
    content: &ContentPack,
) -> CompareDimensionBlock {
    let dimension_content = content.dimension(dimension);
    let score_a = a.score(dimension);
    let score_b = b.score(dimension);
    let class_a = classify(dimension, score_a, content);
    let class_b = classify(dimension, score_b, content);

    let diff = score_diff(score_a, score_b);
    let diff_class = diff.map(|d| diff_class(d, &dimension_content.diff_thresholds));
    let label = diff_class
        .map(|c| c.label())
        .unwrap_or(CompareLabel::DatenUnvollstaendig);

    let reflection = &dimension_content.reflection;
    let reflection_question = match diff_class {
        Some(DiffClass::Small) => &reflection.small,
        Some(DiffClass::Medium) => &reflection.medium,
        Some(DiffClass::Large) => &reflection.large,
        None => &reflection.incomplete,
    };

    CompareDimensionBlock {
        dimension,
        title: dimension_content.title.clone(),
        score_a,
        score_b,
        zone_a: class_a.zone,
        zone_b: class_b.zone,
        archetype_a: class_a.archetype,
        archetype_b: class_b.archetype,
        diff,
        diff_class,
        label,
        daily_pressure: dimension_content.daily_pressure.clone(),
        reflection_question: reflection_question.clone(),
    }
}

/// Compare two profiles across all dimensions.
pub fn compare(a: &ProfileResult, b: &ProfileResult, content: &ContentPack) -> CompareResult {
    let blocks: Vec<CompareDimensionBlock> = Dimension::ALL
        .into_iter()
        .map(|d| compare_dimension(d, a, b, content))
        .collect();

    let assessment = evaluate_pair(a, b);
    let diff_sum = round_to(blocks.iter().filter_map(|b| b.diff).sum(), 2);
    let summary_type = team_type(diff_sum, assessment.is_data_sufficient);

    debug!(
        "Compared {} / {}: {} comparable, diff sum {}, {}",
        a.profile_id, b.profile_id, assessment.comparable_dimensions, diff_sum, summary_type
    );

    CompareResult {
        top_matches: rank_blocks(&blocks, false),
        top_tensions: rank_blocks(&blocks, true),
        blocks,
        comparable_dimension_count: assessment.comparable_dimensions,
        is_data_sufficient: assessment.is_data_sufficient,
        diff_sum,
        summary_type,
    }
}

/// Rank comparable blocks by delta, ascending for matches and descending
/// for tensions.
pub fn rank_blocks(blocks: &[CompareDimensionBlock], descending: bool) -> Vec<Dimension> {
    let mut ranked: Vec<(f64, Dimension)> = blocks
        .iter()
        .filter_map(|b| b.diff.map(|d| (d, b.dimension)))
        .collect();

    ranked.sort_by(|(da, dim_a), (db, dim_b)| {
        let by_diff = if descending {
            db.total_cmp(da)
        } else {
            da.total_cmp(db)
        };
        by_diff.then_with(|| dim_a.cmp(dim_b))
    });

    ranked.into_iter().take(TOP_BLOCKS).map(|(_, d)| d).collect()
}

/// A ranked key-insight candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightCandidate {
    pub dimension: Dimension,
    pub rank_score: f64,
    pub zone: Zone,
}

/// The more pronounced of two zones, judged by distance from neutral.
fn dominant_zone(profile: &ProfileResult, partner: &ProfileResult, dimension: Dimension) -> Zone {
    let deviation = |p: &ProfileResult| {
        p.score(dimension)
            .map(|s| (s - NEUTRAL_SCORE).abs())
            .unwrap_or(0.0)
    };
    if deviation(partner) > deviation(profile) {
        partner.zone(dimension)
    } else {
        profile.zone(dimension)
    }
}

/// Rank the key insights of a profile, with or without a partner.
///
/// With a partner the delta is the rank score, otherwise the distance from
/// the neutral midpoint. Low and high zones outrank mid at equal score.
/// At most one insight per dimension is kept.
pub fn rank_key_insights(
    profile: &ProfileResult,
    partner: Option<&ProfileResult>,
) -> Vec<InsightCandidate> {
    let mut candidates: Vec<InsightCandidate> = Dimension::ALL
        .into_iter()
        .filter_map(|dimension| match partner {
            Some(partner) => {
                score_diff(profile.score(dimension), partner.score(dimension)).map(|diff| {
                    InsightCandidate {
                        dimension,
                        rank_score: diff,
                        zone: dominant_zone(profile, partner, dimension),
                    }
                })
            }
            None => profile.score(dimension).map(|score| InsightCandidate {
                dimension,
                rank_score: round_to((score - NEUTRAL_SCORE).abs(), 2),
                zone: profile.zone(dimension),
            }),
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.rank_score
            .total_cmp(&a.rank_score)
            .then_with(|| b.zone.is_edge().cmp(&a.zone.is_edge()))
            .then_with(|| a.dimension.cmp(&b.dimension))
    });
    candidates.dedup_by_key(|c| c.dimension);
    candidates.truncate(MAX_KEY_INSIGHTS);
    candidates
}
