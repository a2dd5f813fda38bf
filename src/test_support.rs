//! Shared fixtures for unit tests.

use crate::analysis::classifier::display_zone;
use crate::content::ZoneThresholds;
use crate::models::{
    Answer, Dimension, ParticipantCoverage, ProfileResult, QuestionIndex, QuestionMeta,
    ValuesArchetype, ValuesProfile,
};
use crate::session::{ParticipantInput, SessionInput};
use crate::values::scorer::continuum_weights;
use serde_json::json;
use std::collections::BTreeMap;

/// Profile with the given scores in dimension order and no values data.
pub fn profile_with_scores(id: &str, values: &[Option<f64>]) -> ProfileResult {
    let thresholds = ZoneThresholds::default();
    let mut dimension_scores = BTreeMap::new();
    let mut dimension_zones = BTreeMap::new();
    let mut archetype_id_per_dimension = BTreeMap::new();

    for (dimension, score) in Dimension::ALL.into_iter().zip(values.iter().copied()) {
        let zone = display_zone(score, &thresholds);
        dimension_scores.insert(dimension, score);
        dimension_zones.insert(dimension, zone);
        archetype_id_per_dimension.insert(dimension, format!("{}_{}", dimension.id(), zone));
    }

    ProfileResult {
        profile_id: id.to_string(),
        display_name: id.to_string(),
        dimension_scores,
        dimension_zones,
        archetype_id_per_dimension,
        values_score: None,
        values_archetype_id: None,
        values_profile: None,
        coverage: ParticipantCoverage::default(),
    }
}

/// Like [`profile_with_scores`] with a display name distinct from the id.
pub fn named_profile(name: &str, values: &[Option<f64>]) -> ProfileResult {
    let mut profile = profile_with_scores(&name.to_lowercase(), values);
    profile.display_name = name.to_string();
    profile
}

/// The same score on all six dimensions.
pub fn scores(value: f64) -> [Option<f64>; 6] {
    [Some(value); 6]
}

/// Values profile positioned at `continuum` with the given primary archetype.
pub fn values_profile(primary: ValuesArchetype, continuum: f64) -> ValuesProfile {
    ValuesProfile {
        cluster_scores: BTreeMap::from([(primary, 5.0)]),
        weights: continuum_weights(continuum, primary),
        primary_archetype_id: primary,
        secondary_archetype_id: None,
        continuum_score: continuum,
        answered: 1,
        expected: 1,
    }
}

fn meta(id: &str, label: &str, category: &str, scale_max: Option<u32>) -> QuestionMeta {
    QuestionMeta {
        id: id.to_string(),
        dimension_label: label.to_string(),
        category: category.to_string(),
        scale_max,
        prompt: None,
    }
}

/// Two 1–6 questions per dimension (`<id>_1`, `<id>_2`) plus three values
/// questions (`wv_purpose`, `wv_balance`, `wv_profit`).
pub fn question_index() -> QuestionIndex {
    let mut questions: Vec<QuestionMeta> = Dimension::ALL
        .iter()
        .flat_map(|d| {
            [1, 2].map(|n| meta(&format!("{}_{}", d.id(), n), d.label(), "behavior", Some(6)))
        })
        .collect();
    questions.push(meta("wv_purpose", "Werte", "values", Some(6)));
    questions.push(meta("wv_balance", "Werte", "values", Some(6)));
    questions.push(meta("wv_profit", "Werte", "values", Some(6)));
    QuestionIndex::new(questions)
}

/// Answers giving `value` to both questions of every dimension.
pub fn uniform_answers(value: u32) -> Vec<Answer> {
    Dimension::ALL
        .iter()
        .flat_map(|d| [1, 2].map(|n| Answer::new(format!("{}_{}", d.id(), n), json!(value))))
        .collect()
}

pub fn participant(id: &str, name: &str, answers: Vec<Answer>) -> ParticipantInput {
    ParticipantInput {
        profile_id: id.to_string(),
        display_name: name.to_string(),
        answers,
    }
}

pub fn session(participants: Vec<ParticipantInput>) -> SessionInput {
    SessionInput {
        session_id: "s-1".to_string(),
        participants,
        expected_per_dimension: None,
        expected_values_questions: None,
    }
}
