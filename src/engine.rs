//! Report engine.
//!
//! The engine is constructed once with a content pack and a values
//! classifier and holds no state between calls. Every entry point is a pure
//! function of its arguments.

use crate::analysis::aggregator::{aggregate_dimensions, expected_per_dimension};
use crate::analysis::classifier::classify;
use crate::analysis::comparator;
use crate::analysis::coverage::{evaluate_pair, evaluate_single, CoverageAssessment};
use crate::content::ContentPack;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CompareReportJson, CompareResult, Dimension, ProfileResult, QuestionIndex, ReportMode,
    TeamType,
};
use crate::report::assembler::assemble;
use crate::session::{ParticipantInput, SessionInput};
use crate::values::classify::{ArchetypeClassifier, HeuristicClassifier};
use crate::values::scorer::score_values;
use std::collections::BTreeMap;
use tracing::{debug, info};

fn participant_count_violation(session: &SessionInput) -> EngineError {
    EngineError::contract(format!(
        "session {} has {} participants, expected one or two",
        session.session_id,
        session.participants.len()
    ))
}

/// Scoring outcome of a session, without report content.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPreview {
    pub coverage: CoverageAssessment,
    /// Only set for two participants.
    pub summary_type: Option<TeamType>,
}

/// Scoring and report engine.
pub struct ReportEngine {
    content: ContentPack,
    classifier: Box<dyn ArchetypeClassifier>,
}

impl ReportEngine {
    pub fn new(content: ContentPack, classifier: Box<dyn ArchetypeClassifier>) -> Self {
        Self {
            content,
            classifier,
        }
    }

    /// Engine using the heuristic classifier built from the pack's rules.
    pub fn with_content(content: ContentPack) -> Self {
        let classifier = HeuristicClassifier::from_rules(&content.values.classification);
        Self::new(content, Box::new(classifier))
    }

    /// Engine backed by the embedded default content pack.
    pub fn with_default_content() -> EngineResult<Self> {
        Ok(Self::with_content(ContentPack::default_pack()?))
    }

    pub fn content(&self) -> &ContentPack {
        &self.content
    }

    /// Expected question counts: derived from the index, then overridden
    /// by the session where it provides counts.
    pub fn expected_counts(
        &self,
        session: &SessionInput,
        index: &QuestionIndex,
    ) -> BTreeMap<Dimension, usize> {
        let mut expected = expected_per_dimension(index, &self.content.values.category);
        expected.extend(session.expected_overrides());
        expected
    }

    /// Score one participant.
    pub fn build_profile(
        &self,
        participant: &ParticipantInput,
        index: &QuestionIndex,
        expected: &BTreeMap<Dimension, usize>,
    ) -> ProfileResult {
        let category = &self.content.values.category;
        let aggregate = aggregate_dimensions(&participant.answers, index, category, expected);

        let mut dimension_zones = BTreeMap::new();
        let mut archetype_id_per_dimension = BTreeMap::new();
        for dimension in Dimension::ALL {
            let score = aggregate.scores.get(&dimension).copied().flatten();
            let classification = classify(dimension, score, &self.content);
            dimension_zones.insert(dimension, classification.zone);
            archetype_id_per_dimension.insert(dimension, classification.archetype.id);
        }

        let values_profile = score_values(
            &participant.answers,
            index,
            category,
            self.classifier.as_ref(),
        );

        debug!(
            "Profile {}: {} of 6 dimensions scored, values {}",
            participant.profile_id,
            aggregate.scores.values().filter(|s| s.is_some()).count(),
            if values_profile.is_some() { "scored" } else { "missing" }
        );

        ProfileResult {
            profile_id: participant.profile_id.clone(),
            display_name: participant.display_name.clone(),
            dimension_scores: aggregate.scores,
            dimension_zones,
            archetype_id_per_dimension,
            values_score: values_profile.as_ref().map(|v| v.continuum_score),
            values_archetype_id: values_profile.as_ref().map(|v| v.primary_archetype_id),
            values_profile,
            coverage: aggregate.coverage,
        }
    }

    /// Fail when the declared values question count disagrees with the index.
    pub fn check_values_contract(
        &self,
        session: &SessionInput,
        index: &QuestionIndex,
    ) -> EngineResult<()> {
        let Some(expected) = session.expected_values_questions else {
            return Ok(());
        };
        let actual = index.in_category(&self.content.values.category).count();
        if expected != actual {
            return Err(EngineError::contract(format!(
                "session {} expects {} values questions, index holds {}",
                session.session_id, expected, actual
            )));
        }
        Ok(())
    }

    /// Score every participant of a session.
    pub fn profiles(
        &self,
        session: &SessionInput,
        index: &QuestionIndex,
    ) -> EngineResult<Vec<ProfileResult>> {
        if session.participants.is_empty() || session.participants.len() > 2 {
            return Err(participant_count_violation(session));
        }
        self.check_values_contract(session, index)?;

        let expected = self.expected_counts(session, index);
        Ok(session
            .participants
            .iter()
            .map(|p| self.build_profile(p, index, &expected))
            .collect())
    }

    /// Compare two scored profiles.
    pub fn compare(&self, a: &ProfileResult, b: &ProfileResult) -> CompareResult {
        comparator::compare(a, b, &self.content)
    }

    /// Coverage and team type of a session without composing a report.
    pub fn preview(
        &self,
        session: &SessionInput,
        index: &QuestionIndex,
    ) -> EngineResult<SessionPreview> {
        let profiles = self.profiles(session, index)?;
        match profiles.as_slice() {
            [a, b] => Ok(SessionPreview {
                coverage: evaluate_pair(a, b),
                summary_type: Some(self.compare(a, b).summary_type),
            }),
            [a] => Ok(SessionPreview {
                coverage: evaluate_single(a),
                summary_type: None,
            }),
            _ => Err(participant_count_violation(session)),
        }
    }

    /// Produce the report for a session.
    pub fn generate(
        &self,
        session: &SessionInput,
        index: &QuestionIndex,
    ) -> EngineResult<CompareReportJson> {
        let profiles = self.profiles(session, index)?;
        let report = match profiles.as_slice() {
            [a, b] => assemble(&self.content, a, Some(b))?,
            [a] => assemble(&self.content, a, None)?,
            _ => return Err(participant_count_violation(session)),
        };

        info!(
            "Generated {} report for session {} ({}/{} dimensions comparable)",
            match report.mode {
                ReportMode::Compare => "comparison",
                ReportMode::Single => "single-profile",
            },
            session.session_id,
            report.coverage.comparable_dimensions,
            report.coverage.total_dimensions
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Answer, CompareLabel, DiffClass, SectionId, ValuesArchetype,
        ValuesStatus,
    };
    use crate::test_support::{participant, question_index, session, uniform_answers};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn engine() -> ReportEngine {
        ReportEngine::with_default_content().unwrap()
    }

    fn answers_per_dimension(values: [u32; 6]) -> Vec<Answer> {
        Dimension::ALL
            .iter()
            .zip(values)
            .flat_map(|(d, v)| [1, 2].map(|n| Answer::new(format!("{}_{}", d.id(), n), json!(v))))
            .collect()
    }

    #[test]
    fn test_scenario_all_non_numeric_answers() {
        let answers: Vec<Answer> = uniform_answers(1)
            .into_iter()
            .map(|a| Answer::new(a.question_id, json!("keine Angabe")))
            .collect();
        let engine = engine();
        let index = question_index();
        let input = session(vec![participant("p1", "Anna", answers)]);

        let profile = engine.build_profile(
            &input.participants[0],
            &index,
            &engine.expected_counts(&input, &index),
        );
        assert!(profile.dimension_scores.values().all(|s| s.is_none()));
        assert_eq!(profile.coverage.coverage_percent, Some(0.0));
        assert_eq!(profile.coverage.total_expected, 12);
    }

    #[test]
    fn test_build_profile_resolves_zones_and_archetypes() {
        let engine = engine();
        let index = question_index();
        let input = session(vec![participant("p1", "Anna", answers_per_dimension([6, 1, 6, 3, 4, 2]))]);
        let expected = engine.expected_counts(&input, &index);
        let profile = engine.build_profile(&input.participants[0], &index, &expected);

        assert_eq!(profile.score(Dimension::Vision), Some(6.0));
        assert_eq!(profile.score(Dimension::Entscheidung), Some(1.0));
        assert_eq!(
            profile.archetype_id_per_dimension[&Dimension::Vision],
            "vision_high_visionaer"
        );
        assert_eq!(
            profile.archetype_id_per_dimension[&Dimension::Entscheidung],
            "entscheidung_low_analytiker"
        );
        assert_eq!(profile.coverage.coverage_percent, Some(100.0));
        assert!(profile.values_profile.is_none());
        assert_eq!(profile.values_score, None);
    }

    #[test]
    fn test_values_answers_feed_values_profile() {
        let engine = engine();
        let index = question_index();
        let mut answers = uniform_answers(3);
        answers.push(Answer::new("wv_purpose", json!(6)));
        answers.push(Answer::new("wv_profit", json!(2)));
        let input = session(vec![participant("p1", "Anna", answers)]);
        let profile = engine.build_profile(
            &input.participants[0],
            &index,
            &engine.expected_counts(&input, &index),
        );

        assert_eq!(
            profile.values_archetype_id,
            Some(ValuesArchetype::ImpactIdealist)
        );
        assert!(profile.values_score.unwrap() < 3.5);
        // values questions never count towards dimension coverage
        assert_eq!(profile.coverage.total_answered, 12);
    }

    #[test]
    fn test_values_module_waits_for_all_values_answers() {
        let engine = engine();
        let mut answers_a = uniform_answers(3);
        answers_a.push(Answer::new("wv_purpose", json!(6)));
        let mut answers_b = uniform_answers(4);
        for id in ["wv_purpose", "wv_balance", "wv_profit"] {
            answers_b.push(Answer::new(id, json!(5)));
        }
        let input = session(vec![
            participant("p1", "Anna", answers_a),
            participant("p2", "Ben", answers_b),
        ]);

        let report = engine.generate(&input, &question_index()).unwrap();
        assert_eq!(report.values_module.status, ValuesStatus::Pending);
        assert_eq!(report.values_module.tier, None);
        assert!(report.section(SectionId::ValuesAlignment).is_none());
    }

    #[test]
    fn test_session_overrides_expected_counts() {
        let engine = engine();
        let index = question_index();
        let mut input = session(vec![participant("p1", "Anna", uniform_answers(3))]);
        input.expected_per_dimension = Some(BTreeMap::from([("Vision".to_string(), 4)]));

        let expected = engine.expected_counts(&input, &index);
        assert_eq!(expected[&Dimension::Vision], 4);
        assert_eq!(expected[&Dimension::Risiko], 2);
    }

    #[test]
    fn test_scenario_power_duo_end_to_end() {
        let engine = engine();
        let input = session(vec![
            participant("p1", "Anna", answers_per_dimension([1, 1, 1, 1, 1, 1])),
            participant("p2", "Ben", answers_per_dimension([6, 6, 6, 6, 6, 6])),
        ]);
        let report = engine.generate(&input, &question_index()).unwrap();

        assert_eq!(report.mode, ReportMode::Compare);
        assert_eq!(
            report.executive_summary.summary_type,
            Some(TeamType::HighFrictionPowerDuo)
        );
        for item in &report.deep_dive {
            let comparison = item.comparison.as_ref().unwrap();
            assert_eq!(comparison.diff_class, Some(DiffClass::Large));
            assert_eq!(comparison.label, CompareLabel::FokusThema);
        }
        assert_eq!(report.key_insights.len(), 3);
    }

    #[test]
    fn test_scenario_partial_answers_are_insufficient() {
        let engine = engine();
        let partial: Vec<Answer> = answers_per_dimension([3, 3, 3, 3, 3, 3])
            .into_iter()
            .filter(|a| {
                a.question_id.starts_with("vision")
                    || a.question_id.starts_with("entscheidung")
                    || a.question_id.starts_with("risiko")
            })
            .collect();
        let input = session(vec![
            participant("p1", "Anna", partial),
            participant("p2", "Ben", uniform_answers(3)),
        ]);
        let report = engine.generate(&input, &question_index()).unwrap();

        assert!(!report.coverage.is_data_sufficient);
        assert_eq!(report.coverage.comparable_dimensions, 3);
        assert!(report.coverage.note.contains("3/6"));
        assert_eq!(
            report.executive_summary.summary_type,
            Some(TeamType::DatenlageUnvollstaendig)
        );
        assert_eq!(report.coverage.participants[0].coverage_percent, Some(50.0));
    }

    #[test]
    fn test_values_count_mismatch_is_contract_violation() {
        let engine = engine();
        let mut input = session(vec![participant("p1", "Anna", uniform_answers(4))]);
        input.expected_values_questions = Some(5);

        let err = engine.generate(&input, &question_index()).unwrap_err();
        assert!(matches!(err, EngineError::ContractViolation { .. }));

        input.expected_values_questions = Some(3);
        assert!(engine.generate(&input, &question_index()).is_ok());
    }

    #[test]
    fn test_three_participants_are_rejected() {
        let engine = engine();
        let input = session(vec![
            participant("a", "A", Vec::new()),
            participant("b", "B", Vec::new()),
            participant("c", "C", Vec::new()),
        ]);
        assert!(engine.generate(&input, &question_index()).is_err());
    }

    #[test]
    fn test_single_participant_degrades_gracefully() {
        let engine = engine();
        let input = session(vec![participant("p1", "Anna", Vec::new())]);
        let report = engine.generate(&input, &question_index()).unwrap();

        assert_eq!(report.mode, ReportMode::Single);
        assert!(report.key_insights.is_empty());
        assert!(!report.coverage.is_data_sufficient);
        assert!(report.section(SectionId::DataCoverage).is_some());
        assert_eq!(report.values_module.status, ValuesStatus::Pending);
    }

    #[test]
    fn test_preview_matches_report() {
        let engine = engine();
        let index = question_index();
        let input = session(vec![
            participant("p1", "Anna", uniform_answers(2)),
            participant("p2", "Ben", uniform_answers(5)),
        ]);
        let preview = engine.preview(&input, &index).unwrap();
        assert_eq!(preview.coverage.comparable_dimensions, 6);
        assert!(preview.coverage.is_data_sufficient);

        let report = engine.generate(&input, &index).unwrap();
        assert_eq!(preview.summary_type, report.executive_summary.summary_type);
        assert_eq!(preview.summary_type, Some(TeamType::HighFrictionPowerDuo));
    }

    #[test]
    fn test_preview_of_single_participant_has_no_team_type() {
        let engine = engine();
        let input = session(vec![participant("p1", "Anna", uniform_answers(4))]);
        let preview = engine.preview(&input, &question_index()).unwrap();
        assert_eq!(preview.summary_type, None);
        assert_eq!(preview.coverage.comparable_dimensions, 6);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let engine = engine();
        let mut answers_a = answers_per_dimension([2, 5, 3, 6, 1, 4]);
        answers_a.push(Answer::new("wv_purpose", json!(5)));
        answers_a.push(Answer::new("wv_balance", json!(4)));
        answers_a.push(Answer::new("wv_profit", json!(2)));
        let mut answers_b = answers_per_dimension([4, 4, 6, 2, 3, 4]);
        answers_b.push(Answer::new("wv_purpose", json!(3)));
        answers_b.push(Answer::new("wv_balance", json!(3)));
        answers_b.push(Answer::new("wv_profit", json!(6)));
        let input = session(vec![
            participant("p1", "Anna", answers_a),
            participant("p2", "Ben", answers_b),
        ]);
        let index = question_index();

        let first = engine.generate(&input, &index).unwrap();
        let second = ReportEngine::with_default_content()
            .unwrap()
            .generate(&input, &index)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string_pretty(&first).unwrap(),
            serde_json::to_string_pretty(&second).unwrap()
        );
        assert_eq!(first.values_module.status, ValuesStatus::Evaluated);
    }
}
