//! Mapping of values questions to archetypes.
//!
//! The mapping sits behind [`ArchetypeClassifier`] so an explicit
//! per-question tagging scheme can replace the heuristic without touching
//! the scoring math.

use crate::content::ClassificationRules;
use crate::models::{fold_text, QuestionMeta, ValuesArchetype};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Resolve a values question to the archetypes it speaks to.
pub trait ArchetypeClassifier: Send + Sync {
    /// Archetypes the question contributes to, in declaration order.
    /// An empty result is treated as "all three".
    fn classify(&self, question: &QuestionMeta) -> Vec<ValuesArchetype>;
}

/// Which strategy step produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Explicit,
    Pattern,
    Keyword,
    Fallback,
}

/// Ordered strategy: explicit id table, id regex, keywords, fallback.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    explicit: BTreeMap<String, Vec<ValuesArchetype>>,
    patterns: Vec<(Regex, Vec<ValuesArchetype>)>,
    keywords: BTreeMap<ValuesArchetype, Vec<String>>,
}

impl HeuristicClassifier {
    /// Build from content-pack rules. Invalid patterns are skipped.
    pub fn from_rules(rules: &ClassificationRules) -> Self {
        let patterns = rules
            .patterns
            .iter()
            .filter_map(|(pattern, archetypes)| match Regex::new(pattern) {
                Ok(regex) => Some((regex, archetypes.clone())),
                Err(e) => {
                    warn!("Skipping invalid question-id pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect();

        Self {
            explicit: rules.explicit.clone(),
            patterns,
            keywords: rules.keywords.clone(),
        }
    }

    /// Classify and report which step matched.
    pub fn classify_with_source(
        &self,
        question: &QuestionMeta,
    ) -> (Vec<ValuesArchetype>, MatchSource) {
        if let Some(archetypes) = self.explicit.get(&question.id) {
            return (archetypes.clone(), MatchSource::Explicit);
        }

        if let Some((_, archetypes)) = self
            .patterns
            .iter()
            .find(|(regex, _)| regex.is_match(&question.id))
        {
            return (archetypes.clone(), MatchSource::Pattern);
        }

        let text = fold_text(&format!(
            "{} {}",
            question.dimension_label,
            question.prompt.as_deref().unwrap_or("")
        ));
        let matched: Vec<ValuesArchetype> = ValuesArchetype::ALL
            .into_iter()
            .filter(|archetype| {
                self.keywords
                    .get(archetype)
                    .is_some_and(|words| words.iter().any(|w| text.contains(w.as_str())))
            })
            .collect();
        if !matched.is_empty() {
            return (matched, MatchSource::Keyword);
        }

        debug!(
            "Values question {} matched no rule, spreading over all archetypes",
            question.id
        );
        (ValuesArchetype::ALL.to_vec(), MatchSource::Fallback)
    }
}

impl ArchetypeClassifier for HeuristicClassifier {
    fn classify(&self, question: &QuestionMeta) -> Vec<ValuesArchetype> {
        self.classify_with_source(question).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentPack;

    fn values_question(id: &str, label: &str, prompt: Option<&str>) -> QuestionMeta {
        QuestionMeta {
            id: id.to_string(),
            dimension_label: label.to_string(),
            category: "values".to_string(),
            scale_max: Some(5),
            prompt: prompt.map(String::from),
        }
    }

    fn classifier() -> HeuristicClassifier {
        let pack = ContentPack::default_pack().unwrap();
        HeuristicClassifier::from_rules(&pack.values.classification)
    }

    #[test]
    fn test_explicit_table_wins() {
        // id would also match the impact pattern and the growth keyword
        let mut rules = ClassificationRules::default();
        rules
            .explicit
            .insert("wv_impact_1".to_string(), vec![ValuesArchetype::BusinessPragmatiker]);
        rules.patterns.push((
            "^wv_impact_".to_string(),
            vec![ValuesArchetype::ImpactIdealist],
        ));
        let classifier = HeuristicClassifier::from_rules(&rules);

        let (archetypes, source) =
            classifier.classify_with_source(&values_question("wv_impact_1", "Werte", None));
        assert_eq!(archetypes, vec![ValuesArchetype::BusinessPragmatiker]);
        assert_eq!(source, MatchSource::Explicit);
    }

    #[test]
    fn test_id_pattern_before_keywords() {
        let (archetypes, source) = classifier().classify_with_source(&values_question(
            "wv_growth_02",
            "Werte",
            Some("Gesellschaftliche Wirkung ist mir wichtiger als alles andere."),
        ));
        assert_eq!(archetypes, vec![ValuesArchetype::BusinessPragmatiker]);
        assert_eq!(source, MatchSource::Pattern);
    }

    #[test]
    fn test_keywords_match_folded_text() {
        let (archetypes, source) = classifier().classify_with_source(&values_question(
            "q17",
            "Werte",
            Some("Wir übernehmen VERANTWORTUNG und wollen Umsatz steigern."),
        ));
        assert_eq!(
            archetypes,
            vec![
                ValuesArchetype::VerantwortungsStratege,
                ValuesArchetype::BusinessPragmatiker
            ]
        );
        assert_eq!(source, MatchSource::Keyword);
    }

    #[test]
    fn test_fallback_spreads_over_all() {
        let (archetypes, source) = classifier().classify_with_source(&values_question(
            "q99",
            "Werte",
            Some("Ich trinke gern Kaffee."),
        ));
        assert_eq!(archetypes, ValuesArchetype::ALL.to_vec());
        assert_eq!(source, MatchSource::Fallback);
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let mut rules = ClassificationRules::default();
        rules
            .patterns
            .push(("^wv_(".to_string(), vec![ValuesArchetype::ImpactIdealist]));
        let classifier = HeuristicClassifier::from_rules(&rules);
        assert_eq!(
            classifier.classify(&values_question("wv_x", "Werte", None)),
            ValuesArchetype::ALL.to_vec()
        );
    }
}
