//! Data models for the alignment engine.
//!
//! This module contains the core data structures shared by the scoring
//! pipeline, the values sub-scorer and the report assembler.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Neutral midpoint of the canonical 1–6 scale.
pub const NEUTRAL_SCORE: f64 = 3.5;

/// Lower bound of the canonical scale.
pub const SCALE_MIN: f64 = 1.0;

/// Upper bound of the canonical scale.
pub const SCALE_MAX: f64 = 6.0;

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// One of the six behavioral axes.
///
/// The declaration order is the fixed tie-break order used everywhere
/// output ordering could otherwise depend on iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Vision,
    Entscheidung,
    Risiko,
    Autonomie,
    Verbindlichkeit,
    Konflikt,
}

impl Dimension {
    /// All dimensions in declaration order.
    pub const ALL: [Dimension; 6] = [
        Dimension::Vision,
        Dimension::Entscheidung,
        Dimension::Risiko,
        Dimension::Autonomie,
        Dimension::Verbindlichkeit,
        Dimension::Konflikt,
    ];

    /// Canonical label as used in question metadata.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Vision => "Vision",
            Dimension::Entscheidung => "Entscheidung",
            Dimension::Risiko => "Risiko",
            Dimension::Autonomie => "Autonomie",
            Dimension::Verbindlichkeit => "Verbindlichkeit",
            Dimension::Konflikt => "Konflikt",
        }
    }

    /// Stable identifier used in content packs.
    pub fn id(&self) -> &'static str {
        match self {
            Dimension::Vision => "vision",
            Dimension::Entscheidung => "entscheidung",
            Dimension::Risiko => "risiko",
            Dimension::Autonomie => "autonomie",
            Dimension::Verbindlichkeit => "verbindlichkeit",
            Dimension::Konflikt => "konflikt",
        }
    }

    /// Resolve a free-text dimension label.
    ///
    /// Matching is case-insensitive, folds umlauts and accepts the long
    /// forms used by older question sources. Returns `None` for labels
    /// that belong to no dimension.
    pub fn from_label(label: &str) -> Option<Self> {
        match fold_text(label).as_str() {
            "vision" | "zukunftsbild" | "vision & ausrichtung" => Some(Dimension::Vision),
            "entscheidung" | "entscheidungen" | "entscheidungsfindung" | "entscheidungsstil" => {
                Some(Dimension::Entscheidung)
            }
            "risiko" | "risikobereitschaft" | "risikoappetit" => Some(Dimension::Risiko),
            "autonomie" | "selbststaendigkeit" | "freiraum" => Some(Dimension::Autonomie),
            "verbindlichkeit" | "commitment" | "zuverlaessigkeit" => {
                Some(Dimension::Verbindlichkeit)
            }
            "konflikt" | "konflikte" | "konfliktverhalten" | "konfliktstil" => {
                Some(Dimension::Konflikt)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lowercase, trim and fold German umlauts into their ASCII spellings.
pub fn fold_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.trim().chars().flat_map(char::to_lowercase) {
        match ch {
            'ä' => folded.push_str("ae"),
            'ö' => folded.push_str("oe"),
            'ü' => folded.push_str("ue"),
            'ß' => folded.push_str("ss"),
            _ => folded.push(ch),
        }
    }
    folded
}

/// A single raw answer as delivered by the answer store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    /// Arbitrary JSON value; only numbers and numeric strings count.
    #[serde(default)]
    pub raw_choice_value: serde_json::Value,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, raw_choice_value: serde_json::Value) -> Self {
        Self {
            question_id: question_id.into(),
            raw_choice_value,
        }
    }
}

/// Read-only question reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionMeta {
    pub id: String,
    pub dimension_label: String,
    pub category: String,
    /// Declared scale maximum. `None` marks the legacy fixed 1–4 source.
    #[serde(default)]
    pub scale_max: Option<u32>,
    /// Question text, used for values keyword classification.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Question metadata indexed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionIndex {
    questions: BTreeMap<String, QuestionMeta>,
}

impl QuestionIndex {
    pub fn new(questions: impl IntoIterator<Item = QuestionMeta>) -> Self {
        Self {
            questions: questions.into_iter().map(|q| (q.id.clone(), q)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&QuestionMeta> {
        self.questions.get(id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &QuestionMeta> {
        self.questions.values()
    }

    /// Questions belonging to a category, compared case-insensitively.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a QuestionMeta> {
        self.questions
            .values()
            .filter(move |q| q.category.trim().eq_ignore_ascii_case(category))
    }
}

/// Low/mid/high banding of a dimension score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Low,
    Mid,
    High,
}

impl Zone {
    /// Low and high observations outrank mid ones.
    pub fn is_edge(&self) -> bool {
        !matches!(self, Zone::Mid)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Low => write!(f, "low"),
            Zone::Mid => write!(f, "mid"),
            Zone::High => write!(f, "high"),
        }
    }
}

/// Categorization of the absolute delta between two participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffClass {
    Small,
    Medium,
    Large,
}

impl DiffClass {
    /// The pairwise label a delta class maps to.
    pub fn label(&self) -> CompareLabel {
        match self {
            DiffClass::Small => CompareLabel::Match,
            DiffClass::Medium => CompareLabel::Komplementaer,
            DiffClass::Large => CompareLabel::FokusThema,
        }
    }
}

impl fmt::Display for DiffClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffClass::Small => write!(f, "SMALL"),
            DiffClass::Medium => write!(f, "MEDIUM"),
            DiffClass::Large => write!(f, "LARGE"),
        }
    }
}

/// Pairwise label of a dimension block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareLabel {
    Match,
    Komplementaer,
    FokusThema,
    DatenUnvollstaendig,
}

impl fmt::Display for CompareLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareLabel::Match => write!(f, "MATCH"),
            CompareLabel::Komplementaer => write!(f, "KOMPLEMENTAER"),
            CompareLabel::FokusThema => write!(f, "FOKUS_THEMA"),
            CompareLabel::DatenUnvollstaendig => write!(f, "DATEN_UNVOLLSTAENDIG"),
        }
    }
}

/// Aggregate team type derived from the summed deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamType {
    #[serde(rename = "Die Harmonischen Stabilisatoren")]
    HarmonischeStabilisatoren,
    #[serde(rename = "Die balancierten Strategen")]
    BalancierteStrategen,
    #[serde(rename = "Das High-Friction Power-Duo")]
    HighFrictionPowerDuo,
    #[serde(rename = "Datenlage unvollständig")]
    DatenlageUnvollstaendig,
}

impl TeamType {
    pub fn label(&self) -> &'static str {
        match self {
            TeamType::HarmonischeStabilisatoren => "Die Harmonischen Stabilisatoren",
            TeamType::BalancierteStrategen => "Die balancierten Strategen",
            TeamType::HighFrictionPowerDuo => "Das High-Friction Power-Duo",
            TeamType::DatenlageUnvollstaendig => "Datenlage unvollständig",
        }
    }
}

impl fmt::Display for TeamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Static archetype copy attached to a `(dimension, zone)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeRecord {
    pub id: String,
    pub name: String,
    pub superpower: String,
    pub caution: String,
    #[serde(alias = "description_short")]
    pub description_short: String,
}

impl ArchetypeRecord {
    /// Neutral record used when the content pack has no entry.
    pub fn neutral(dimension: Dimension, zone: Zone) -> Self {
        Self {
            id: format!("{}_{}_neutral", dimension.id(), zone),
            name: "Profil in Arbeit".to_string(),
            superpower: String::new(),
            caution: String::new(),
            description_short: "Für diese Ausprägung liegt noch keine Beschreibung vor."
                .to_string(),
        }
    }
}

/// Answer counts for one dimension of one participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionStats {
    pub answered_numeric: usize,
    pub expected: usize,
}

/// Per-participant answer coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantCoverage {
    pub per_dimension: BTreeMap<Dimension, DimensionStats>,
    pub total_answered: usize,
    pub total_expected: usize,
    /// `None` when nothing was expected.
    pub coverage_percent: Option<f64>,
}

/// One of the three fixed values archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuesArchetype {
    ImpactIdealist,
    VerantwortungsStratege,
    BusinessPragmatiker,
}

impl ValuesArchetype {
    /// Fixed declaration order, also the tie-break order.
    pub const ALL: [ValuesArchetype; 3] = [
        ValuesArchetype::ImpactIdealist,
        ValuesArchetype::VerantwortungsStratege,
        ValuesArchetype::BusinessPragmatiker,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ValuesArchetype::ImpactIdealist => "impact_idealist",
            ValuesArchetype::VerantwortungsStratege => "verantwortungs_stratege",
            ValuesArchetype::BusinessPragmatiker => "business_pragmatiker",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id.trim())
    }

    /// Fixed position on the 1–6 values continuum.
    pub fn anchor(&self) -> f64 {
        match self {
            ValuesArchetype::ImpactIdealist => 1.0,
            ValuesArchetype::VerantwortungsStratege => 3.5,
            ValuesArchetype::BusinessPragmatiker => 6.0,
        }
    }
}

impl fmt::Display for ValuesArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Values sub-profile of one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesProfile {
    /// Weighted answer average per archetype that received any weight.
    pub cluster_scores: BTreeMap<ValuesArchetype, f64>,
    /// Renormalized continuum weights, summing to 1.
    pub weights: BTreeMap<ValuesArchetype, f64>,
    pub primary_archetype_id: ValuesArchetype,
    pub secondary_archetype_id: Option<ValuesArchetype>,
    pub continuum_score: f64,
    pub answered: usize,
    /// Values questions declared in the question index.
    pub expected: usize,
}

impl ValuesProfile {
    /// Every declared values question has a usable answer.
    pub fn is_complete(&self) -> bool {
        self.answered >= self.expected
    }
}

/// Cross-participant values alignment tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuesTier {
    Symbiose,
    Schnittmenge,
    Spannungsfeld,
}

impl ValuesTier {
    pub fn from_alignment(percent: u8) -> Self {
        if percent >= 85 {
            ValuesTier::Symbiose
        } else if percent >= 65 {
            ValuesTier::Schnittmenge
        } else {
            ValuesTier::Spannungsfeld
        }
    }
}

/// Scored profile of one participant. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResult {
    pub profile_id: String,
    pub display_name: String,
    pub dimension_scores: BTreeMap<Dimension, Option<f64>>,
    /// Zones for display; a missing score is banded as the neutral midpoint.
    pub dimension_zones: BTreeMap<Dimension, Zone>,
    pub archetype_id_per_dimension: BTreeMap<Dimension, String>,
    pub values_score: Option<f64>,
    pub values_archetype_id: Option<ValuesArchetype>,
    pub values_profile: Option<ValuesProfile>,
    pub coverage: ParticipantCoverage,
}

impl ProfileResult {
    pub fn score(&self, dimension: Dimension) -> Option<f64> {
        self.dimension_scores.get(&dimension).copied().flatten()
    }

    pub fn zone(&self, dimension: Dimension) -> Zone {
        self.dimension_zones
            .get(&dimension)
            .copied()
            .unwrap_or(Zone::Mid)
    }

    /// Number of dimensions carrying a real score.
    pub fn scored_dimensions(&self) -> usize {
        Dimension::ALL
            .iter()
            .filter(|d| self.score(**d).is_some())
            .count()
    }
}

/// Pairwise comparison of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareDimensionBlock {
    pub dimension: Dimension,
    pub title: String,
    pub score_a: Option<f64>,
    pub score_b: Option<f64>,
    pub zone_a: Zone,
    pub zone_b: Zone,
    pub archetype_a: ArchetypeRecord,
    pub archetype_b: ArchetypeRecord,
    /// Present iff both scores are present.
    pub diff: Option<f64>,
    pub diff_class: Option<DiffClass>,
    pub label: CompareLabel,
    pub daily_pressure: String,
    pub reflection_question: String,
}

impl CompareDimensionBlock {
    pub fn is_comparable(&self) -> bool {
        self.diff.is_some()
    }
}

/// Aggregate of all dimension blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResult {
    /// One block per dimension, in declaration order.
    pub blocks: Vec<CompareDimensionBlock>,
    pub top_matches: Vec<Dimension>,
    pub top_tensions: Vec<Dimension>,
    pub comparable_dimension_count: usize,
    pub is_data_sufficient: bool,
    pub diff_sum: f64,
    pub summary_type: TeamType,
}

impl CompareResult {
    pub fn block(&self, dimension: Dimension) -> Option<&CompareDimensionBlock> {
        self.blocks.iter().find(|b| b.dimension == dimension)
    }
}

/// Whether a report compares two participants or describes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    Compare,
    Single,
}

/// Section identifiers in their fixed rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Intro,
    ExecutiveSummary,
    CollaborationOverview,
    DataCoverage,
    DecisionArchitecture,
    RiskContract,
    DimensionDossiers,
    CriticalTensions,
    ValuesAlignment,
    ConversationGuide,
    #[serde(rename = "plan_30_60_90")]
    Plan306090,
    Closing,
}

/// A rendered narrative section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    pub id: SectionId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paragraphs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    pub title: String,
    pub subtitle: String,
    pub participants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<TeamType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub headline: String,
    pub paragraphs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<TeamType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_matches: Vec<Dimension>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_tensions: Vec<Dimension>,
}

/// One of at most three ranked observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInsight {
    pub dimension: Dimension,
    /// Delta with a partner, otherwise distance from the neutral midpoint.
    pub rank_score: f64,
    pub zone: Zone,
    pub headline: String,
    pub text: String,
}

/// One participant's side of a dimension dossier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub display_name: String,
    pub score: Option<f64>,
    pub zone: Zone,
    pub archetype: ArchetypeRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionComparison {
    pub diff: Option<f64>,
    pub diff_class: Option<DiffClass>,
    pub label: CompareLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveItem {
    pub dimension: Dimension,
    pub title: String,
    pub daily_pressure: String,
    pub primary: ParticipantView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<ParticipantView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<DimensionComparison>,
    pub narrative: Vec<String>,
    pub reflection_question: String,
}

/// Evaluation state of the values module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuesStatus {
    /// Both profiles complete, alignment and tier computed.
    Evaluated,
    /// Single-profile report with a complete profile.
    SelfOnly,
    /// Not yet evaluable; no tier is ever guessed.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesParticipantSummary {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_archetype_id: Option<ValuesArchetype>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_archetype_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_archetype_id: Option<ValuesArchetype>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuum_score: Option<f64>,
}

/// A focus template selected for the values narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusPick {
    pub template_id: String,
    pub title: String,
    pub distance: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesModule {
    pub status: ValuesStatus,
    pub participants: Vec<ValuesParticipantSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<ValuesTier>,
    pub note: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_focus: Vec<FocusPick>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gap_focus: Vec<FocusPick>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantCoverageSummary {
    pub display_name: String,
    pub answered: usize,
    pub expected: usize,
    pub coverage_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub comparable_dimensions: usize,
    pub total_dimensions: usize,
    pub min_comparable_dimensions: usize,
    pub is_data_sufficient: bool,
    pub note: String,
    pub participants: Vec<ParticipantCoverageSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPrompt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    pub question: String,
    pub context: String,
}

/// The final report document. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareReportJson {
    pub report_version: String,
    pub content_version: String,
    pub mode: ReportMode,
    pub sections: Vec<ReportSection>,
    pub cover: Cover,
    pub executive_summary: ExecutiveSummary,
    pub key_insights: Vec<KeyInsight>,
    pub deep_dive: Vec<DeepDiveItem>,
    pub values_module: ValuesModule,
    pub coverage: CoverageReport,
    pub conversation_guide: Vec<ConversationPrompt>,
}

impl CompareReportJson {
    pub fn section(&self, id: SectionId) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.id == id)
    }
}
