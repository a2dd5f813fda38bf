//! Content pack handling.
//!
//! Every piece of static copy the engine emits (dimension texts, archetype
//! records, values playbooks, narrative blocks) lives in a content pack that
//! is injected into the engine. The German default pack is embedded at
//! compile time; alternate packs are loaded from TOML files.
//!
//! Unknown dimension or archetype ids in a pack are skipped with a warning,
//! and missing entries fall back to neutral copy. Only a pack that cannot be
//! parsed at all is rejected.

use crate::error::{EngineError, EngineResult};
use crate::models::{fold_text, ArchetypeRecord, Dimension, ValuesArchetype, Zone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

const DEFAULT_PACK: &str = include_str!("default.toml");

/// Zone thresholds of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    /// Scores at or below this are `low`.
    #[serde(default = "default_low_max")]
    pub low_max: f64,
    /// Scores at or above this are `high`.
    #[serde(default = "default_high_min")]
    pub high_min: f64,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            low_max: default_low_max(),
            high_min: default_high_min(),
        }
    }
}

fn default_low_max() -> f64 {
    2.5
}

fn default_high_min() -> f64 {
    4.5
}

/// Delta class boundaries of one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffThresholds {
    /// Deltas below this are `SMALL`.
    #[serde(default = "default_medium_from")]
    pub medium_from: f64,
    /// Deltas above this are `LARGE`.
    #[serde(default = "default_large_above")]
    pub large_above: f64,
}

impl Default for DiffThresholds {
    fn default() -> Self {
        Self {
            medium_from: default_medium_from(),
            large_above: default_large_above(),
        }
    }
}

fn default_medium_from() -> f64 {
    1.0
}

fn default_large_above() -> f64 {
    2.0
}

/// Reflection questions per delta class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionQuestions {
    pub small: String,
    pub medium: String,
    pub large: String,
    /// Used when one of the two scores is missing.
    pub incomplete: String,
    /// Used in single-profile reports.
    pub single: String,
}

/// Archetype records per zone. Missing zones fall back to a neutral record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneArchetypes {
    #[serde(default)]
    pub low: Option<ArchetypeRecord>,
    #[serde(default)]
    pub mid: Option<ArchetypeRecord>,
    #[serde(default)]
    pub high: Option<ArchetypeRecord>,
}

/// Dimension-specific dossier copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionNarrative {
    pub aligned: String,
    pub complementary: String,
    pub divergent: String,
    pub incomplete: String,
    /// Who carries the dimension; `{leader}` and `{other}` are filled in.
    pub lead_hint: String,
    /// Practical agreement for this dimension.
    pub agreement: String,
}

/// All copy for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionContent {
    pub title: String,
    pub daily_pressure: String,
    #[serde(default)]
    pub thresholds: ZoneThresholds,
    #[serde(default)]
    pub diff_thresholds: DiffThresholds,
    pub reflection: ReflectionQuestions,
    #[serde(default)]
    pub archetypes: ZoneArchetypes,
    pub narrative: DimensionNarrative,
}

impl DimensionContent {
    /// Neutral copy for a dimension the pack does not describe.
    pub fn neutral(dimension: Dimension) -> Self {
        let question = format!(
            "Was bedeutet {} konkret für eure Zusammenarbeit?",
            dimension.label()
        );
        Self {
            title: dimension.label().to_string(),
            daily_pressure: String::new(),
            thresholds: ZoneThresholds::default(),
            diff_thresholds: DiffThresholds::default(),
            reflection: ReflectionQuestions {
                small: question.clone(),
                medium: question.clone(),
                large: question.clone(),
                incomplete: question.clone(),
                single: question,
            },
            archetypes: ZoneArchetypes::default(),
            narrative: DimensionNarrative {
                aligned: String::new(),
                complementary: String::new(),
                divergent: String::new(),
                incomplete: String::new(),
                lead_hint: String::new(),
                agreement: String::new(),
            },
        }
    }

    /// Archetype for a zone, or a neutral record when the pack has none.
    pub fn archetype(&self, dimension: Dimension, zone: Zone) -> ArchetypeRecord {
        let record = match zone {
            Zone::Low => self.archetypes.low.as_ref(),
            Zone::Mid => self.archetypes.mid.as_ref(),
            Zone::High => self.archetypes.high.as_ref(),
        };
        match record {
            Some(record) => record.clone(),
            None => {
                warn!(
                    "No archetype for {} / {} in content pack, using neutral record",
                    dimension, zone
                );
                ArchetypeRecord::neutral(dimension, zone)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamTypeCopy {
    pub headline: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamTypeContent {
    pub harmonische: TeamTypeCopy,
    pub balancierte: TeamTypeCopy,
    pub high_friction: TeamTypeCopy,
    pub unvollstaendig: TeamTypeCopy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesArchetypeCopy {
    pub name: String,
    pub tagline: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawPattern {
    pattern: String,
    archetypes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawClassification {
    #[serde(default)]
    explicit: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    patterns: Vec<RawPattern>,
    #[serde(default)]
    keywords: BTreeMap<String, Vec<String>>,
}

/// Resolved question → archetype mapping rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationRules {
    /// Question id → archetypes.
    pub explicit: BTreeMap<String, Vec<ValuesArchetype>>,
    /// Question-id regex → archetypes, tried in order.
    pub patterns: Vec<(String, Vec<ValuesArchetype>)>,
    /// Folded keywords per archetype.
    pub keywords: BTreeMap<ValuesArchetype, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawFocusTemplate {
    id: String,
    title: String,
    weights: BTreeMap<String, f64>,
    shared_text: String,
    gap_text: String,
}

/// A values focus template with its archetype weight vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusTemplate {
    pub id: String,
    pub title: String,
    pub weights: BTreeMap<ValuesArchetype, f64>,
    pub shared_text: String,
    pub gap_text: String,
}

impl FocusTemplate {
    pub fn weight(&self, archetype: ValuesArchetype) -> f64 {
        self.weights.get(&archetype).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCopy {
    pub symbiose: String,
    pub schnittmenge: String,
    pub spannungsfeld: String,
    /// Values module not yet evaluable.
    pub pending: String,
    /// Single-profile report with a complete values profile.
    pub self_only: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawValuesContent {
    #[serde(default = "default_values_category")]
    category: String,
    #[serde(default)]
    archetypes: BTreeMap<String, ValuesArchetypeCopy>,
    #[serde(default)]
    classification: RawClassification,
    #[serde(default)]
    focus_templates: Vec<RawFocusTemplate>,
    tiers: TierCopy,
}

fn default_values_category() -> String {
    "values".to_string()
}

/// Resolved values copy and rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesContent {
    /// Question category routed to the values pipeline.
    pub category: String,
    pub archetypes: BTreeMap<ValuesArchetype, ValuesArchetypeCopy>,
    pub classification: ClassificationRules,
    pub focus_templates: Vec<FocusTemplate>,
    pub tiers: TierCopy,
}

impl ValuesContent {
    pub fn archetype_name(&self, archetype: ValuesArchetype) -> String {
        self.archetypes
            .get(&archetype)
            .map(|copy| copy.name.clone())
            .unwrap_or_else(|| archetype.id().to_string())
    }
}

/// Copy keyed by the delta class of a driving dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCopy {
    pub aligned: String,
    pub complementary: String,
    pub divergent: String,
    pub incomplete: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageCopy {
    /// Must produce the literal ratio, e.g. `{comparable}/{total} Dimensionen belastbar`.
    pub ratio: String,
    pub sufficient: String,
    pub insufficient: String,
    pub suppressed: String,
    pub participant: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTitles {
    pub intro: String,
    pub executive_summary: String,
    pub collaboration_overview: String,
    pub data_coverage: String,
    pub decision_architecture: String,
    pub risk_contract: String,
    pub dimension_dossiers: String,
    pub critical_tensions: String,
    pub values_alignment: String,
    pub conversation_guide: String,
    pub plan: String,
    pub closing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCopy {
    pub day_30: Vec<String>,
    pub day_60: Vec<String>,
    pub day_90: Vec<String>,
    /// Added to day 30 for every focus dimension; `{title}` is filled in.
    pub focus_item: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightCopy {
    pub aligned: String,
    pub complementary: String,
    pub divergent: String,
    pub single_low: String,
    pub single_mid: String,
    pub single_high: String,
}

/// Narrative blocks outside the per-dimension copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeContent {
    pub report_title: String,
    pub subtitle_compare: String,
    pub subtitle_single: String,
    pub intro_compare: Vec<String>,
    pub intro_single: Vec<String>,
    pub sections: SectionTitles,
    pub overview_counts: String,
    pub overview_single: String,
    pub coverage: CoverageCopy,
    pub decision_architecture: ClassCopy,
    pub risk_contract: ClassCopy,
    pub tensions_intro: String,
    pub no_tensions: String,
    pub tension_item: String,
    pub insights: InsightCopy,
    pub guide_intro: String,
    pub plan: PlanCopy,
    pub closing_compare: Vec<String>,
    pub closing_single: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawDimension {
    id: String,
    #[serde(flatten)]
    content: DimensionContent,
}

#[derive(Debug, Clone, Deserialize)]
struct RawContentPack {
    version: String,
    #[serde(default = "default_locale")]
    locale: String,
    #[serde(default)]
    dimensions: Vec<RawDimension>,
    team_types: TeamTypeContent,
    values: RawValuesContent,
    narrative: NarrativeContent,
}

fn default_locale() -> String {
    "de".to_string()
}

/// Immutable content injected into the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPack {
    pub version: String,
    pub locale: String,
    /// Always holds all six dimensions.
    pub dimensions: BTreeMap<Dimension, DimensionContent>,
    pub team_types: TeamTypeContent,
    pub values: ValuesContent,
    pub narrative: NarrativeContent,
}

impl ContentPack {
    /// The embedded German default pack.
    pub fn default_pack() -> EngineResult<Self> {
        Self::from_toml_str(DEFAULT_PACK)
    }

    /// Load a pack from a TOML file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidContent(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and resolve a pack from TOML text.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let raw: RawContentPack =
            toml::from_str(content).map_err(|e| EngineError::InvalidContent(e.to_string()))?;
        Ok(Self::resolve(raw))
    }

    fn resolve(raw: RawContentPack) -> Self {
        let mut dimensions = BTreeMap::new();
        for entry in raw.dimensions {
            match Dimension::from_label(&entry.id) {
                Some(dimension) => {
                    if dimensions.insert(dimension, entry.content).is_some() {
                        warn!("Duplicate content for dimension {}, keeping the last", dimension);
                    }
                }
                None => warn!("Ignoring content for unknown dimension id '{}'", entry.id),
            }
        }
        for dimension in Dimension::ALL {
            dimensions.entry(dimension).or_insert_with(|| {
                warn!("Content pack has no copy for {}, using neutral copy", dimension);
                DimensionContent::neutral(dimension)
            });
        }

        let values = resolve_values(raw.values);
        debug!(
            "Content pack {} resolved ({} focus templates)",
            raw.version,
            values.focus_templates.len()
        );

        Self {
            version: raw.version,
            locale: raw.locale,
            dimensions,
            team_types: raw.team_types,
            values,
            narrative: raw.narrative,
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> &DimensionContent {
        // resolve() fills every dimension
        &self.dimensions[&dimension]
    }

    pub fn team_type(&self, team_type: crate::models::TeamType) -> &TeamTypeCopy {
        use crate::models::TeamType;
        match team_type {
            TeamType::HarmonischeStabilisatoren => &self.team_types.harmonische,
            TeamType::BalancierteStrategen => &self.team_types.balancierte,
            TeamType::HighFrictionPowerDuo => &self.team_types.high_friction,
            TeamType::DatenlageUnvollstaendig => &self.team_types.unvollstaendig,
        }
    }
}

fn resolve_archetype_ids(ids: &[String], context: &str) -> Vec<ValuesArchetype> {
    let mut resolved = Vec::new();
    for id in ids {
        match ValuesArchetype::from_id(id) {
            Some(archetype) if !resolved.contains(&archetype) => resolved.push(archetype),
            Some(_) => {}
            None => warn!("Unknown values archetype '{}' in {}", id, context),
        }
    }
    resolved.sort();
    resolved
}

fn resolve_values(raw: RawValuesContent) -> ValuesContent {
    let mut archetypes = BTreeMap::new();
    for (id, copy) in raw.archetypes {
        match ValuesArchetype::from_id(&id) {
            Some(archetype) => {
                archetypes.insert(archetype, copy);
            }
            None => warn!("Ignoring copy for unknown values archetype '{}'", id),
        }
    }

    let mut classification = ClassificationRules::default();
    for (question_id, ids) in &raw.classification.explicit {
        let resolved = resolve_archetype_ids(ids, &format!("explicit mapping of {}", question_id));
        if !resolved.is_empty() {
            classification
                .explicit
                .insert(question_id.clone(), resolved);
        }
    }
    for pattern in &raw.classification.patterns {
        let resolved =
            resolve_archetype_ids(&pattern.archetypes, &format!("pattern {}", pattern.pattern));
        if !resolved.is_empty() {
            classification
                .patterns
                .push((pattern.pattern.clone(), resolved));
        }
    }
    for (id, words) in &raw.classification.keywords {
        match ValuesArchetype::from_id(id) {
            Some(archetype) => {
                let folded: Vec<String> = words
                    .iter()
                    .map(|w| fold_text(w))
                    .filter(|w| !w.is_empty())
                    .collect();
                classification.keywords.insert(archetype, folded);
            }
            None => warn!("Ignoring keywords for unknown values archetype '{}'", id),
        }
    }

    let focus_templates = raw
        .focus_templates
        .into_iter()
        .map(|template| {
            let mut weights = BTreeMap::new();
            for (id, weight) in template.weights {
                match ValuesArchetype::from_id(&id) {
                    Some(archetype) => {
                        weights.insert(archetype, weight);
                    }
                    None => warn!(
                        "Ignoring weight for unknown archetype '{}' in focus template {}",
                        id, template.id
                    ),
                }
            }
            FocusTemplate {
                id: template.id,
                title: template.title,
                weights,
                shared_text: template.shared_text,
                gap_text: template.gap_text,
            }
        })
        .collect();

    ValuesContent {
        category: raw.category,
        archetypes,
        classification,
        focus_templates,
        tiers: raw.tiers,
    }
}

/// Replace `{key}` placeholders in a template.
///
/// The template is scanned once, so values are never expanded again.
/// Unknown placeholders stay as written.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rest = &rest[open..];
            break;
        };
        let key = &after[..close];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}
