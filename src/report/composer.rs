//! Narrative composition.
//!
//! Selects and fills static copy from the content pack based on the
//! classifier and comparator output. Every choice here is a pure function
//! of its inputs; ties are broken by dimension order or template id.

use crate::analysis::comparator::InsightCandidate;
use crate::content::{fill, ClassCopy, ContentPack, DimensionContent, FocusTemplate};
use crate::models::{
    round_to, CompareDimensionBlock, CompareLabel, CompareResult, ConversationPrompt, DiffClass,
    Dimension, FocusPick, KeyInsight, ParticipantView, ProfileResult, ValuesArchetype,
    ValuesProfile, Zone,
};
use std::collections::BTreeMap;

/// Focus templates kept as shared narrative picks.
pub const SHARED_PICKS: usize = 3;

/// Focus templates kept as gap narrative picks.
pub const GAP_PICKS: usize = 2;

/// Display name, falling back to the profile id.
pub fn display_name(profile: &ProfileResult) -> String {
    if profile.display_name.trim().is_empty() {
        profile.profile_id.clone()
    } else {
        profile.display_name.clone()
    }
}

/// One participant's side of a dimension.
pub fn participant_view(
    profile: &ProfileResult,
    dimension: Dimension,
    content: &ContentPack,
) -> ParticipantView {
    let classification =
        crate::analysis::classifier::classify(dimension, profile.score(dimension), content);
    ParticipantView {
        display_name: display_name(profile),
        score: profile.score(dimension),
        zone: classification.zone,
        archetype: classification.archetype,
    }
}

/// Inputs of a dimension dossier builder.
pub struct DossierContext<'a> {
    pub content: &'a DimensionContent,
    pub primary: &'a ParticipantView,
    pub partner: Option<&'a ParticipantView>,
    pub block: Option<&'a CompareDimensionBlock>,
}

type DossierBuilder = fn(&DossierContext<'_>) -> Vec<String>;

/// Dossier builder per dimension.
fn dossier_builder(dimension: Dimension) -> DossierBuilder {
    match dimension {
        Dimension::Vision => vision_dossier,
        Dimension::Entscheidung => decision_dossier,
        Dimension::Risiko => risk_dossier,
        Dimension::Autonomie => autonomy_dossier,
        Dimension::Verbindlichkeit => commitment_dossier,
        Dimension::Konflikt => conflict_dossier,
    }
}

/// Narrative paragraphs of one dimension dossier.
pub fn dossier_narrative(dimension: Dimension, ctx: &DossierContext<'_>) -> Vec<String> {
    let paragraphs = dossier_builder(dimension)(ctx);
    paragraphs.into_iter().filter(|p| !p.is_empty()).collect()
}

fn comparison_paragraph(ctx: &DossierContext<'_>) -> String {
    let (Some(partner), Some(block)) = (ctx.partner, ctx.block) else {
        return String::new();
    };
    let narrative = &ctx.content.narrative;
    let template = match block.label {
        CompareLabel::Match => &narrative.aligned,
        CompareLabel::Komplementaer => &narrative.complementary,
        CompareLabel::FokusThema => &narrative.divergent,
        CompareLabel::DatenUnvollstaendig => &narrative.incomplete,
    };
    fill(
        template,
        &[
            ("name_a", &ctx.primary.display_name),
            ("name_b", &partner.display_name),
            ("archetype_a", &ctx.primary.archetype.name),
            ("archetype_b", &partner.archetype.name),
            ("title", &ctx.content.title),
        ],
    )
}

/// Who carries the dimension: the higher scorer leads.
fn lead_paragraph(ctx: &DossierContext<'_>) -> String {
    let Some(partner) = ctx.partner else {
        return String::new();
    };
    let (Some(a), Some(b)) = (ctx.primary.score, partner.score) else {
        return String::new();
    };
    if ctx.block.and_then(|b| b.diff_class) == Some(DiffClass::Small) {
        return String::new();
    }
    let (leader, other) = if a > b {
        (&ctx.primary.display_name, &partner.display_name)
    } else {
        (&partner.display_name, &ctx.primary.display_name)
    };
    fill(
        &ctx.content.narrative.lead_hint,
        &[("leader", leader), ("other", other)],
    )
}

fn self_portrait(ctx: &DossierContext<'_>) -> Vec<String> {
    let archetype = &ctx.primary.archetype;
    let mut paragraphs = vec![format!("{}: {}", archetype.name, archetype.description_short)];
    if !archetype.superpower.is_empty() {
        paragraphs.push(format!("Stärke: {}", archetype.superpower));
    }
    if !archetype.caution.is_empty() {
        paragraphs.push(format!("Achtung: {}", archetype.caution));
    }
    paragraphs
}

fn cautions(ctx: &DossierContext<'_>) -> String {
    let Some(partner) = ctx.partner else {
        return String::new();
    };
    let parts: Vec<String> = [ctx.primary, partner]
        .iter()
        .filter(|view| view.score.is_some() && !view.archetype.caution.is_empty())
        .map(|view| format!("{}: {}", view.display_name, view.archetype.caution))
        .collect();
    parts.join(" ")
}

fn vision_dossier(ctx: &DossierContext<'_>) -> Vec<String> {
    if ctx.partner.is_none() {
        return self_portrait(ctx);
    }
    vec![comparison_paragraph(ctx), lead_paragraph(ctx)]
}

fn decision_dossier(ctx: &DossierContext<'_>) -> Vec<String> {
    let mut paragraphs = if ctx.partner.is_none() {
        self_portrait(ctx)
    } else {
        vec![comparison_paragraph(ctx), lead_paragraph(ctx)]
    };
    paragraphs.push(ctx.content.narrative.agreement.clone());
    paragraphs
}

fn risk_dossier(ctx: &DossierContext<'_>) -> Vec<String> {
    if ctx.partner.is_none() {
        return self_portrait(ctx);
    }
    let mut paragraphs = vec![comparison_paragraph(ctx), lead_paragraph(ctx)];
    let differs = matches!(
        ctx.block.and_then(|b| b.diff_class),
        Some(DiffClass::Medium | DiffClass::Large)
    );
    if differs {
        paragraphs.push(ctx.content.narrative.agreement.clone());
    }
    paragraphs
}

fn autonomy_dossier(ctx: &DossierContext<'_>) -> Vec<String> {
    if ctx.partner.is_none() {
        return self_portrait(ctx);
    }
    vec![
        comparison_paragraph(ctx),
        lead_paragraph(ctx),
        cautions(ctx),
    ]
}

fn commitment_dossier(ctx: &DossierContext<'_>) -> Vec<String> {
    if ctx.partner.is_none() {
        let mut paragraphs = self_portrait(ctx);
        paragraphs.push(ctx.content.narrative.agreement.clone());
        return paragraphs;
    }
    vec![
        comparison_paragraph(ctx),
        ctx.content.narrative.agreement.clone(),
        lead_paragraph(ctx),
    ]
}

fn conflict_dossier(ctx: &DossierContext<'_>) -> Vec<String> {
    if ctx.partner.is_none() {
        return self_portrait(ctx);
    }
    let mut paragraphs = vec![comparison_paragraph(ctx), lead_paragraph(ctx)];
    if ctx.block.map(|b| b.label) == Some(CompareLabel::FokusThema) {
        paragraphs.push(cautions(ctx));
        paragraphs.push(ctx.content.narrative.agreement.clone());
    }
    paragraphs
}

/// Copy keyed by the delta class of a driving dimension.
pub fn class_copy<'a>(copy: &'a ClassCopy, block: Option<&CompareDimensionBlock>) -> &'a str {
    match block.and_then(|b| b.diff_class) {
        Some(DiffClass::Small) => &copy.aligned,
        Some(DiffClass::Medium) => &copy.complementary,
        Some(DiffClass::Large) => &copy.divergent,
        None => &copy.incomplete,
    }
}

/// Fill the key insights selected by the comparator.
pub fn key_insights(
    candidates: &[InsightCandidate],
    profile: &ProfileResult,
    pair: Option<(&ProfileResult, &CompareResult)>,
    content: &ContentPack,
) -> Vec<KeyInsight> {
    let copy = &content.narrative.insights;
    candidates
        .iter()
        .map(|candidate| {
            let dimension_content = content.dimension(candidate.dimension);
            let title = dimension_content.title.as_str();
            let block = pair.and_then(|(partner, c)| {
                c.block(candidate.dimension).map(|block| (partner, block))
            });
            let (headline, text) = match block {
                Some((partner, block)) => {
                    let template = match block.diff_class {
                        Some(DiffClass::Small) => &copy.aligned,
                        Some(DiffClass::Medium) => &copy.complementary,
                        _ => &copy.divergent,
                    };
                    let narrative = &dimension_content.narrative;
                    let text = match block.diff_class {
                        Some(DiffClass::Small) => &narrative.aligned,
                        Some(DiffClass::Medium) => &narrative.complementary,
                        _ => &narrative.divergent,
                    };
                    (
                        fill(template, &[("title", title)]),
                        fill(
                            text,
                            &[
                                ("name_a", &display_name(profile)),
                                ("name_b", &display_name(partner)),
                                ("archetype_a", &block.archetype_a.name),
                                ("archetype_b", &block.archetype_b.name),
                                ("title", title),
                            ],
                        ),
                    )
                }
                None => {
                    let view = participant_view(profile, candidate.dimension, content);
                    let template = match candidate.zone {
                        Zone::Low => &copy.single_low,
                        Zone::Mid => &copy.single_mid,
                        Zone::High => &copy.single_high,
                    };
                    (
                        fill(
                            template,
                            &[("title", title), ("archetype", &view.archetype.name)],
                        ),
                        format!("{} {}", view.archetype.superpower, view.archetype.caution)
                            .trim()
                            .to_string(),
                    )
                }
            };
            KeyInsight {
                dimension: candidate.dimension,
                rank_score: candidate.rank_score,
                zone: candidate.zone,
                headline,
                text,
            }
        })
        .collect()
}

/// Conversation prompts. Tensions come first, then declaration order.
pub fn conversation_guide(
    compare: Option<&CompareResult>,
    content: &ContentPack,
) -> Vec<ConversationPrompt> {
    match compare {
        Some(compare) => {
            let mut order: Vec<Dimension> = compare
                .top_tensions
                .iter()
                .copied()
                .filter(|d| {
                    compare
                        .block(*d)
                        .is_some_and(|b| b.diff_class != Some(DiffClass::Small))
                })
                .collect();
            for dimension in Dimension::ALL {
                if !order.contains(&dimension) {
                    order.push(dimension);
                }
            }
            order
                .into_iter()
                .filter_map(|d| compare.block(d))
                .map(|block| ConversationPrompt {
                    dimension: Some(block.dimension),
                    question: block.reflection_question.clone(),
                    context: format!("{} ({})", block.title, block.label),
                })
                .collect()
        }
        None => Dimension::ALL
            .into_iter()
            .map(|dimension| {
                let dimension_content = content.dimension(dimension);
                ConversationPrompt {
                    dimension: Some(dimension),
                    question: dimension_content.reflection.single.clone(),
                    context: dimension_content.title.clone(),
                }
            })
            .collect(),
    }
}

/// Dot product of archetype weights and a template's weight vector.
pub fn template_score(weights: &BTreeMap<ValuesArchetype, f64>, template: &FocusTemplate) -> f64 {
    ValuesArchetype::ALL
        .iter()
        .map(|a| weights.get(a).copied().unwrap_or(0.0) * template.weight(*a))
        .sum()
}

/// Focus templates ranked by score distance between two profiles.
///
/// Returns `(shared, gap)`: the smallest distances first for shared picks,
/// the largest first for gap picks, ties by template id.
pub fn select_focus_templates<'t>(
    a: &ValuesProfile,
    b: &ValuesProfile,
    templates: &'t [FocusTemplate],
) -> (Vec<(&'t FocusTemplate, f64)>, Vec<(&'t FocusTemplate, f64)>) {
    let scored: Vec<(&FocusTemplate, f64)> = templates
        .iter()
        .map(|t| {
            let distance = (template_score(&a.weights, t) - template_score(&b.weights, t)).abs();
            (t, round_to(distance, 4))
        })
        .collect();

    let mut shared = scored.clone();
    shared.sort_by(|(ta, da), (tb, db)| da.total_cmp(db).then_with(|| ta.id.cmp(&tb.id)));
    shared.truncate(SHARED_PICKS);

    let mut gap = scored;
    gap.sort_by(|(ta, da), (tb, db)| db.total_cmp(da).then_with(|| ta.id.cmp(&tb.id)));
    gap.truncate(GAP_PICKS);

    (shared, gap)
}

/// Fill selected focus templates into report picks.
pub fn focus_picks(
    selected: &[(&FocusTemplate, f64)],
    shared: bool,
    name_a: &str,
    name_b: &str,
) -> Vec<FocusPick> {
    selected
        .iter()
        .map(|(template, distance)| {
            let text = if shared {
                &template.shared_text
            } else {
                &template.gap_text
            };
            FocusPick {
                template_id: template.id.clone(),
                title: template.title.clone(),
                distance: *distance,
                text: fill(text, &[("name_a", name_a), ("name_b", name_b)]),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::comparator::{compare, rank_key_insights};
    use crate::test_support::{named_profile, profile_with_scores, scores, values_profile};

    fn content() -> ContentPack {
        ContentPack::default_pack().unwrap()
    }

    #[test]
    fn test_every_dimension_has_a_builder() {
        let content = content();
        let a = named_profile("Anna", &scores(2.0));
        let b = named_profile("Ben", &scores(5.5));
        let result = compare(&a, &b, &content);

        for dimension in Dimension::ALL {
            let primary = participant_view(&a, dimension, &content);
            let partner = participant_view(&b, dimension, &content);
            let ctx = DossierContext {
                content: content.dimension(dimension),
                primary: &primary,
                partner: Some(&partner),
                block: result.block(dimension),
            };
            let narrative = dossier_narrative(dimension, &ctx);
            assert!(!narrative.is_empty(), "{}", dimension);
            assert!(narrative.iter().all(|p| !p.contains('{')), "{}", dimension);
        }
    }

    #[test]
    fn test_lead_paragraph_names_higher_scorer() {
        let content = content();
        let a = named_profile("Anna", &scores(2.0));
        let b = named_profile("Ben", &scores(5.5));
        let result = compare(&a, &b, &content);
        let primary = participant_view(&a, Dimension::Risiko, &content);
        let partner = participant_view(&b, Dimension::Risiko, &content);
        let ctx = DossierContext {
            content: content.dimension(Dimension::Risiko),
            primary: &primary,
            partner: Some(&partner),
            block: result.block(Dimension::Risiko),
        };
        assert_eq!(
            lead_paragraph(&ctx),
            "Ben sucht die Chance, Anna schützt die Substanz."
        );
    }

    #[test]
    fn test_class_copy_follows_delta_class() {
        let content = content();
        let copy = &content.narrative.decision_architecture;
        let a = named_profile("Anna", &scores(2.0));
        let b = named_profile("Ben", &[Some(2.2), None, Some(5.5), Some(3.0), Some(3.0), Some(3.0)]);
        let result = compare(&a, &b, &content);

        assert_eq!(class_copy(copy, result.block(Dimension::Vision)), copy.aligned);
        assert_eq!(class_copy(copy, result.block(Dimension::Entscheidung)), copy.incomplete);
        assert_eq!(class_copy(copy, result.block(Dimension::Risiko)), copy.divergent);
        assert_eq!(class_copy(copy, None), copy.incomplete);
    }

    #[test]
    fn test_single_profile_dossier_is_self_portrait() {
        let content = content();
        let a = named_profile("Anna", &scores(5.0));
        let primary = participant_view(&a, Dimension::Vision, &content);
        let ctx = DossierContext {
            content: content.dimension(Dimension::Vision),
            primary: &primary,
            partner: None,
            block: None,
        };
        let narrative = dossier_narrative(Dimension::Vision, &ctx);
        assert!(narrative[0].starts_with("Der Visionär"));
    }

    #[test]
    fn test_single_mode_insights_use_zone_copy() {
        let content = content();
        let a = profile_with_scores("a", &[Some(1.2), Some(3.4), Some(3.5), Some(3.6), Some(3.5), Some(3.5)]);
        let candidates = rank_key_insights(&a, None);
        let insights = key_insights(&candidates, &a, None, &content);
        assert_eq!(insights[0].dimension, Dimension::Vision);
        assert!(insights[0].headline.contains("deutlich niedrige"));
    }

    #[test]
    fn test_conversation_guide_puts_tensions_first() {
        let content = content();
        let a = named_profile("Anna", &scores(3.0));
        let b = named_profile(
            "Ben",
            &[Some(3.0), Some(3.0), Some(3.0), Some(3.0), Some(5.8), Some(3.0)],
        );
        let result = compare(&a, &b, &content);
        let guide = conversation_guide(Some(&result), &content);
        assert_eq!(guide.len(), 6);
        assert_eq!(guide[0].dimension, Some(Dimension::Verbindlichkeit));
        assert_eq!(guide[1].dimension, Some(Dimension::Vision));
    }

    #[test]
    fn test_focus_selection_is_deterministic_and_tie_breaks_on_id() {
        let content = content();
        let profile = values_profile(ValuesArchetype::ImpactIdealist, 2.0);
        let (shared, gap) =
            select_focus_templates(&profile, &profile, &content.values.focus_templates);

        // identical profiles: every distance is zero, so ids decide
        let shared_ids: Vec<&str> = shared.iter().map(|(t, _)| t.id.as_str()).collect();
        let gap_ids: Vec<&str> = gap.iter().map(|(t, _)| t.id.as_str()).collect();
        assert_eq!(shared_ids, vec!["f1_mission", "f2_governance", "f3_growth"]);
        assert_eq!(gap_ids, vec!["f1_mission", "f2_governance"]);
    }

    #[test]
    fn test_focus_gap_prefers_diverging_templates() {
        let content = content();
        let impact = values_profile(ValuesArchetype::ImpactIdealist, 1.5);
        let business = values_profile(ValuesArchetype::BusinessPragmatiker, 5.5);
        let (shared, gap) =
            select_focus_templates(&impact, &business, &content.values.focus_templates);

        let gap_ids: Vec<&str> = gap.iter().map(|(t, _)| t.id.as_str()).collect();
        assert!(gap_ids.contains(&"f1_mission") || gap_ids.contains(&"f3_growth"));
        assert!(shared[0].1 <= shared[2].1);
        assert!(gap[0].1 >= gap[1].1);
    }
}
