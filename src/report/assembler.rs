//! Report assembly.
//!
//! Orders composed content into the final document. Section order is
//! fixed; the values section appears only when it can be evaluated and the
//! data-coverage section is always present.

use crate::analysis::comparator::{compare, rank_key_insights};
use crate::analysis::coverage::{
    evaluate_pair, evaluate_single, CoverageAssessment, MIN_COMPARABLE_DIMENSIONS,
};
use crate::content::{fill, ContentPack};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CompareLabel, CompareReportJson, CompareResult, Cover, CoverageReport, DeepDiveItem,
    DiffClass, Dimension, DimensionComparison, ExecutiveSummary, ParticipantCoverageSummary,
    ProfileResult, ReportMode, ReportSection, SectionId, ValuesModule,
    ValuesParticipantSummary, ValuesProfile, ValuesStatus, ValuesTier, SCALE_MAX, SCALE_MIN,
};
use crate::report::composer::{
    class_copy, conversation_guide, display_name, dossier_narrative, focus_picks, key_insights,
    participant_view, select_focus_templates, DossierContext,
};
use crate::values::scorer::values_alignment;
use tracing::debug;

/// Schema version of the report document.
pub const REPORT_VERSION: &str = "compare-report/v1";

/// Assemble a report for one profile, or a comparison when a partner is given.
pub fn assemble(
    content: &ContentPack,
    primary: &ProfileResult,
    partner: Option<&ProfileResult>,
) -> EngineResult<CompareReportJson> {
    check_scores(primary)?;
    match partner {
        Some(partner) => {
            check_scores(partner)?;
            assemble_compare(content, primary, partner)
        }
        None => Ok(assemble_single(content, primary)),
    }
}

fn check_scores(profile: &ProfileResult) -> EngineResult<()> {
    for dimension in Dimension::ALL {
        if let Some(score) = profile.score(dimension) {
            if !(SCALE_MIN..=SCALE_MAX).contains(&score) {
                return Err(EngineError::contract(format!(
                    "score {} for {} of {} is outside the 1-6 scale",
                    score, dimension, profile.profile_id
                )));
            }
        }
    }
    Ok(())
}

fn check_blocks(result: &CompareResult) -> EngineResult<()> {
    for block in &result.blocks {
        let both_scored = block.score_a.is_some() && block.score_b.is_some();
        if block.is_comparable() != both_scored {
            return Err(EngineError::contract(format!(
                "delta of {} does not match score presence",
                block.dimension
            )));
        }
    }
    Ok(())
}

fn section(
    id: SectionId,
    title: &str,
    paragraphs: Vec<String>,
    bullets: Vec<String>,
) -> ReportSection {
    ReportSection {
        id,
        title: title.to_string(),
        paragraphs,
        bullets,
    }
}

fn fill_all(templates: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    templates.iter().map(|t| fill(t, vars)).collect()
}

fn coverage_report(
    content: &ContentPack,
    assessment: &CoverageAssessment,
    profiles: &[&ProfileResult],
) -> CoverageReport {
    let copy = &content.narrative.coverage;
    CoverageReport {
        comparable_dimensions: assessment.comparable_dimensions,
        total_dimensions: assessment.total_dimensions,
        min_comparable_dimensions: MIN_COMPARABLE_DIMENSIONS,
        is_data_sufficient: assessment.is_data_sufficient,
        note: assessment.note(copy),
        participants: profiles
            .iter()
            .map(|p| ParticipantCoverageSummary {
                display_name: display_name(p),
                answered: p.coverage.total_answered,
                expected: p.coverage.total_expected,
                coverage_percent: p.coverage.coverage_percent,
            })
            .collect(),
    }
}

fn coverage_bullets(content: &ContentPack, coverage: &CoverageReport) -> Vec<String> {
    coverage
        .participants
        .iter()
        .map(|p| {
            let percent = p
                .coverage_percent
                .map(|v| format!("{} %", v))
                .unwrap_or_else(|| "–".to_string());
            fill(
                &content.narrative.coverage.participant,
                &[
                    ("name", &p.display_name),
                    ("answered", &p.answered.to_string()),
                    ("expected", &p.expected.to_string()),
                    ("percent", &percent),
                ],
            )
        })
        .collect()
}

fn values_summary(content: &ContentPack, profile: &ProfileResult) -> ValuesParticipantSummary {
    let values = profile.values_profile.as_ref();
    ValuesParticipantSummary {
        display_name: display_name(profile),
        primary_archetype_id: values.map(|v| v.primary_archetype_id),
        primary_archetype_name: values
            .map(|v| content.values.archetype_name(v.primary_archetype_id)),
        secondary_archetype_id: values.and_then(|v| v.secondary_archetype_id),
        continuum_score: values.map(|v| v.continuum_score),
    }
}

fn complete_values(profile: &ProfileResult) -> Option<&ValuesProfile> {
    profile.values_profile.as_ref().filter(|v| v.is_complete())
}

fn values_module_compare(
    content: &ContentPack,
    a: &ProfileResult,
    b: &ProfileResult,
) -> ValuesModule {
    let participants = vec![values_summary(content, a), values_summary(content, b)];
    let tiers = &content.values.tiers;

    let evaluated = match (complete_values(a), complete_values(b)) {
        (Some(va), Some(vb)) => values_alignment(Some(va), Some(vb)).map(|alignment| (va, vb, alignment)),
        _ => None,
    };

    let Some((va, vb, (percent, tier))) = evaluated else {
        debug!("Values module pending: a values profile is missing or incomplete");
        return ValuesModule {
            status: ValuesStatus::Pending,
            participants,
            alignment_percent: None,
            tier: None,
            note: tiers.pending.clone(),
            shared_focus: Vec::new(),
            gap_focus: Vec::new(),
        };
    };

    let name_a = display_name(a);
    let name_b = display_name(b);
    let template = match tier {
        ValuesTier::Symbiose => &tiers.symbiose,
        ValuesTier::Schnittmenge => &tiers.schnittmenge,
        ValuesTier::Spannungsfeld => &tiers.spannungsfeld,
    };
    let (shared, gap) = select_focus_templates(va, vb, &content.values.focus_templates);

    ValuesModule {
        status: ValuesStatus::Evaluated,
        participants,
        alignment_percent: Some(percent),
        tier: Some(tier),
        note: fill(
            template,
            &[
                ("percent", &percent.to_string()),
                ("name_a", &name_a),
                ("name_b", &name_b),
            ],
        ),
        shared_focus: focus_picks(&shared, true, &name_a, &name_b),
        gap_focus: focus_picks(&gap, false, &name_a, &name_b),
    }
}

fn values_module_single(content: &ContentPack, profile: &ProfileResult) -> ValuesModule {
    let tiers = &content.values.tiers;
    let (status, note) = match complete_values(profile) {
        Some(values) => (
            ValuesStatus::SelfOnly,
            fill(
                &tiers.self_only,
                &[
                    ("name", &display_name(profile)),
                    (
                        "archetype",
                        &content.values.archetype_name(values.primary_archetype_id),
                    ),
                ],
            ),
        ),
        None => (ValuesStatus::Pending, tiers.pending.clone()),
    };
    ValuesModule {
        status,
        participants: vec![values_summary(content, profile)],
        alignment_percent: None,
        tier: None,
        note,
        shared_focus: Vec::new(),
        gap_focus: Vec::new(),
    }
}

fn values_section(content: &ContentPack, module: &ValuesModule) -> ReportSection {
    let bullets = module
        .shared_focus
        .iter()
        .chain(module.gap_focus.iter())
        .map(|pick| format!("{}: {}", pick.title, pick.text))
        .collect();
    section(
        SectionId::ValuesAlignment,
        &content.narrative.sections.values_alignment,
        vec![module.note.clone()],
        bullets,
    )
}

fn deep_dive_item(
    content: &ContentPack,
    dimension: Dimension,
    primary: &ProfileResult,
    pair: Option<(&ProfileResult, &CompareResult)>,
) -> DeepDiveItem {
    let dimension_content = content.dimension(dimension);
    let primary_view = participant_view(primary, dimension, content);
    let partner_view = pair.map(|(partner, _)| participant_view(partner, dimension, content));
    let block = pair.and_then(|(_, result)| result.block(dimension));

    let ctx = DossierContext {
        content: dimension_content,
        primary: &primary_view,
        partner: partner_view.as_ref(),
        block,
    };
    let narrative = dossier_narrative(dimension, &ctx);

    DeepDiveItem {
        dimension,
        title: dimension_content.title.clone(),
        daily_pressure: dimension_content.daily_pressure.clone(),
        comparison: block.map(|b| DimensionComparison {
            diff: b.diff,
            diff_class: b.diff_class,
            label: b.label,
        }),
        reflection_question: block
            .map(|b| b.reflection_question.clone())
            .unwrap_or_else(|| dimension_content.reflection.single.clone()),
        primary: primary_view,
        partner: partner_view,
        narrative,
    }
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "–".to_string())
}

/// Large-delta blocks, largest first, ties in dimension order.
fn critical_tensions(result: &CompareResult) -> Vec<&crate::models::CompareDimensionBlock> {
    let mut tensions: Vec<_> = result
        .blocks
        .iter()
        .filter(|b| b.diff_class == Some(DiffClass::Large))
        .collect();
    tensions.sort_by(|a, b| {
        let (da, db) = (a.diff.unwrap_or(0.0), b.diff.unwrap_or(0.0));
        db.total_cmp(&da).then_with(|| a.dimension.cmp(&b.dimension))
    });
    tensions
}

fn assemble_compare(
    content: &ContentPack,
    a: &ProfileResult,
    b: &ProfileResult,
) -> EngineResult<CompareReportJson> {
    let result = compare(a, b, content);
    check_blocks(&result)?;

    let narrative = &content.narrative;
    let titles = &narrative.sections;
    let name_a = display_name(a);
    let name_b = display_name(b);
    let names = [("name_a", name_a.as_str()), ("name_b", name_b.as_str())];

    let coverage = coverage_report(content, &evaluate_pair(a, b), &[a, b]);
    let insights = key_insights(&rank_key_insights(a, Some(b)), a, Some((b, &result)), content);
    let deep_dive: Vec<DeepDiveItem> = Dimension::ALL
        .into_iter()
        .map(|d| deep_dive_item(content, d, a, Some((b, &result))))
        .collect();
    let values_module = values_module_compare(content, a, b);
    let guide = conversation_guide(Some(&result), content);
    let team = content.team_type(result.summary_type);

    let executive_summary = ExecutiveSummary {
        headline: team.headline.clone(),
        paragraphs: vec![team.description.clone(), coverage.note.clone()],
        summary_type: Some(result.summary_type),
        diff_sum: Some(result.diff_sum),
        top_matches: result.top_matches.clone(),
        top_tensions: result.top_tensions.clone(),
    };

    let mut sections = Vec::new();
    sections.push(section(
        SectionId::Intro,
        &titles.intro,
        fill_all(&narrative.intro_compare, &names),
        Vec::new(),
    ));
    sections.push(section(
        SectionId::ExecutiveSummary,
        &titles.executive_summary,
        executive_summary.paragraphs.clone(),
        insights.iter().map(|i| i.headline.clone()).collect(),
    ));

    let count = |label: CompareLabel| {
        result
            .blocks
            .iter()
            .filter(|b| b.label == label)
            .count()
            .to_string()
    };
    sections.push(section(
        SectionId::CollaborationOverview,
        &titles.collaboration_overview,
        vec![fill(
            &narrative.overview_counts,
            &[
                ("matches", &count(CompareLabel::Match)),
                ("complements", &count(CompareLabel::Komplementaer)),
                ("focus", &count(CompareLabel::FokusThema)),
                ("missing", &count(CompareLabel::DatenUnvollstaendig)),
            ],
        )],
        result
            .blocks
            .iter()
            .map(|block| match block.diff {
                Some(diff) => format!("{}: {} ({:.2})", block.title, block.label, diff),
                None => format!("{}: {}", block.title, block.label),
            })
            .collect(),
    ));
    sections.push(section(
        SectionId::DataCoverage,
        &titles.data_coverage,
        vec![coverage.note.clone()],
        coverage_bullets(content, &coverage),
    ));
    sections.push(section(
        SectionId::DecisionArchitecture,
        &titles.decision_architecture,
        vec![fill(
            class_copy(
                &narrative.decision_architecture,
                result.block(Dimension::Entscheidung),
            ),
            &names,
        )],
        Vec::new(),
    ));
    sections.push(section(
        SectionId::RiskContract,
        &titles.risk_contract,
        vec![fill(
            class_copy(&narrative.risk_contract, result.block(Dimension::Risiko)),
            &names,
        )],
        Vec::new(),
    ));
    sections.push(section(
        SectionId::DimensionDossiers,
        &titles.dimension_dossiers,
        Vec::new(),
        result
            .blocks
            .iter()
            .map(|block| {
                format!(
                    "{}: {} / {} ({})",
                    block.title, block.archetype_a.name, block.archetype_b.name, block.label
                )
            })
            .collect(),
    ));

    let tensions = critical_tensions(&result);
    let (tension_paragraphs, tension_bullets) = if tensions.is_empty() {
        (vec![narrative.no_tensions.clone()], Vec::new())
    } else {
        (
            vec![narrative.tensions_intro.clone()],
            tensions
                .iter()
                .map(|block| {
                    fill(
                        &narrative.tension_item,
                        &[
                            ("title", &block.title),
                            ("diff", &format_score(block.diff)),
                            ("name_a", &name_a),
                            ("name_b", &name_b),
                        ],
                    )
                })
                .collect(),
        )
    };
    sections.push(section(
        SectionId::CriticalTensions,
        &titles.critical_tensions,
        tension_paragraphs,
        tension_bullets,
    ));

    if values_module.status == ValuesStatus::Evaluated {
        sections.push(values_section(content, &values_module));
    }

    sections.push(section(
        SectionId::ConversationGuide,
        &titles.conversation_guide,
        vec![narrative.guide_intro.clone()],
        guide.iter().map(|p| p.question.clone()).collect(),
    ));

    let plan = &narrative.plan;
    let mut plan_bullets: Vec<String> = plan.day_30.iter().map(|i| format!("30 Tage: {}", i)).collect();
    plan_bullets.extend(
        tensions
            .iter()
            .map(|block| format!("30 Tage: {}", fill(&plan.focus_item, &[("title", &block.title)]))),
    );
    plan_bullets.extend(plan.day_60.iter().map(|i| format!("60 Tage: {}", i)));
    plan_bullets.extend(plan.day_90.iter().map(|i| format!("90 Tage: {}", i)));
    sections.push(section(
        SectionId::Plan306090,
        &titles.plan,
        Vec::new(),
        plan_bullets,
    ));
    sections.push(section(
        SectionId::Closing,
        &titles.closing,
        fill_all(&narrative.closing_compare, &names),
        Vec::new(),
    ));

    debug!(
        "Assembled comparison {} / {} with {} sections",
        a.profile_id,
        b.profile_id,
        sections.len()
    );

    Ok(CompareReportJson {
        report_version: REPORT_VERSION.to_string(),
        content_version: content.version.clone(),
        mode: ReportMode::Compare,
        sections,
        cover: Cover {
            title: narrative.report_title.clone(),
            subtitle: fill(&narrative.subtitle_compare, &names),
            participants: vec![name_a.clone(), name_b.clone()],
            summary_type: Some(result.summary_type),
        },
        executive_summary,
        key_insights: insights,
        deep_dive,
        values_module,
        coverage,
        conversation_guide: guide,
    })
}

fn assemble_single(content: &ContentPack, profile: &ProfileResult) -> CompareReportJson {
    let narrative = &content.narrative;
    let titles = &narrative.sections;
    let name = display_name(profile);
    let vars = [("name", name.as_str())];

    let coverage = coverage_report(content, &evaluate_single(profile), &[profile]);
    let insights = key_insights(&rank_key_insights(profile, None), profile, None, content);
    let deep_dive: Vec<DeepDiveItem> = Dimension::ALL
        .into_iter()
        .map(|d| deep_dive_item(content, d, profile, None))
        .collect();
    let values_module = values_module_single(content, profile);
    let guide = conversation_guide(None, content);

    let edges = Dimension::ALL
        .iter()
        .filter(|d| profile.score(**d).is_some() && profile.zone(**d).is_edge())
        .count();
    let overview = fill(
        &narrative.overview_single,
        &[("name", &name), ("edges", &edges.to_string())],
    );

    let executive_summary = ExecutiveSummary {
        headline: fill(&narrative.subtitle_single, &vars),
        paragraphs: vec![overview, coverage.note.clone()],
        summary_type: None,
        diff_sum: None,
        top_matches: Vec::new(),
        top_tensions: Vec::new(),
    };

    let mut sections = vec![
        section(
            SectionId::Intro,
            &titles.intro,
            fill_all(&narrative.intro_single, &vars),
            Vec::new(),
        ),
        section(
            SectionId::ExecutiveSummary,
            &titles.executive_summary,
            executive_summary.paragraphs.clone(),
            insights.iter().map(|i| i.headline.clone()).collect(),
        ),
        section(
            SectionId::DataCoverage,
            &titles.data_coverage,
            vec![coverage.note.clone()],
            coverage_bullets(content, &coverage),
        ),
        section(
            SectionId::DimensionDossiers,
            &titles.dimension_dossiers,
            Vec::new(),
            deep_dive
                .iter()
                .map(|item| {
                    format!(
                        "{}: {} ({})",
                        item.title,
                        item.primary.archetype.name,
                        format_score(item.primary.score)
                    )
                })
                .collect(),
        ),
    ];

    if values_module.status == ValuesStatus::SelfOnly {
        sections.push(values_section(content, &values_module));
    }

    sections.push(section(
        SectionId::ConversationGuide,
        &titles.conversation_guide,
        vec![narrative.guide_intro.clone()],
        guide.iter().map(|p| p.question.clone()).collect(),
    ));
    sections.push(section(
        SectionId::Closing,
        &titles.closing,
        fill_all(&narrative.closing_single, &vars),
        Vec::new(),
    ));

    debug!(
        "Assembled single-profile report for {} with {} sections",
        profile.profile_id,
        sections.len()
    );

    CompareReportJson {
        report_version: REPORT_VERSION.to_string(),
        content_version: content.version.clone(),
        mode: ReportMode::Single,
        sections,
        cover: Cover {
            title: narrative.report_title.clone(),
            subtitle: fill(&narrative.subtitle_single, &vars),
            participants: vec![name.clone()],
            summary_type: None,
        },
        executive_summary,
        key_insights: insights,
        deep_dive,
        values_module,
        coverage,
        conversation_guide: guide,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TeamType, ValuesArchetype};
    use crate::test_support::{named_profile, scores, values_profile};
    use pretty_assertions::assert_eq;

    fn content() -> ContentPack {
        ContentPack::default_pack().unwrap()
    }

    fn section_ids(report: &CompareReportJson) -> Vec<SectionId> {
        report.sections.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_compare_section_order_without_values() {
        let a = named_profile("Anna", &scores(2.0));
        let b = named_profile("Ben", &scores(5.5));
        let report = assemble(&content(), &a, Some(&b)).unwrap();

        assert_eq!(
            section_ids(&report),
            vec![
                SectionId::Intro,
                SectionId::ExecutiveSummary,
                SectionId::CollaborationOverview,
                SectionId::DataCoverage,
                SectionId::DecisionArchitecture,
                SectionId::RiskContract,
                SectionId::DimensionDossiers,
                SectionId::CriticalTensions,
                SectionId::ConversationGuide,
                SectionId::Plan306090,
                SectionId::Closing,
            ]
        );
        assert_eq!(report.values_module.status, ValuesStatus::Pending);
        assert_eq!(report.values_module.tier, None);
        assert_eq!(report.mode, ReportMode::Compare);
    }

    #[test]
    fn test_values_section_inserted_when_both_profiles_complete() {
        let mut a = named_profile("Anna", &scores(3.0));
        let mut b = named_profile("Ben", &scores(3.5));
        a.values_profile = Some(values_profile(ValuesArchetype::ImpactIdealist, 2.0));
        b.values_profile = Some(values_profile(ValuesArchetype::VerantwortungsStratege, 3.5));

        let report = assemble(&content(), &a, Some(&b)).unwrap();
        let ids = section_ids(&report);
        let values_at = ids
            .iter()
            .position(|id| *id == SectionId::ValuesAlignment)
            .unwrap();
        assert_eq!(ids[values_at - 1], SectionId::CriticalTensions);
        assert_eq!(ids[values_at + 1], SectionId::ConversationGuide);

        let module = &report.values_module;
        assert_eq!(module.status, ValuesStatus::Evaluated);
        assert_eq!(module.alignment_percent, Some(70));
        assert_eq!(module.tier, Some(ValuesTier::Schnittmenge));
        assert_eq!(module.shared_focus.len(), 3);
        assert_eq!(module.gap_focus.len(), 2);
    }

    #[test]
    fn test_partial_values_profile_keeps_module_pending() {
        let mut a = named_profile("Anna", &scores(3.0));
        let mut b = named_profile("Ben", &scores(3.5));
        let mut partial = values_profile(ValuesArchetype::ImpactIdealist, 2.0);
        partial.answered = 1;
        partial.expected = 3;
        a.values_profile = Some(partial);
        b.values_profile = Some(values_profile(ValuesArchetype::VerantwortungsStratege, 3.5));

        let report = assemble(&content(), &a, Some(&b)).unwrap();
        assert!(!section_ids(&report).contains(&SectionId::ValuesAlignment));
        let module = &report.values_module;
        assert_eq!(module.status, ValuesStatus::Pending);
        assert_eq!(module.alignment_percent, None);
        assert_eq!(module.tier, None);
        assert!(module.shared_focus.is_empty());
        assert_eq!(module.participants.len(), 2);
    }

    #[test]
    fn test_coverage_note_is_always_rendered() {
        let a = named_profile("Anna", &scores(3.0));
        let b = named_profile("Ben", &scores(3.1));
        let report = assemble(&content(), &a, Some(&b)).unwrap();

        let coverage = report.section(SectionId::DataCoverage).unwrap();
        assert!(coverage.paragraphs[0].contains("6/6"));
        assert!(report.coverage.is_data_sufficient);
        assert!(report.coverage.note.contains("aussagekräftig"));
    }

    #[test]
    fn test_placeholder_like_names_are_rendered_verbatim() {
        let a = named_profile("{name_b}", &scores(3.0));
        let b = named_profile("Ben", &scores(3.0));
        let report = assemble(&content(), &a, Some(&b)).unwrap();
        assert_eq!(report.cover.subtitle, "{name_b} & Ben");
    }

    #[test]
    fn test_insufficient_comparison_reports_ratio_and_suppression() {
        let a = named_profile("Anna", &[Some(2.0), Some(2.0), Some(2.0), None, None, None]);
        let b = named_profile("Ben", &scores(5.0));
        let report = assemble(&content(), &a, Some(&b)).unwrap();

        assert!(!report.coverage.is_data_sufficient);
        assert!(report.coverage.note.contains("3/6"));
        assert!(report.coverage.note.contains("ausgesetzt"));
        assert_eq!(
            report.executive_summary.summary_type,
            Some(TeamType::DatenlageUnvollstaendig)
        );
        assert_eq!(report.executive_summary.headline, "Datenlage unvollständig");
    }

    #[test]
    fn test_critical_tensions_list_large_deltas() {
        let a = named_profile("Anna", &scores(3.0));
        let b = named_profile(
            "Ben",
            &[Some(3.0), Some(5.5), Some(3.0), Some(3.0), Some(6.0), Some(3.0)],
        );
        let report = assemble(&content(), &a, Some(&b)).unwrap();
        let tensions = report.section(SectionId::CriticalTensions).unwrap();
        assert_eq!(tensions.bullets.len(), 2);
        assert!(tensions.bullets[0].starts_with(&content().dimension(Dimension::Verbindlichkeit).title));
    }

    #[test]
    fn test_single_mode_omits_pairwise_content() {
        let a = named_profile("Anna", &[Some(1.5), Some(5.0), None, Some(3.5), Some(4.6), Some(2.0)]);
        let report = assemble(&content(), &a, None).unwrap();

        assert_eq!(report.mode, ReportMode::Single);
        assert_eq!(report.cover.summary_type, None);
        assert_eq!(report.executive_summary.diff_sum, None);
        assert!(report.executive_summary.top_tensions.is_empty());
        assert!(report.deep_dive.iter().all(|d| d.partner.is_none() && d.comparison.is_none()));
        assert!(report.section(SectionId::CollaborationOverview).is_none());
        assert!(report.section(SectionId::CriticalTensions).is_none());
        assert!(report.section(SectionId::DataCoverage).is_some());
        assert_eq!(report.values_module.status, ValuesStatus::Pending);
        assert!(report.key_insights.len() <= 3);
        assert_eq!(report.coverage.comparable_dimensions, 5);
    }

    #[test]
    fn test_single_mode_with_values_profile() {
        let mut a = named_profile("Anna", &scores(4.0));
        a.values_profile = Some(values_profile(ValuesArchetype::BusinessPragmatiker, 5.0));
        let report = assemble(&content(), &a, None).unwrap();

        assert_eq!(report.values_module.status, ValuesStatus::SelfOnly);
        assert!(report.values_module.note.contains("Business-Pragmatiker"));
        assert!(report.section(SectionId::ValuesAlignment).is_some());
        assert_eq!(report.values_module.tier, None);
    }

    #[test]
    fn test_out_of_scale_score_is_contract_violation() {
        let a = named_profile("Anna", &scores(3.0));
        let b = named_profile("Ben", &[Some(7.5), Some(3.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0)]);
        let err = assemble(&content(), &a, Some(&b)).unwrap_err();
        assert!(matches!(err, EngineError::ContractViolation { .. }));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let mut a = named_profile("Anna", &[Some(1.2), Some(4.4), None, Some(3.5), Some(5.1), Some(2.6)]);
        let mut b = named_profile("Ben", &[Some(4.0), Some(4.4), Some(2.0), Some(1.5), Some(5.0), Some(4.9)]);
        a.values_profile = Some(values_profile(ValuesArchetype::ImpactIdealist, 1.8));
        b.values_profile = Some(values_profile(ValuesArchetype::BusinessPragmatiker, 5.2));

        let first = assemble(&content(), &a, Some(&b)).unwrap();
        let second = assemble(&content(), &a, Some(&b)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
