//! Markdown and JSON rendering.
//!
//! Renders a finished report document for humans (Markdown) or machines
//! (pretty JSON). Rendering never changes the document.

use crate::models::{
    CompareReportJson, DeepDiveItem, KeyInsight, ParticipantView, ReportSection, SectionId,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &CompareReportJson) -> String {
    let mut output = String::new();

    output.push_str(&generate_cover(report));
    output.push_str(&generate_table_of_contents(&report.sections));

    for section in &report.sections {
        output.push_str(&generate_section(section));
        match section.id {
            SectionId::ExecutiveSummary => {
                output.push_str(&generate_insights(&report.key_insights));
            }
            SectionId::DimensionDossiers => {
                for item in &report.deep_dive {
                    output.push_str(&generate_dossier(item));
                }
            }
            _ => {}
        }
    }

    output.push_str(&generate_footer(report));
    output
}

fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' => Some(c),
            _ => None,
        })
        .collect()
}

/// Generate the cover block.
fn generate_cover(report: &CompareReportJson) -> String {
    let mut cover = String::new();

    cover.push_str(&format!("# {}\n\n", report.cover.title));
    cover.push_str(&format!("**{}**\n\n", report.cover.subtitle));
    cover.push_str(&format!(
        "- **Teilnehmende:** {}\n",
        report.cover.participants.join(", ")
    ));
    if let Some(summary_type) = report.cover.summary_type {
        cover.push_str(&format!("- **Teamtyp:** {}\n", summary_type));
    }
    cover.push_str(&format!(
        "- **Datenbasis:** {}/{} Dimensionen vergleichbar\n",
        report.coverage.comparable_dimensions, report.coverage.total_dimensions
    ));
    cover.push('\n');

    cover
}

fn generate_table_of_contents(sections: &[ReportSection]) -> String {
    let mut toc = String::new();

    toc.push_str("## Inhalt\n\n");
    for section in sections {
        toc.push_str(&format!("- [{}](#{})\n", section.title, anchor(&section.title)));
    }
    toc.push('\n');

    toc
}

fn generate_section(section: &ReportSection) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {}\n\n", section.title));
    for paragraph in &section.paragraphs {
        output.push_str(paragraph);
        output.push_str("\n\n");
    }
    if !section.bullets.is_empty() {
        for bullet in &section.bullets {
            output.push_str(&format!("- {}\n", bullet));
        }
        output.push('\n');
    }

    output
}

fn generate_insights(insights: &[KeyInsight]) -> String {
    if insights.is_empty() {
        return String::new();
    }

    let mut output = String::new();
    output.push_str("### Kernerkenntnisse\n\n");
    for (rank, insight) in insights.iter().enumerate() {
        output.push_str(&format!("{}. **{}**", rank + 1, insight.headline));
        if !insight.text.is_empty() {
            output.push_str(&format!(" {}", insight.text));
        }
        output.push('\n');
    }
    output.push('\n');

    output
}

fn score_cell(view: &ParticipantView) -> String {
    match view.score {
        Some(score) => format!("{:.2} ({})", score, view.zone),
        None => "keine Daten".to_string(),
    }
}

fn generate_dossier(item: &DeepDiveItem) -> String {
    let mut output = String::new();

    output.push_str(&format!("### {}\n\n", item.title));
    output.push_str(&format!("*{}*\n\n", item.daily_pressure));

    output.push_str("| Person | Wert | Archetyp |\n");
    output.push_str("|---|:---:|---|\n");
    for view in std::iter::once(&item.primary).chain(item.partner.as_ref()) {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            view.display_name,
            score_cell(view),
            view.archetype.name
        ));
    }
    output.push('\n');

    if let Some(comparison) = &item.comparison {
        match comparison.diff {
            Some(diff) => {
                output.push_str(&format!("**{}** (Abstand {:.2})\n\n", comparison.label, diff))
            }
            None => output.push_str(&format!("**{}**\n\n", comparison.label)),
        }
    }

    for paragraph in &item.narrative {
        output.push_str(paragraph);
        output.push_str("\n\n");
    }
    output.push_str(&format!("> {}\n\n", item.reflection_question));

    output
}

fn generate_footer(report: &CompareReportJson) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*{} · Inhalte {} · alignmatch {}*\n",
        report.report_version,
        report.content_version,
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &CompareReportJson) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
