//! Markdown and JSON report generation.
//!
//! The Markdown report renders each dashboard chart as a table; the JSON
//! report carries the raw chart data for external renderers.

use crate::config::ReportConfig;
use crate::models::{
    AverageCosts, CostBreakdown, Dashboard, EfficiencyPoint, MemberCategory, Report,
    ReportMetadata, SavingsDistribution, SavingsRatioPoint, SchemeNode,
};
use anyhow::Result;

/// Rendering options for the Markdown report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub include_summary_cards: bool,
    /// Row cap for per-scheme tables.
    pub max_table_rows: usize,
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            include_summary_cards: config.include_summary_cards,
            max_table_rows: config.max_table_rows,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportOptions) -> String {
    let dashboard = &report.dashboard;
    let mut output = String::new();

    output.push_str("# ClaimCare Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(options));

    if dashboard.record_count == 0 {
        output.push_str("> No records loaded. Every chart below is empty or undefined.\n\n");
    }

    if options.include_summary_cards {
        output.push_str(&generate_summary_section(&dashboard.average_costs));
    }

    output.push_str(&generate_cost_structure_section(&dashboard.cost_breakdown));
    output.push_str(&generate_savings_distribution_section(
        &dashboard.savings_distribution,
    ));
    output.push_str(&generate_utilization_section(
        &dashboard.savings_utilization,
    ));
    output.push_str(&generate_savings_ratio_section(dashboard, options));
    output.push_str(&generate_efficiency_section(
        &dashboard.cost_efficiency,
        options,
    ));

    output.push_str(&generate_footer());

    output
}

/// Format a number, spelling out the non-finite values the aggregations can produce.
fn format_number(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "∞".to_string()
    } else if value == f64::NEG_INFINITY {
        "-∞".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

fn format_rand(value: f64) -> String {
    format!("R {}", format_number(value, 2))
}

fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, 1))
}

fn truncation_note(total: usize, shown: usize) -> String {
    if total > shown {
        format!("*… and {} more*\n\n", total - shown)
    } else {
        String::new()
    }
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Schemes Loaded:** {}\n", metadata.record_count));
    section.push_str(&format!(
        "- **Valid for Cost Analysis:** {}\n",
        metadata.valid_record_count
    ));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(options: &ReportOptions) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    if options.include_summary_cards {
        toc.push_str("- [Summary](#summary)\n");
    }
    toc.push_str("- [Cost Structure Analysis](#cost-structure-analysis)\n");
    toc.push_str("- [Medical Savings Distribution](#medical-savings-distribution)\n");
    toc.push_str("- [Savings Account Utilization](#savings-account-utilization)\n");
    toc.push_str("- [Savings to Cost Ratio](#savings-to-cost-ratio)\n");
    toc.push_str("- [Cost Efficiency Matrix](#cost-efficiency-matrix)\n");
    toc.push('\n');

    toc
}

/// Generate the average cost cards.
fn generate_summary_section(averages: &AverageCosts) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("Average monthly cost per member category across all schemes.\n\n");
    section.push_str("| Category | Average Monthly Cost |\n");
    section.push_str("|:---|---:|\n");
    for category in MemberCategory::ALL {
        section.push_str(&format!(
            "| {} | {} |\n",
            category,
            format_rand(averages.get(category))
        ));
    }
    section.push('\n');

    section
}

fn generate_cost_structure_section(breakdown: &CostBreakdown) -> String {
    let mut section = String::new();

    section.push_str("## Cost Structure Analysis\n\n");
    section.push_str(&format!(
        "Monthly cost breakdown by member type for the first {} schemes.\n\n",
        breakdown.entries.len()
    ));

    if breakdown.entries.is_empty() {
        section.push_str("No schemes to show.\n\n");
        return section;
    }

    section.push_str("| Scheme ID | Main Member | Adult Dependant | Child Dependant | Total |\n");
    section.push_str("|:---|---:|---:|---:|---:|\n");
    for entry in &breakdown.entries {
        section.push_str(&format!(
            "| {} | {} ({}) | {} ({}) | {} ({}) | {} |\n",
            entry.id,
            format_rand(entry.main),
            format_percent(entry.share_of_total(MemberCategory::Main)),
            format_rand(entry.adult),
            format_percent(entry.share_of_total(MemberCategory::Adult)),
            format_rand(entry.child),
            format_percent(entry.share_of_total(MemberCategory::Child)),
            format_rand(entry.total)
        ));
    }
    section.push('\n');
    section.push_str(&format!(
        "**Average Total Cost:** {}\n\n",
        format_rand(breakdown.average_total)
    ));

    section
}

fn generate_savings_distribution_section(distribution: &SavingsDistribution) -> String {
    let mut section = String::new();

    section.push_str("## Medical Savings Distribution\n\n");
    section.push_str("Average savings allocation across member types.\n\n");
    section.push_str("| Category | Average | Range | Share of Total |\n");
    section.push_str("|:---|---:|---:|---:|\n");
    for stat in &distribution.categories {
        section.push_str(&format!(
            "| {} | {} | {} - {} | {} |\n",
            stat.category,
            format_rand(stat.avg),
            format_rand(stat.min),
            format_rand(stat.max),
            format_percent(stat.share_of_total(distribution.total))
        ));
    }
    section.push('\n');
    section.push_str(&format!(
        "**Total Average Savings:** {}\n\n",
        format_rand(distribution.total)
    ));

    section
}

fn generate_utilization_section(nodes: &[SchemeNode]) -> String {
    let mut section = String::new();

    section.push_str("## Savings Account Utilization\n\n");

    if nodes.is_empty() {
        section.push_str("No valid data available for savings utilization analysis.\n\n");
        return section;
    }

    section.push_str("Cost distribution and savings percentage by scheme and member type.\n\n");
    section.push_str("| Scheme | Scheme Cost | Member Type | Monthly Cost | Savings |\n");
    section.push_str("|:---|---:|:---|---:|---:|\n");
    for node in nodes {
        let scheme_cost = format_rand(node.total_value());
        for child in &node.children {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                node.name,
                scheme_cost,
                child.name,
                format_rand(child.value),
                format_percent(child.savings_percentage)
            ));
        }
    }
    section.push('\n');

    section
}

fn generate_savings_ratio_section(dashboard: &Dashboard, options: &ReportOptions) -> String {
    let points: &[SavingsRatioPoint] = &dashboard.savings_ratio;
    let mut section = String::new();

    section.push_str("## Savings to Cost Ratio\n\n");

    if points.is_empty() {
        section.push_str("No schemes to show.\n\n");
        return section;
    }

    section.push_str("Relationship between total monthly cost and savings account.\n\n");
    section.push_str("| Scheme ID | Total Cost | Total Savings | Dependants | Savings Ratio |\n");
    section.push_str("|:---|---:|---:|:---:|---:|\n");
    for point in points.iter().take(options.max_table_rows) {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            point.id,
            format_rand(point.total_cost),
            format_rand(point.total_savings),
            point.dependent_count,
            format_percent(point.savings_ratio_percent())
        ));
    }
    section.push('\n');
    section.push_str(&truncation_note(points.len(), options.max_table_rows));
    section.push_str(&format!(
        "**Most Dependant Categories Covered:** {}\n\n",
        dashboard.max_dependent_count
    ));

    section
}

fn generate_efficiency_section(points: &[EfficiencyPoint], options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("## Cost Efficiency Matrix\n\n");

    if points.is_empty() {
        section.push_str("No valid data available for cost efficiency analysis.\n\n");
        return section;
    }

    section.push_str("Dependant cost ratios and savings efficiency per scheme.\n\n");
    section.push_str("| Scheme ID | Adult/Main Ratio | Child/Main Ratio | Total Cost | Savings |\n");
    section.push_str("|:---|---:|---:|---:|---:|\n");
    for point in points.iter().take(options.max_table_rows) {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            point.id,
            format_number(point.adult_main_ratio, 2),
            format_number(point.child_main_ratio, 2),
            format_rand(point.total_cost),
            format_percent(point.savings_percentage)
        ));
    }
    section.push('\n');
    section.push_str(&truncation_note(points.len(), options.max_table_rows));

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by ClaimCare v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
///
/// Non-finite numbers serialize as `null`.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
