//! Scheme aggregation and derived statistics.
//!
//! Every function here is a pure transform over a record snapshot. Nothing
//! is cached and nothing is mutated, so calling a function twice on the same
//! slice yields bit-identical output.
//!
//! Division policy differs per chart on purpose: averages divide by the full
//! record count and are NaN for an empty slice, per-category percentages and
//! cost ratios are guarded to `0.0`, and the savings ratio is left unguarded.

use crate::models::{
    AverageCosts, CategoryNode, ChartOptions, CostBreakdown, CostBreakdownEntry, Dashboard,
    EfficiencyPoint, MemberCategory, SavingsDistribution, SavingsRatioPoint, SavingsStat,
    SchemeNode, SchemeRecord,
};
use tracing::debug;

/// Arithmetic mean of `value` over all records. NaN when `records` is empty.
fn mean(records: &[SchemeRecord], value: impl Fn(&SchemeRecord) -> f64) -> f64 {
    let sum = records.iter().fold(0.0, |acc, r| acc + value(r));
    sum / records.len() as f64
}

/// Mean monthly cost per category over every record, zero-cost ones included.
pub fn average_costs(records: &[SchemeRecord]) -> AverageCosts {
    AverageCosts {
        main: mean(records, |r| r.main_cost),
        adult: mean(records, |r| r.adult_cost),
        child: mean(records, |r| r.child_cost),
    }
}

/// Cost split of the first `n` records in input order.
///
/// "Top" means first: records are never reordered by magnitude.
pub fn top_n_cost_breakdown(records: &[SchemeRecord], n: usize) -> CostBreakdown {
    let entries: Vec<CostBreakdownEntry> = records
        .iter()
        .take(n)
        .map(|r| CostBreakdownEntry {
            id: r.id,
            main: r.main_cost,
            adult: r.adult_cost,
            child: r.child_cost,
            total: r.total_cost(),
        })
        .collect();

    let average_total =
        entries.iter().fold(0.0, |acc, e| acc + e.total) / entries.len() as f64;

    CostBreakdown {
        entries,
        average_total,
    }
}

/// Average, minimum and maximum savings for each category.
///
/// An empty slice gives `avg = NaN`, `min = +inf` and `max = -inf`.
pub fn savings_distribution(records: &[SchemeRecord]) -> SavingsDistribution {
    let categories: Vec<SavingsStat> = MemberCategory::ALL
        .iter()
        .map(|&category| SavingsStat {
            category,
            avg: mean(records, |r| r.savings(category)),
            min: records
                .iter()
                .map(|r| r.savings(category))
                .fold(f64::INFINITY, f64::min),
            max: records
                .iter()
                .map(|r| r.savings(category))
                .fold(f64::NEG_INFINITY, f64::max),
        })
        .collect();

    let total = categories.iter().fold(0.0, |acc, s| acc + s.avg);

    SavingsDistribution { categories, total }
}

/// Treemap of cost and savings percentage for the first `n` valid schemes.
///
/// Only records with a positive main member cost are considered, and the
/// slice is taken after that filter. A category is kept only when its cost is
/// positive; a scheme left with no categories is dropped.
pub fn savings_utilization_tree(records: &[SchemeRecord], n: usize) -> Vec<SchemeNode> {
    records
        .iter()
        .filter(|r| r.is_valid_for_cost_analysis())
        .take(n)
        .map(|r| SchemeNode {
            id: r.id,
            name: format!("Scheme {}", r.id),
            children: MemberCategory::ALL
                .iter()
                .filter(|&&category| r.cost(category) > 0.0)
                .map(|&category| CategoryNode {
                    name: category.label().to_string(),
                    category,
                    value: r.cost(category),
                    savings_percentage: r.savings_percentage(category),
                })
                .collect(),
        })
        .filter(|node| !node.children.is_empty())
        .collect()
}

/// Total cost against total savings for every record.
pub fn savings_to_cost_ratio(records: &[SchemeRecord]) -> Vec<SavingsRatioPoint> {
    records
        .iter()
        .map(|r| {
            let total_cost = r.total_cost();
            let total_savings = r.total_savings();
            SavingsRatioPoint {
                id: r.id,
                total_cost,
                total_savings,
                dependent_count: r.dependent_count(),
                // Unguarded: zero total cost yields NaN or infinity.
                savings_ratio: total_savings / total_cost,
            }
        })
        .collect()
}

/// Largest dependant count among the points, `0` when there are none.
pub fn max_dependent_count(points: &[SavingsRatioPoint]) -> u8 {
    points.iter().map(|p| p.dependent_count).max().unwrap_or(0)
}

/// Dependant-to-main cost ratios and savings percentage of every valid scheme.
pub fn cost_efficiency_matrix(records: &[SchemeRecord]) -> Vec<EfficiencyPoint> {
    records
        .iter()
        .filter(|r| r.is_valid_for_cost_analysis())
        .map(|r| {
            let total_cost = r.total_cost();
            let total_savings = r.total_savings();
            let ratio_to_main = |cost: f64| {
                if r.main_cost != 0.0 {
                    cost / r.main_cost
                } else {
                    0.0
                }
            };

            EfficiencyPoint {
                id: r.id,
                adult_main_ratio: ratio_to_main(r.adult_cost),
                child_main_ratio: ratio_to_main(r.child_cost),
                total_cost,
                savings_percentage: if total_cost > 0.0 {
                    total_savings / total_cost * 100.0
                } else {
                    0.0
                },
            }
        })
        .filter(|p| p.total_cost > 0.0)
        .collect()
}

/// Run every aggregation over one snapshot.
pub fn build_dashboard(records: &[SchemeRecord], options: &ChartOptions) -> Dashboard {
    let valid_record_count = records
        .iter()
        .filter(|r| r.is_valid_for_cost_analysis())
        .count();

    debug!(
        "Aggregating {} records ({} valid for cost analysis)",
        records.len(),
        valid_record_count
    );

    let savings_ratio = savings_to_cost_ratio(records);
    let max_dependent_count = max_dependent_count(&savings_ratio);

    Dashboard {
        record_count: records.len(),
        valid_record_count,
        average_costs: average_costs(records),
        cost_breakdown: top_n_cost_breakdown(records, options.top_n),
        savings_distribution: savings_distribution(records),
        savings_utilization: savings_utilization_tree(records, options.utilization_top_n),
        savings_ratio,
        max_dependent_count,
        cost_efficiency: cost_efficiency_matrix(records),
    }
}
