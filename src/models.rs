//! Data models for the scheme analytics.
//!
//! This module contains the scheme records loaded from the dataset, the
//! derived metric shapes each chart consumes, and the report envelope.
//!
//! Only the input side (`SchemeRecord`, `MemberCategory`) deserializes. The
//! chart shapes and the report are serialize-only: non-finite values are
//! written as `null` and could not be read back as `f64`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Member category covered by a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberCategory {
    /// Primary insurance holder
    Main,
    /// Spouse or adult family member
    Adult,
    /// Dependant under 21
    Child,
}

impl MemberCategory {
    /// All categories in display order.
    pub const ALL: [MemberCategory; 3] = [
        MemberCategory::Main,
        MemberCategory::Adult,
        MemberCategory::Child,
    ];

    /// Returns the human-readable label of the category.
    pub fn label(&self) -> &'static str {
        match self {
            MemberCategory::Main => "Main Member",
            MemberCategory::Adult => "Adult Dependant",
            MemberCategory::Child => "Child Dependant",
        }
    }
}

impl fmt::Display for MemberCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One medical scheme with monthly cost and savings per member category.
///
/// Absent values in the source document are resolved to `0.0` by the loader,
/// so every field here is always present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeRecord {
    /// Scheme identifier (not guaranteed unique or ordered).
    pub id: i64,
    /// Monthly cost for the main member.
    pub main_cost: f64,
    /// Monthly cost for an adult dependant.
    pub adult_cost: f64,
    /// Monthly cost for a child dependant.
    pub child_cost: f64,
    /// Monthly savings-account allocation for the main member.
    pub main_savings: f64,
    /// Monthly savings-account allocation for an adult dependant.
    pub adult_savings: f64,
    /// Monthly savings-account allocation for a child dependant.
    pub child_savings: f64,
}

impl SchemeRecord {
    /// Monthly cost for a member category.
    pub fn cost(&self, category: MemberCategory) -> f64 {
        match category {
            MemberCategory::Main => self.main_cost,
            MemberCategory::Adult => self.adult_cost,
            MemberCategory::Child => self.child_cost,
        }
    }

    /// Monthly savings allocation for a member category.
    pub fn savings(&self, category: MemberCategory) -> f64 {
        match category {
            MemberCategory::Main => self.main_savings,
            MemberCategory::Adult => self.adult_savings,
            MemberCategory::Child => self.child_savings,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.main_cost + self.adult_cost + self.child_cost
    }

    pub fn total_savings(&self) -> f64 {
        self.main_savings + self.adult_savings + self.child_savings
    }

    /// Whether the record takes part in ratio and efficiency analysis.
    pub fn is_valid_for_cost_analysis(&self) -> bool {
        self.main_cost > 0.0
    }

    /// Number of dependant categories (adult, child) with a positive cost.
    pub fn dependent_count(&self) -> u8 {
        u8::from(self.adult_cost > 0.0) + u8::from(self.child_cost > 0.0)
    }

    /// Savings as a percentage of cost for a category, `0.0` when the cost is zero.
    pub fn savings_percentage(&self, category: MemberCategory) -> f64 {
        let cost = self.cost(category);
        if cost != 0.0 {
            self.savings(category) / cost * 100.0
        } else {
            0.0
        }
    }
}

/// Mean monthly cost per member category over all records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageCosts {
    pub main: f64,
    pub adult: f64,
    pub child: f64,
}

impl AverageCosts {
    pub fn get(&self, category: MemberCategory) -> f64 {
        match category {
            MemberCategory::Main => self.main,
            MemberCategory::Adult => self.adult,
            MemberCategory::Child => self.child,
        }
    }
}

/// Per-scheme cost split used by the cost structure chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdownEntry {
    pub id: i64,
    pub main: f64,
    pub adult: f64,
    pub child: f64,
    pub total: f64,
}

impl CostBreakdownEntry {
    pub fn get(&self, category: MemberCategory) -> f64 {
        match category {
            MemberCategory::Main => self.main,
            MemberCategory::Adult => self.adult,
            MemberCategory::Child => self.child,
        }
    }

    /// Share of the entry total taken by one category, as a percentage.
    pub fn share_of_total(&self, category: MemberCategory) -> f64 {
        self.get(category) / self.total * 100.0
    }
}

/// The first N schemes' cost split plus the average total over that slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub entries: Vec<CostBreakdownEntry>,
    /// Reference baseline; NaN when the slice is empty.
    pub average_total: f64,
}

/// Savings statistics for one member category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsStat {
    pub category: MemberCategory,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl SavingsStat {
    /// Share of the summed category averages taken by this category, as a percentage.
    pub fn share_of_total(&self, total: f64) -> f64 {
        self.avg / total * 100.0
    }
}

/// Savings statistics for all categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsDistribution {
    pub categories: Vec<SavingsStat>,
    /// Sum of the three category averages.
    pub total: f64,
}

/// Leaf of the savings utilization tree: one member category of a scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub name: String,
    pub category: MemberCategory,
    /// Monthly cost of the category.
    pub value: f64,
    pub savings_percentage: f64,
}

/// Parent node of the savings utilization tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemeNode {
    pub id: i64,
    pub name: String,
    pub children: Vec<CategoryNode>,
}

impl SchemeNode {
    /// Summed cost of all retained categories.
    pub fn total_value(&self) -> f64 {
        self.children.iter().map(|c| c.value).sum()
    }
}

/// Point of the savings-to-cost scatter chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsRatioPoint {
    pub id: i64,
    pub total_cost: f64,
    pub total_savings: f64,
    /// Count of dependant categories present (0, 1 or 2), not a head count.
    pub dependent_count: u8,
    /// Unguarded: NaN or infinite when `total_cost` is zero.
    pub savings_ratio: f64,
}

impl SavingsRatioPoint {
    pub fn savings_ratio_percent(&self) -> f64 {
        self.savings_ratio * 100.0
    }
}

/// Point of the cost efficiency matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyPoint {
    pub id: i64,
    pub adult_main_ratio: f64,
    pub child_main_ratio: f64,
    pub total_cost: f64,
    pub savings_percentage: f64,
}

/// Slice sizes for the charts that only show the first schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    /// Schemes in the cost structure chart.
    pub top_n: usize,
    /// Valid schemes in the savings utilization tree.
    pub utilization_top_n: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            utilization_top_n: 10,
        }
    }
}

/// Every chart's derived data computed from one record snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Number of records in the snapshot.
    pub record_count: usize,
    /// Records with a positive main member cost.
    pub valid_record_count: usize,
    pub average_costs: AverageCosts,
    pub cost_breakdown: CostBreakdown,
    pub savings_distribution: SavingsDistribution,
    pub savings_utilization: Vec<SchemeNode>,
    pub savings_ratio: Vec<SavingsRatioPoint>,
    /// Largest dependant count among the savings ratio points.
    pub max_dependent_count: u8,
    pub cost_efficiency: Vec<EfficiencyPoint>,
}

/// Metadata about the generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path or URL the dataset was loaded from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of records loaded.
    pub record_count: usize,
    /// Records with a positive main member cost.
    pub valid_record_count: usize,
    /// Time spent loading and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// The complete analytics report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub dashboard: Dashboard,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SchemeRecord {
        SchemeRecord {
            id: 7,
            main_cost: 1000.0,
            adult_cost: 500.0,
            child_cost: 0.0,
            main_savings: 100.0,
            adult_savings: 50.0,
            child_savings: 0.0,
        }
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(MemberCategory::Main.to_string(), "Main Member");
        assert_eq!(MemberCategory::Adult.label(), "Adult Dependant");
        assert_eq!(MemberCategory::Child.label(), "Child Dependant");
    }

    #[test]
    fn test_record_totals() {
        let r = record();
        assert_eq!(r.total_cost(), 1500.0);
        assert_eq!(r.total_savings(), 150.0);
        assert_eq!(r.cost(MemberCategory::Adult), 500.0);
        assert_eq!(r.savings(MemberCategory::Main), 100.0);
    }

    #[test]
    fn test_dependent_count_is_category_presence() {
        let mut r = record();
        assert_eq!(r.dependent_count(), 1);

        r.child_cost = 12_345.0;
        assert_eq!(r.dependent_count(), 2);

        r.adult_cost = 0.0;
        r.child_cost = 0.0;
        assert_eq!(r.dependent_count(), 0);
    }

    #[test]
    fn test_savings_percentage_guarded() {
        let r = record();
        assert_eq!(r.savings_percentage(MemberCategory::Main), 10.0);
        assert_eq!(r.savings_percentage(MemberCategory::Child), 0.0);
    }

    #[test]
    fn test_validity() {
        let mut r = record();
        assert!(r.is_valid_for_cost_analysis());
        r.main_cost = 0.0;
        assert!(!r.is_valid_for_cost_analysis());
    }

    #[test]
    fn test_share_of_total() {
        let entry = CostBreakdownEntry {
            id: 1,
            main: 600.0,
            adult: 300.0,
            child: 100.0,
            total: 1000.0,
        };
        assert_eq!(entry.share_of_total(MemberCategory::Main), 60.0);
        assert_eq!(entry.share_of_total(MemberCategory::Child), 10.0);

        let stat = SavingsStat {
            category: MemberCategory::Adult,
            avg: 25.0,
            min: 0.0,
            max: 50.0,
        };
        assert_eq!(stat.share_of_total(100.0), 25.0);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_string(&record()).unwrap();
        assert!(json.contains("\"mainCost\""));
        assert!(json.contains("\"childSavings\""));
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let point = SavingsRatioPoint {
            id: 2,
            total_cost: 0.0,
            total_savings: 0.0,
            dependent_count: 0,
            savings_ratio: f64::NAN,
        };
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"savingsRatio\":null"));
        assert!(json.contains("\"dependentCount\":0"));
    }
}
