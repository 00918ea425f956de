//! Columnar dataset transposition.
//!
//! The dataset is published as one JSON object per field, each mapping a
//! row index string to a value. This module turns that layout into a
//! sequence of [`SchemeRecord`]s and resolves absent values once, here.

use crate::loader::LoadError;
use crate::models::SchemeRecord;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One column of the dataset: row index string to raw value.
pub type Column = BTreeMap<String, Value>;

/// The dataset exactly as published.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnarDataset {
    #[serde(rename = "MedicalSchemeId", default)]
    pub scheme_id: Option<Column>,

    #[serde(rename = "TotalMonthlyCostMainMember", default)]
    pub main_cost: Option<Column>,

    #[serde(rename = "MedicalSavingsAccountMainMember", default)]
    pub main_savings: Option<Column>,

    #[serde(rename = "TotalMonthlyCostAdultDependant", default)]
    pub adult_cost: Option<Column>,

    #[serde(rename = "MedicalSavingsAccountAdultDependant", default)]
    pub adult_savings: Option<Column>,

    #[serde(rename = "TotalMonthlyCostChildDependant", default)]
    pub child_cost: Option<Column>,

    #[serde(rename = "MedicalSavingsAccountChildDependant", default)]
    pub child_savings: Option<Column>,
}

impl ColumnarDataset {
    /// Parse a columnar JSON document.
    pub fn from_json(content: &str) -> Result<Self, LoadError> {
        serde_json::from_str(content).map_err(LoadError::Parse)
    }

    /// Transpose the columns into one record per row.
    ///
    /// Rows are the keys of the `MedicalSchemeId` column. Array-index keys
    /// come first in numeric order, any other keys follow in lexical order.
    pub fn into_records(self) -> Result<Vec<SchemeRecord>, LoadError> {
        let ids = self
            .scheme_id
            .ok_or(LoadError::MissingColumn("MedicalSchemeId"))?;

        let main_cost = present_or_warn(self.main_cost, "TotalMonthlyCostMainMember");
        let main_savings = present_or_warn(self.main_savings, "MedicalSavingsAccountMainMember");
        let adult_cost = present_or_warn(self.adult_cost, "TotalMonthlyCostAdultDependant");
        let adult_savings =
            present_or_warn(self.adult_savings, "MedicalSavingsAccountAdultDependant");
        let child_cost = present_or_warn(self.child_cost, "TotalMonthlyCostChildDependant");
        let child_savings =
            present_or_warn(self.child_savings, "MedicalSavingsAccountChildDependant");

        let records: Vec<SchemeRecord> = ordered_row_keys(&ids)
            .into_iter()
            .map(|row| SchemeRecord {
                id: resolve_id(ids.get(row)),
                main_cost: resolve_number(main_cost.get(row)),
                adult_cost: resolve_number(adult_cost.get(row)),
                child_cost: resolve_number(child_cost.get(row)),
                main_savings: resolve_number(main_savings.get(row)),
                adult_savings: resolve_number(adult_savings.get(row)),
                child_savings: resolve_number(child_savings.get(row)),
            })
            .collect();

        debug!("Transposed {} rows from columnar dataset", records.len());
        Ok(records)
    }
}

fn present_or_warn(column: Option<Column>, name: &str) -> Column {
    column.unwrap_or_else(|| {
        warn!("Column {} is missing; treating its values as 0", name);
        Column::new()
    })
}

/// Keys that are canonical array indices, e.g. `"7"` but not `"07"`.
fn array_index(key: &str) -> Option<u32> {
    key.parse::<u32>()
        .ok()
        .filter(|index| index.to_string() == key)
}

fn ordered_row_keys(column: &Column) -> Vec<&String> {
    let mut keys: Vec<&String> = column.keys().collect();
    // BTreeMap order is lexical; the stable sort only lifts index keys.
    keys.sort_by_key(|key| match array_index(key) {
        Some(index) => (0, index),
        None => (1, 0),
    });
    keys
}

/// Resolve a raw value to a number; absent, null and non-numeric values become `0.0`.
fn resolve_number(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn resolve_id(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(value: Value) -> ColumnarDataset {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_transpose_rows() {
        let records = dataset(json!({
            "MedicalSchemeId": {"0": 11, "1": 12},
            "TotalMonthlyCostMainMember": {"0": 1000.0, "1": 0},
            "MedicalSavingsAccountMainMember": {"0": 100.0, "1": 0},
            "TotalMonthlyCostAdultDependant": {"0": 500, "1": 0},
            "MedicalSavingsAccountAdultDependant": {"0": 50, "1": 0},
            "TotalMonthlyCostChildDependant": {"0": 0, "1": 0},
            "MedicalSavingsAccountChildDependant": {"0": 0, "1": 0}
        }))
        .into_records()
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 11);
        assert_eq!(records[0].main_cost, 1000.0);
        assert_eq!(records[0].adult_savings, 50.0);
        assert_eq!(records[1].id, 12);
        assert_eq!(records[1].total_cost(), 0.0);
    }

    #[test]
    fn test_rows_follow_numeric_index_order() {
        let records = dataset(json!({
            "MedicalSchemeId": {"10": 3, "2": 2, "0": 1, "x": 5, "01": 4}
        }))
        .into_records()
        .unwrap();

        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_absent_values_resolve_to_zero() {
        let records = dataset(json!({
            "MedicalSchemeId": {"0": 1, "1": 2},
            "TotalMonthlyCostMainMember": {"0": null, "1": "1250.5"},
            "TotalMonthlyCostAdultDependant": {"1": "n/a"}
        }))
        .into_records()
        .unwrap();

        assert_eq!(records[0].main_cost, 0.0);
        assert_eq!(records[0].adult_cost, 0.0);
        assert_eq!(records[1].main_cost, 1250.5);
        assert_eq!(records[1].adult_cost, 0.0);
        assert_eq!(records[1].child_savings, 0.0);
    }

    #[test]
    fn test_missing_id_column() {
        let result = dataset(json!({
            "TotalMonthlyCostMainMember": {"0": 1000}
        }))
        .into_records();

        assert!(matches!(
            result,
            Err(LoadError::MissingColumn("MedicalSchemeId"))
        ));
    }

    #[test]
    fn test_id_resolution() {
        assert_eq!(resolve_id(Some(&json!(42))), 42);
        assert_eq!(resolve_id(Some(&json!(42.0))), 42);
        assert_eq!(resolve_id(Some(&json!("17"))), 17);
        assert_eq!(resolve_id(Some(&Value::Null)), 0);
        assert_eq!(resolve_id(None), 0);
    }

    #[test]
    fn test_non_finite_strings_rejected() {
        assert_eq!(resolve_number(Some(&json!("NaN"))), 0.0);
        assert_eq!(resolve_number(Some(&json!("inf"))), 0.0);
        assert_eq!(resolve_number(Some(&json!(" 12.5 "))), 12.5);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            ColumnarDataset::from_json("{not json"),
            Err(LoadError::Parse(_))
        ));
    }
}
