use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::resource::record::scalar_to_string;
use crate::resource::ManagedRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
}

impl FacetOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

pub fn status_options() -> Vec<FacetOption> {
    vec![FacetOption::new("0", "Active"), FacetOption::new("1", "Inactive")]
}

/// `0`/`1` form of a stored status flag; stores hand back either digits or booleans
pub fn canonical_status(raw: &str) -> Option<&'static str> {
    match raw.trim() {
        "0" | "false" => Some("0"),
        "1" | "true" => Some("1"),
        _ => None,
    }
}

fn field_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

/// Distinct values of `field` across the loaded rows, in first-seen order.
/// Array-valued fields contribute each element.
pub fn derive_facets(records: &[ManagedRecord], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| record.get(field))
        .flat_map(|value| field_values(&value))
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Whether `record` carries `value` in `field` (membership for arrays)
pub fn has_value(record: &ManagedRecord, field: &str, value: &str) -> bool {
    record
        .get(field)
        .map(|v| field_values(&v).iter().any(|candidate| candidate == value))
        .unwrap_or(false)
}
