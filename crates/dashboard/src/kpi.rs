use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::string_field;
use crate::error::{DashboardError, Result};

/// One validation gate from the KPI summary document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KpiCard {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub comparator: String,
    pub threshold: f64,
    pub definition_path: String,
    pub pass: bool,
}

/// Parse a KPI summary: a JSON array of gate objects with `value`,
/// `comparator` (`">="` or `"<="`), and `threshold` fields. Non-object rows
/// are skipped; anything else non-array is malformed.
pub fn parse_kpi_summary(bytes: &[u8]) -> Result<Vec<KpiCard>> {
    let doc: Value = serde_json::from_slice(bytes)
        .map_err(|e| DashboardError::ManifestMalformed(e.to_string()))?;
    let rows = doc.as_array().ok_or_else(|| {
        DashboardError::ManifestMalformed("KPI summary is not an array".to_string())
    })?;

    let mut cards = Vec::with_capacity(rows.len());
    for entry in rows {
        let Some(object) = entry.as_object() else {
            continue;
        };
        let value = object
            .get("value")
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN);
        let threshold = object
            .get("threshold")
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN);
        let comparator = string_field(object, "comparator");
        // NaN comparisons are false, so missing numbers cannot pass a gate.
        let pass = match comparator.as_str() {
            ">=" => value >= threshold,
            "<=" => value <= threshold,
            _ => false,
        };
        cards.push(KpiCard {
            id: string_field(object, "id"),
            label: string_field(object, "label"),
            value,
            comparator,
            threshold,
            definition_path: string_field(object, "definition_path"),
            pass,
        });
    }
    Ok(cards)
}
