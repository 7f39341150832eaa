use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::string_field;
use crate::error::{DashboardError, Result};

/// Provenance row for one canon reference document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonSource {
    pub label: String,
    pub last_commit: String,
    pub sha256: String,
    pub path: String,
}

// Display order is fixed regardless of input key order.
const CANON_KEYS: [(&str, &str); 3] = [
    ("equations_md", "EQUATIONS.md"),
    ("axioms_md", "AXIOMS.md"),
    ("valid_metrics_md", "VALIDATION_METRICS.md"),
];

/// Parse a canon provenance index: an object keyed by document slot, each
/// slot holding `last_commit`, `sha256`, and `path` strings. Missing or empty
/// slots are skipped.
pub fn parse_canon_index(bytes: &[u8]) -> Result<Vec<CanonSource>> {
    let doc: Value = serde_json::from_slice(bytes)
        .map_err(|e| DashboardError::ManifestMalformed(e.to_string()))?;
    let root = doc.as_object().ok_or_else(|| {
        DashboardError::ManifestMalformed("canon index is not an object".to_string())
    })?;

    let mut sources = Vec::with_capacity(CANON_KEYS.len());
    for (key, label) in CANON_KEYS {
        let Some(entry) = root.get(key).and_then(Value::as_object) else {
            continue;
        };
        if entry.is_empty() {
            continue;
        }
        sources.push(CanonSource {
            label: label.to_string(),
            last_commit: string_field(entry, "last_commit"),
            sha256: string_field(entry, "sha256"),
            path: string_field(entry, "path"),
        });
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::parse_canon_index;
    use crate::error::DashboardError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn rows_follow_the_fixed_document_order() {
        let bytes = json!({
            "valid_metrics_md": {"last_commit": "c3", "sha256": "s3", "path": "Derivation/VALIDATION_METRICS.md"},
            "axioms_md": {"last_commit": "c2", "sha256": "s2", "path": "Derivation/AXIOMS.md"},
            "equations_md": {"last_commit": "c1", "sha256": "s1", "path": "Derivation/EQUATIONS.md"}
        })
        .to_string();
        let sources = parse_canon_index(bytes.as_bytes()).unwrap();
        let labels: Vec<&str> = sources.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["EQUATIONS.md", "AXIOMS.md", "VALIDATION_METRICS.md"]
        );
        assert_eq!(sources[0].last_commit, "c1");
    }

    #[test]
    fn missing_and_empty_slots_are_skipped() {
        let bytes = json!({
            "equations_md": {},
            "axioms_md": {"last_commit": "c2", "sha256": "s2", "path": "Derivation/AXIOMS.md"}
        })
        .to_string();
        let sources = parse_canon_index(bytes.as_bytes()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].label, "AXIOMS.md");
    }

    #[test]
    fn non_object_document_is_malformed() {
        let err = parse_canon_index(b"[]").unwrap_err();
        assert!(matches!(err, DashboardError::ManifestMalformed(_)));
    }
}
