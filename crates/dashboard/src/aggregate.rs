use std::collections::HashSet;

use serde_json::{Map, Value};

use nexus_paths::sanitize_relative_path;

use crate::error::{DashboardError, Result};
use crate::summary::{ManifestSummary, ReferenceLink, SpotlightCard, CANON_ANCHORS};

/// Aggregation knobs. The canonical anchor list is an inherited default with
/// no deeper policy behind it, so it stays overridable.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub canon_anchors: Vec<ReferenceLink>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            canon_anchors: CANON_ANCHORS
                .iter()
                .map(|(label, path)| ReferenceLink {
                    label: (*label).to_string(),
                    path: (*path).to_string(),
                })
                .collect(),
        }
    }
}

/// Build a fresh summary from raw manifest bytes.
///
/// The manifest schema is informal, so the walk is tolerant: wrong-typed
/// sections count as absent rather than failing the whole parse. Only a
/// document whose root is not a JSON object is malformed.
pub fn aggregate_manifest(bytes: &[u8], options: &AggregateOptions) -> Result<ManifestSummary> {
    let doc: Value = serde_json::from_slice(bytes)
        .map_err(|e| DashboardError::ManifestMalformed(e.to_string()))?;
    let root = doc
        .as_object()
        .ok_or_else(|| DashboardError::ManifestMalformed("root is not an object".to_string()))?;

    let mut summary = ManifestSummary::default();

    if let Some(head) = root.get("repo_head").and_then(Value::as_str) {
        summary.repo_head = head.to_string();
    }
    if let Some(updated) = root.get("updated_utc").and_then(Value::as_str) {
        summary.updated_utc = updated.to_string();
    }

    let mut pending = 0u64;
    let mut artifacts = 0u64;
    let mut domains = 0u64;

    if let Some(code_domains) = root.get("code_domains").and_then(Value::as_array) {
        for entry in code_domains {
            let Some(domain) = entry.as_object() else {
                continue;
            };
            domains += 1;

            let approvals = domain.get("approvals");
            let allowed = approvals
                .and_then(|a| a.get("allowed_tags"))
                .and_then(Value::as_array);
            let approved_map = approvals
                .and_then(|a| a.get("approvals"))
                .and_then(Value::as_object);
            if let Some(allowed) = allowed {
                for tag in allowed {
                    let meta = tag
                        .as_str()
                        .and_then(|t| approved_map.and_then(|m| m.get(t)));
                    if !is_approved(meta) {
                        pending += 1;
                    }
                }
            }

            let outputs = domain.get("outputs");
            artifacts += count_field(outputs, "logs_total");
            artifacts += count_field(outputs, "figures_total");
        }
    }

    let mut orphan = 0u64;
    let mut results = 0u64;
    if let Some(rows) = root.get("proposal_status").and_then(Value::as_array) {
        for entry in rows {
            let Some(row) = entry.as_object() else {
                continue;
            };
            let has_results = row
                .get("has_results")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if has_results {
                results += 1;
            } else {
                orphan += 1;
            }
        }
    }

    summary.pending_approvals = pending;
    summary.orphan_proposals = orphan;
    summary.artifacts_total = artifacts;
    summary.total_proposals = orphan + results;
    summary.proposals_missing_results = orphan;
    summary.results_total = results;
    summary.code_domains_tracked = domains;

    // A supplied summary block is authoritative, field by field.
    if let Some(block) = root.get("summary").and_then(Value::as_object) {
        summary.total_proposals = u64_field(block, "proposals_total", summary.total_proposals);
        summary.proposals_missing_results = u64_field(
            block,
            "proposals_missing_results",
            summary.proposals_missing_results,
        );
        summary.results_total = u64_field(block, "results_total", summary.results_total);
        summary.code_domains_tracked =
            u64_field(block, "code_domains", summary.code_domains_tracked);
        summary.documentation_buckets =
            u64_field(block, "doc_buckets", summary.documentation_buckets);
    }

    if let Some(buckets) = root.get("doc_buckets").and_then(Value::as_array) {
        summary.documentation_buckets = buckets.len() as u64;
    }

    if let Some(cards) = root.get("spotlight_cards").and_then(Value::as_array) {
        summary.spotlight_cards = make_spotlight_cards(cards);
    }

    if let Some(references) = root.get("references").and_then(Value::as_object) {
        summary.reference_links = make_reference_links(references, &options.canon_anchors);
    }

    Ok(summary)
}

// Approved means a non-empty string `approved_at`; every other shape fails
// closed and counts toward pending.
fn is_approved(meta: Option<&Value>) -> bool {
    meta.and_then(|m| m.get("approved_at"))
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

fn count_field(container: Option<&Value>, key: &str) -> u64 {
    container
        .and_then(|c| c.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn u64_field(object: &Map<String, Value>, key: &str, default: u64) -> u64 {
    object.get(key).and_then(Value::as_u64).unwrap_or(default)
}

pub(crate) fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn make_spotlight_cards(cards: &[Value]) -> Vec<SpotlightCard> {
    let mut result = Vec::with_capacity(cards.len());
    for value in cards {
        let Some(object) = value.as_object() else {
            continue;
        };
        let proposal = object
            .get("proposal_path")
            .and_then(Value::as_str)
            .unwrap_or("");
        result.push(SpotlightCard {
            title: string_field(object, "title"),
            bucket: string_field(object, "bucket"),
            proposal_path: sanitize_relative_path(proposal).unwrap_or_default(),
            has_results: object
                .get("has_results")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            results: object.get("results").cloned().unwrap_or(Value::Null),
        });
    }
    result
}

fn make_reference_links(
    references: &Map<String, Value>,
    canon_anchors: &[ReferenceLink],
) -> Vec<ReferenceLink> {
    let mut result = Vec::with_capacity(references.len() + canon_anchors.len());
    let mut labels: HashSet<&str> = HashSet::new();

    for (label, value) in references {
        let Some(raw) = value.as_str() else {
            continue;
        };
        let Some(path) = sanitize_relative_path(raw) else {
            continue;
        };
        if !labels.insert(label.as_str()) {
            continue;
        }
        result.push(ReferenceLink {
            label: label.clone(),
            path,
        });
    }

    for anchor in canon_anchors {
        if !labels.insert(anchor.label.as_str()) {
            continue;
        }
        result.push(anchor.clone());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::{aggregate_manifest, AggregateOptions};
    use crate::error::DashboardError;
    use crate::summary::CANON_ANCHORS;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn aggregate(doc: serde_json::Value) -> crate::summary::ManifestSummary {
        aggregate_manifest(doc.to_string().as_bytes(), &AggregateOptions::default()).unwrap()
    }

    #[test]
    fn unapproved_tags_count_as_pending() {
        let summary = aggregate(json!({
            "code_domains": [{
                "approvals": {
                    "allowed_tags": ["t1", "t2"],
                    "approvals": {
                        "t1": {"approved_at": "2024-01-01T00:00:00Z"}
                    }
                }
            }]
        }));
        assert_eq!(summary.pending_approvals, 1);
        assert_eq!(summary.code_domains_tracked, 1);
    }

    #[test]
    fn malformed_approval_shapes_fail_closed() {
        let summary = aggregate(json!({
            "code_domains": [{
                "approvals": {
                    "allowed_tags": ["a", "b", "c", "d"],
                    "approvals": {
                        "a": {"approved_at": "   "},
                        "b": {"approved_at": true},
                        "c": {},
                        // "d" has no metadata at all
                    }
                }
            }]
        }));
        assert_eq!(summary.pending_approvals, 4);
    }

    #[test]
    fn artifact_totals_accumulate_across_domains() {
        let summary = aggregate(json!({
            "code_domains": [
                {"outputs": {"logs_total": 3, "figures_total": 2}},
                {"outputs": {"logs_total": 1}},
                {"outputs": {"logs_total": "not-a-number"}},
                {}
            ]
        }));
        assert_eq!(summary.artifacts_total, 6);
        assert_eq!(summary.code_domains_tracked, 4);
    }

    #[test]
    fn proposal_rows_split_into_results_and_orphans() {
        let summary = aggregate(json!({
            "proposal_status": [
                {"has_results": true},
                {"has_results": false},
                {"has_results": "yes"},
                {}
            ]
        }));
        assert_eq!(summary.results_total, 1);
        assert_eq!(summary.orphan_proposals, 3);
        assert_eq!(summary.proposals_missing_results, 3);
        assert_eq!(
            summary.total_proposals,
            summary.proposals_missing_results + summary.results_total
        );
    }

    #[test]
    fn summary_block_overrides_derived_counts() {
        let summary = aggregate(json!({
            "proposal_status": [{"has_results": true}],
            "summary": {
                "proposals_total": 40,
                "proposals_missing_results": 12,
                "results_total": 28,
                "code_domains": 7,
                "doc_buckets": 5
            }
        }));
        assert_eq!(summary.total_proposals, 40);
        assert_eq!(summary.proposals_missing_results, 12);
        assert_eq!(summary.results_total, 28);
        assert_eq!(summary.code_domains_tracked, 7);
        assert_eq!(summary.documentation_buckets, 5);
        // Orphans stay locally derived even under an override.
        assert_eq!(summary.orphan_proposals, 0);
    }

    #[test]
    fn sparse_summary_block_keeps_derived_values() {
        let summary = aggregate(json!({
            "proposal_status": [{"has_results": true}, {}],
            "summary": {"code_domains": 3}
        }));
        assert_eq!(summary.total_proposals, 2);
        assert_eq!(summary.results_total, 1);
        assert_eq!(summary.code_domains_tracked, 3);
    }

    #[test]
    fn doc_buckets_array_length_wins() {
        let summary = aggregate(json!({
            "summary": {"doc_buckets": 9},
            "doc_buckets": [{"name": "derivation"}, {"name": "reports"}]
        }));
        assert_eq!(summary.documentation_buckets, 2);
    }

    #[test]
    fn spotlight_cards_sanitize_paths_and_skip_non_objects() {
        let summary = aggregate(json!({
            "spotlight_cards": [
                {
                    "title": "Front speed",
                    "bucket": "physics",
                    "proposal_path": "proposals/./front/../front_speed.md",
                    "has_results": true,
                    "results": {"metric": 0.97}
                },
                "not-an-object",
                {"title": "Escapee", "proposal_path": "../../etc/passwd"}
            ]
        }));
        assert_eq!(summary.spotlight_cards.len(), 2);
        assert_eq!(
            summary.spotlight_cards[0].proposal_path,
            "proposals/front_speed.md"
        );
        assert!(summary.spotlight_cards[0].has_results);
        assert_eq!(
            summary.spotlight_cards[0].results,
            serde_json::json!({"metric": 0.97})
        );
        assert_eq!(summary.spotlight_cards[1].proposal_path, "");
        assert!(!summary.spotlight_cards[1].has_results);
    }

    #[test]
    fn references_keep_first_label_and_append_missing_anchors() {
        let summary = aggregate(json!({
            "references": {"Foo": "Derivation/FOO.md"}
        }));
        let labels: Vec<&str> = summary
            .reference_links
            .iter()
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Foo",
                CANON_ANCHORS[0].0,
                CANON_ANCHORS[1].0,
                CANON_ANCHORS[2].0,
                CANON_ANCHORS[3].0,
            ]
        );
        assert_eq!(labels.iter().filter(|l| **l == "Foo").count(), 1);
    }

    #[test]
    fn supplied_reference_suppresses_matching_anchor() {
        let summary = aggregate(json!({
            "references": {"VDM-E-033": "Derivation/EQUATIONS.md#custom"}
        }));
        let hits: Vec<_> = summary
            .reference_links
            .iter()
            .filter(|l| l.label == "VDM-E-033")
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "Derivation/EQUATIONS.md#custom");
    }

    #[test]
    fn unsanitizable_references_are_dropped() {
        let summary = aggregate(json!({
            "references": {
                "Evil": "../secrets.md",
                "Remote": "qrc:/x",
                "Numeric": 12
            }
        }));
        assert_eq!(summary.reference_links.len(), CANON_ANCHORS.len());
    }

    #[test]
    fn absent_references_object_yields_no_links() {
        let summary = aggregate(json!({}));
        assert!(summary.reference_links.is_empty());
    }

    #[test]
    fn header_strings_require_string_type() {
        let summary = aggregate(json!({
            "repo_head": 42,
            "updated_utc": "2025-06-01T12:00:00Z"
        }));
        assert_eq!(summary.repo_head, "");
        assert_eq!(summary.updated_utc, "2025-06-01T12:00:00Z");
    }

    #[test]
    fn non_object_root_is_malformed() {
        let err =
            aggregate_manifest(b"[1, 2, 3]", &AggregateOptions::default()).unwrap_err();
        assert!(matches!(err, DashboardError::ManifestMalformed(_)));

        let err = aggregate_manifest(b"{not json", &AggregateOptions::default()).unwrap_err();
        assert!(matches!(err, DashboardError::ManifestMalformed(_)));
    }

    #[test]
    fn wrong_typed_sections_count_as_absent() {
        let summary = aggregate(json!({
            "code_domains": "nope",
            "proposal_status": {"also": "nope"},
            "spotlight_cards": 7
        }));
        assert_eq!(summary, crate::summary::ManifestSummary::default());
    }

    #[test]
    fn parsing_is_idempotent() {
        let bytes = json!({
            "repo_head": "abc123",
            "code_domains": [{"approvals": {"allowed_tags": ["t"], "approvals": {}}}],
            "proposal_status": [{"has_results": true}],
            "references": {"Foo": "Derivation/FOO.md"}
        })
        .to_string();
        let first = aggregate_manifest(bytes.as_bytes(), &AggregateOptions::default()).unwrap();
        let second = aggregate_manifest(bytes.as_bytes(), &AggregateOptions::default()).unwrap();
        assert_eq!(first, second);
    }
}
