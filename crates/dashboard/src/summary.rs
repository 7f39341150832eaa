use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference links always exposed in the dashboard shell. Inherited fixed
/// list; override through `AggregateOptions` when needed.
pub const CANON_ANCHORS: [(&str, &str); 4] = [
    ("VDM-AX-A0…A7", "Derivation/AXIOMS.md#vdm-ax-a0"),
    ("VDM-E-033", "Derivation/EQUATIONS.md#vdm-e-033"),
    ("VDM-E-090", "Derivation/EQUATIONS.md#vdm-e-090"),
    (
        "VALIDATION_METRICS",
        "Derivation/VALIDATION_METRICS.md#kpi-front-speed-rel-err",
    ),
];

/// One roadmap spotlight entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpotlightCard {
    pub title: String,
    pub bucket: String,
    /// Sanitized repository-relative proposal path; empty when the supplied
    /// path failed sanitization.
    pub proposal_path: String,
    pub has_results: bool,
    /// Opaque results payload, carried through unchanged.
    pub results: Value,
}

/// A labeled link into a canon document, optionally carrying a `#anchor`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceLink {
    pub label: String,
    pub path: String,
}

/// Aggregated roadmap-index counters and display lists.
///
/// Rebuilt wholesale on every load attempt; a failed load leaves the default
/// all-zero, empty summary rather than stale data. Absent an explicit
/// `summary` override in the manifest, `total_proposals` equals
/// `proposals_missing_results + results_total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManifestSummary {
    pub pending_approvals: u64,
    pub orphan_proposals: u64,
    pub artifacts_total: u64,
    pub total_proposals: u64,
    pub proposals_missing_results: u64,
    pub results_total: u64,
    pub code_domains_tracked: u64,
    pub documentation_buckets: u64,
    pub repo_head: String,
    pub updated_utc: String,
    pub spotlight_cards: Vec<SpotlightCard>,
    pub reference_links: Vec<ReferenceLink>,
}
