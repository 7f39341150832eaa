use std::fs;
use std::path::Path;

use url::Url;

use nexus_paths::Resolver;

use crate::aggregate::{aggregate_manifest, AggregateOptions};
use crate::canon::{parse_canon_index, CanonSource};
use crate::error::{DashboardError, Result};
use crate::kpi::{parse_kpi_summary, KpiCard};
use crate::summary::ManifestSummary;

/// Change observer, invoked once after every load attempt.
pub type Observer = Box<dyn Fn(&ManifestSummary)>;

/// Owns the dashboard state and replaces it wholesale per load attempt.
///
/// Readers always observe either the previous complete state or the new one;
/// a failed load leaves defaults, never a partial result. Observers fire
/// exactly once per attempt, success or failure, so they can distinguish
/// stale good data from a confirmed empty state.
pub struct DashboardStore {
    resolver: Resolver,
    options: AggregateOptions,
    summary: ManifestSummary,
    kpi_cards: Vec<KpiCard>,
    canon_sources: Vec<CanonSource>,
    observers: Vec<Observer>,
}

impl DashboardStore {
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        Self::with_options(resolver, AggregateOptions::default())
    }

    #[must_use]
    pub fn with_options(resolver: Resolver, options: AggregateOptions) -> Self {
        Self {
            resolver,
            options,
            summary: ManifestSummary::default(),
            kpi_cards: Vec::new(),
            canon_sources: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Register a change observer.
    pub fn subscribe(&mut self, observer: impl Fn(&ManifestSummary) + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn summary(&self) -> &ManifestSummary {
        &self.summary
    }

    #[must_use]
    pub fn kpi_cards(&self) -> &[KpiCard] {
        &self.kpi_cards
    }

    #[must_use]
    pub fn canon_sources(&self) -> &[CanonSource] {
        &self.canon_sources
    }

    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Load the roadmap index, replacing the summary wholesale.
    ///
    /// `None` (or an empty path) resolves through the candidate precedence
    /// chain. The new summary is built completely before it is installed.
    pub fn load_index(&mut self, path: Option<&Path>) -> Result<()> {
        let path = match path {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => self.resolver.default_index_path(),
        };
        match read_bytes(&path).and_then(|bytes| aggregate_manifest(&bytes, &self.options)) {
            Ok(summary) => {
                self.summary = summary;
                self.notify();
                Ok(())
            }
            Err(err) => {
                log::warn!("roadmap index load failed for {}: {err}", path.display());
                self.summary = ManifestSummary::default();
                self.notify();
                Err(err)
            }
        }
    }

    /// Load the KPI gate summary, replacing the card list wholesale.
    pub fn load_kpi_summary(&mut self, path: &Path) -> Result<()> {
        match read_bytes(path).and_then(|bytes| parse_kpi_summary(&bytes)) {
            Ok(cards) => {
                self.kpi_cards = cards;
                self.notify();
                Ok(())
            }
            Err(err) => {
                log::warn!("KPI summary load failed for {}: {err}", path.display());
                self.kpi_cards.clear();
                self.notify();
                Err(err)
            }
        }
    }

    /// Load the canon provenance index, replacing the source rows wholesale.
    pub fn load_canon_index(&mut self, path: &Path) -> Result<()> {
        match read_bytes(path).and_then(|bytes| parse_canon_index(&bytes)) {
            Ok(sources) => {
                self.canon_sources = sources;
                self.notify();
                Ok(())
            }
            Err(err) => {
                log::warn!("canon index load failed for {}: {err}", path.display());
                self.canon_sources.clear();
                self.notify();
                Err(err)
            }
        }
    }

    /// Resolve a repository-relative document path to a `file://` URL for
    /// opening canon documents.
    pub fn document_url(&self, raw: &str) -> Result<Url> {
        Ok(self.resolver.resolve_to_file_url(raw)?)
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer(&self.summary);
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(DashboardError::ManifestNotFound(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| DashboardError::ManifestUnreadable {
        path: path.to_path_buf(),
        source,
    })
}
