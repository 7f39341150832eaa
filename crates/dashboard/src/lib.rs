//! # Nexus Dashboard
//!
//! Roadmap-index aggregation for the dashboard shell.
//!
//! ```text
//! roadmap-index JSON
//!     │
//!     ├──> aggregate (counters, spotlight cards, reference links)
//!     │
//!     └──> DashboardStore (copy-and-swap state, change observers)
//!            └─> UI bindings / CLI output
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use nexus_dashboard::DashboardStore;
//! use nexus_paths::Resolver;
//!
//! let mut store = DashboardStore::new(Resolver::default());
//! store.subscribe(|summary| {
//!     println!("{} proposals tracked", summary.total_proposals);
//! });
//! store.load_index(None)?;
//! # Ok::<(), nexus_dashboard::DashboardError>(())
//! ```

mod aggregate;
mod canon;
mod error;
mod kpi;
mod store;
mod summary;

pub use aggregate::{aggregate_manifest, AggregateOptions};
pub use canon::{parse_canon_index, CanonSource};
pub use error::{DashboardError, Result};
pub use kpi::{parse_kpi_summary, KpiCard};
pub use store::{DashboardStore, Observer};
pub use summary::{ManifestSummary, ReferenceLink, SpotlightCard, CANON_ANCHORS};
