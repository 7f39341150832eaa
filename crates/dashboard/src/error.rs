use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Failures from loading roadmap data. All of these are recovered locally:
/// the affected state is reset to defaults and observers are still notified.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("manifest unreadable: {path}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest malformed: {0}")]
    ManifestMalformed(String),

    #[error(transparent)]
    Path(#[from] nexus_paths::PathError),
}
