use std::env;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{PathError, Result};
use crate::sanitize::{sanitize_relative_path, split_fragment};

/// Relative location of the roadmap-index manifest inside a repository checkout.
pub const DEFAULT_INDEX_REL: &str = "VDM_Nexus/reports/nexus-roadmap-index.v1.json";

/// Upper bound on the upward ancestor walk. Inherited default with no deeper
/// policy behind it; override through [`ResolverConfig`] when needed.
pub const DEFAULT_MAX_ASCENT: usize = 8;

/// Resolution inputs, passed in explicitly so the resolver never consults the
/// process environment itself.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Explicit repository root, consulted before the working directory and
    /// the executable's own directory.
    pub override_root: Option<PathBuf>,
    /// Manifest location relative to a repository root.
    pub index_rel: PathBuf,
    /// How many ancestor directories a search may climb.
    pub max_ascent: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            override_root: None,
            index_rel: PathBuf::from(DEFAULT_INDEX_REL),
            max_ascent: DEFAULT_MAX_ASCENT,
        }
    }
}

/// Locates the roadmap-index manifest and turns sanitized relative paths into
/// local file URLs, defending against traversal and symlink escapes.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl Resolver {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Candidate base locations in precedence order: override root, process
    /// working directory, executable directory.
    fn base_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(root) = &self.config.override_root {
            candidates.push(root.clone());
        }
        if let Ok(cwd) = env::current_dir() {
            candidates.push(cwd);
        }
        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.to_path_buf());
            }
        }
        candidates
    }

    /// First manifest hit across the candidate precedence chain.
    #[must_use]
    pub fn resolve_index(&self) -> Option<PathBuf> {
        let found = self
            .base_candidates()
            .iter()
            .find_map(|base| self.resolve_index_from(base));
        if found.is_none() {
            log::debug!(
                "roadmap index {} not found under any candidate base",
                self.config.index_rel.display()
            );
        }
        found
    }

    /// Default manifest location for load attempts.
    ///
    /// Falls back to the working-directory join even when the manifest is
    /// missing, so callers still get a deterministic path whose load then
    /// fails cleanly.
    #[must_use]
    pub fn default_index_path(&self) -> PathBuf {
        if let Some(found) = self.resolve_index() {
            return found;
        }
        env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&self.config.index_rel)
    }

    /// Locate the manifest from one base location by climbing ancestors.
    fn resolve_index_from(&self, base: &Path) -> Option<PathBuf> {
        let index_name = self.config.index_rel.file_name()?;
        if base.is_file() && base.file_name() == Some(index_name) {
            return Some(base.to_path_buf());
        }

        let mut dir = self.start_dir(base)?;
        for _ in 0..self.config.max_ascent {
            let candidate = dir.join(&self.config.index_rel);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = dir.parent()?.to_path_buf();
        }
        None
    }

    /// Directory a search starts from for a given base candidate. A base that
    /// names an existing file starts from its parent; a nonexistent base is
    /// still tried as a directory path (speculative bases).
    fn start_dir(&self, base: &Path) -> Option<PathBuf> {
        if base.as_os_str().is_empty() {
            return None;
        }
        let start = if base.is_file() {
            base.parent()?.to_path_buf()
        } else {
            base.to_path_buf()
        };
        start.is_dir().then_some(start)
    }

    /// Resolve a sanitized relative path to a `file://` URL under one of the
    /// candidate bases.
    ///
    /// A candidate is accepted only when the file exists, is a regular file,
    /// and its canonical path stays inside the canonical search directory;
    /// this holds even after sanitization, so symlink and normalization
    /// escapes are rejected. The validated fragment (if any) is attached to
    /// the resulting URL.
    pub fn resolve_to_file_url(&self, raw: &str) -> Result<Url> {
        let sanitized = sanitize_relative_path(raw)
            .ok_or_else(|| PathError::TraversalRejected(raw.trim().to_string()))?;
        let (rel, fragment) = split_fragment(&sanitized);
        let rel_path = Path::new(rel);

        let mut saw_escape = false;
        for base in self.base_candidates() {
            if let Some(canonical) = self.resolve_in_base(&base, rel_path, &mut saw_escape) {
                let mut url = Url::from_file_path(&canonical)
                    .map_err(|()| PathError::NotResolved(rel.to_string()))?;
                if let Some(frag) = fragment {
                    url.set_fragment(Some(frag));
                }
                return Ok(url);
            }
        }

        if saw_escape {
            Err(PathError::EscapesBase(rel.to_string()))
        } else {
            Err(PathError::NotResolved(rel.to_string()))
        }
    }

    fn resolve_in_base(
        &self,
        base: &Path,
        rel: &Path,
        saw_escape: &mut bool,
    ) -> Option<PathBuf> {
        let mut dir = self.start_dir(base)?;
        for _ in 0..self.config.max_ascent {
            let candidate = dir.join(rel);
            if candidate.is_file() {
                if let (Ok(canonical_dir), Ok(canonical_file)) =
                    (dir.canonicalize(), candidate.canonicalize())
                {
                    if canonical_file.starts_with(&canonical_dir) {
                        return Some(canonical_file);
                    }
                    log::warn!(
                        "rejecting {}: resolves outside {}",
                        candidate.display(),
                        canonical_dir.display()
                    );
                    *saw_escape = true;
                }
            }
            dir = dir.parent()?.to_path_buf();
        }
        None
    }
}
