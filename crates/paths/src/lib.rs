//! # Nexus Paths
//!
//! Traversal-safe path handling for the roadmap dashboard.
//!
//! ```text
//! untrusted relative path
//!     │
//!     ├──> sanitize (fragment split, scheme/drive rejection, `..` policy)
//!     │
//!     └──> Resolver (candidate bases, bounded ancestor walk)
//!            └─> manifest path / file:// URL
//! ```
//!
//! The resolver takes its repository-root override through
//! [`ResolverConfig`] instead of reading the process environment, so callers
//! stay testable without environment manipulation.

mod error;
mod resolve;
mod sanitize;

pub use error::{PathError, Result};
pub use resolve::{Resolver, ResolverConfig, DEFAULT_INDEX_REL, DEFAULT_MAX_ASCENT};
pub use sanitize::{sanitize_relative_path, split_fragment};
