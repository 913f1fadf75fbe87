//! Loaders that turn RON/TOML scope files into [`datahub::ScopeSchema`]s.

pub mod builtin;
pub mod scope;

pub use builtin::builtin_unittest;
pub use scope::{FieldSpec, ScopeFile, ScopeLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
