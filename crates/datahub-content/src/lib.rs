//! Data-driven scope definitions and loaders.
//!
//! Scope layouts can be written as RON or TOML files instead of builder code:
//! - Field specs (name plus exactly one of `value`, `collection`, `scope`)
//! - Whole scope files (`name` plus `fields`)
//! - Data directories holding one scope file per scope
//!
//! Files only declare layout and defaults. Live content is never written
//! back to them.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{FieldSpec, LoadResult, ScopeFile, ScopeLoader, builtin_unittest};
