//! Scope definitions compiled into the crate.

use datahub::ScopeSchema;

use crate::loaders::{LoadResult, ScopeLoader};

const UNITTEST_RON: &str = include_str!("../../data/unittest.ron");

/// The `unittest` reference scope: `teststring`, `testvalue`, `testbool`
/// and a `testarray` collection of titled elements.
pub fn builtin_unittest() -> LoadResult<ScopeSchema> {
    ScopeLoader::from_ron_str(UNITTEST_RON)
}
