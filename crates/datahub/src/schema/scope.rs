use std::fmt;
use std::ops::Deref;

use crate::schema::{Record, ScopeSchema};

/// A named top-level record.
///
/// Dereferences to its root [`Record`], so fields are reached directly:
/// `scope.value("volume")`.
pub struct Scope {
    name: String,
    root: Record,
}

impl Scope {
    /// Instantiates `schema` with every field at its default.
    pub fn new(schema: &ScopeSchema) -> Self {
        tracing::debug!(scope = schema.name(), fields = schema.fields().len(), "instantiating scope");
        Self {
            name: schema.name().to_owned(),
            root: Record::instantiate(schema.fields()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

}

impl Deref for Scope {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.root
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("root", &self.root)
            .finish()
    }
}
