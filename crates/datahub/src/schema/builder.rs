//! Builder for ergonomic schema definitions.
//!
//! Nested collection and scope layouts are described with closures, so a
//! whole scope reads as one expression:
//!
//! ```
//! use datahub::Schema;
//!
//! let schema = Schema::builder()
//!     .value("teststring", "unittest")
//!     .value("testvalue", 99)
//!     .value("testbool", true)
//!     .collection("testarray", |element| element.value("teststring", "title"))
//!     .build()
//!     .unwrap();
//! assert_eq!(schema.len(), 4);
//! ```

use crate::collection::MissingElementPolicy;
use crate::error::SchemaError;
use crate::schema::{CollectionSchema, FieldSchema, Schema};
use crate::value::Scalar;

/// Accumulates field definitions; validation happens in [`SchemaBuilder::build`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSchema>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scalar field; its kind is the kind of `default`.
    #[must_use]
    pub fn value(self, name: impl Into<String>, default: impl Into<Scalar>) -> Self {
        self.field(FieldSchema::value(name, default))
    }

    /// Adds a collection field whose element layout is built by `element`.
    #[must_use]
    pub fn collection(
        self,
        name: impl Into<String>,
        element: impl FnOnce(SchemaBuilder) -> SchemaBuilder,
    ) -> Self {
        self.collection_with_policy(name, MissingElementPolicy::Fail, element)
    }

    /// Adds a collection field with an explicit missing-element policy.
    #[must_use]
    pub fn collection_with_policy(
        self,
        name: impl Into<String>,
        policy: MissingElementPolicy,
        element: impl FnOnce(SchemaBuilder) -> SchemaBuilder,
    ) -> Self {
        match element(SchemaBuilder::new()).build() {
            Ok(element) => self.field(FieldSchema::collection(
                name,
                CollectionSchema::new(element).with_policy(policy),
            )),
            Err(err) => self.fail(err),
        }
    }

    /// Adds a nested record field whose layout is built by `fields`.
    #[must_use]
    pub fn scope(
        self,
        name: impl Into<String>,
        fields: impl FnOnce(SchemaBuilder) -> SchemaBuilder,
    ) -> Self {
        match fields(SchemaBuilder::new()).build() {
            Ok(fields) => self.field(FieldSchema::scope(name, fields)),
            Err(err) => self.fail(err),
        }
    }

    /// Adds a prebuilt field definition.
    #[must_use]
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates the accumulated fields.
    ///
    /// Reports the first error met while building, including errors from
    /// nested layouts.
    pub fn build(self) -> Result<Schema, SchemaError> {
        match self.error {
            Some(err) => Err(err),
            None => Schema::from_fields(self.fields),
        }
    }

    fn fail(mut self, err: SchemaError) -> Self {
        self.error.get_or_insert(err);
        self
    }
}
