//! Declarative field layouts and their runtime instantiation.
//!
//! A [`Schema`] enumerates field names, kinds and defaults. It is validated
//! once, when built, and then instantiated into a [`Record`]: a tree of
//! [`ObservableValue`](crate::ObservableValue)s,
//! [`ObservableCollection`](crate::ObservableCollection)s of child records,
//! and nested records. A [`Scope`] is a named top-level record.
//!
//! The layout is fixed at definition time; no fields are added or removed
//! from a live record.

mod builder;
mod path;
mod record;
mod scope;

pub use builder::SchemaBuilder;
pub use path::{FieldPath, PathSegment};
pub use record::{ElementSnapshot, Record, RecordSnapshot, SnapshotField};
pub use scope::Scope;

use crate::collection::MissingElementPolicy;
use crate::error::SchemaError;
use crate::value::Scalar;

/// Characters reserved by [`FieldPath`] syntax.
const RESERVED_CHARACTERS: [char; 3] = ['.', '[', ']'];

/// Ordered, validated list of field definitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldSchema>,
}

impl Schema {
    /// Starts an empty schema definition.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Validates `fields` and wraps them into a schema.
    ///
    /// Nested schemas inside `fields` were validated when they were built.
    pub fn from_fields(fields: Vec<FieldSchema>) -> Result<Self, SchemaError> {
        for (index, field) in fields.iter().enumerate() {
            validate_name(&field.name)?;
            if fields[..index].iter().any(|earlier| earlier.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }
        Ok(Self { fields })
    }

    /// Field definitions in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Definition of the field called `name`.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One named field of a schema.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub ty: FieldType,
}

impl FieldSchema {
    /// Scalar field whose kind and initial content come from `default`.
    pub fn value(name: impl Into<String>, default: impl Into<Scalar>) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Value(default.into()),
        }
    }

    /// Collection field whose elements follow `collection.element`.
    pub fn collection(name: impl Into<String>, collection: CollectionSchema) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Collection(collection),
        }
    }

    /// Nested record field.
    pub fn scope(name: impl Into<String>, fields: Schema) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Scope(fields),
        }
    }
}

/// What a field holds.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
    /// Observable scalar with its default content.
    Value(Scalar),
    /// Observable collection of records; starts empty.
    Collection(CollectionSchema),
    /// Nested record.
    Scope(Schema),
}

impl FieldType {
    /// Short name used in diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            FieldType::Value(_) => "value",
            FieldType::Collection(_) => "collection",
            FieldType::Scope(_) => "scope",
        }
    }
}

/// Element layout and lookup policy of a collection field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectionSchema {
    pub element: Schema,
    pub on_missing: MissingElementPolicy,
}

impl CollectionSchema {
    pub fn new(element: Schema) -> Self {
        Self {
            element,
            on_missing: MissingElementPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, on_missing: MissingElementPolicy) -> Self {
        self.on_missing = on_missing;
        self
    }
}

/// A named top-level schema.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeSchema {
    name: String,
    fields: Schema,
}

impl ScopeSchema {
    pub fn new(name: impl Into<String>, fields: Schema) -> Result<Self, SchemaError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Schema {
        &self.fields
    }
}

fn validate_name(name: &str) -> Result<(), SchemaError> {
    if name.trim().is_empty() {
        return Err(SchemaError::EmptyName);
    }
    if name.trim() != name {
        return Err(SchemaError::SurroundingWhitespace {
            name: name.to_owned(),
        });
    }
    match name.chars().find(|c| RESERVED_CHARACTERS.contains(c)) {
        Some(character) => Err(SchemaError::ReservedCharacter {
            name: name.to_owned(),
            character,
        }),
        None => Ok(()),
    }
}
