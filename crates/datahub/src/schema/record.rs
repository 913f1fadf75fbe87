//! Runtime instance of a [`Schema`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::collection::ObservableCollection;
use crate::error::{DataHubError, Result};
use crate::schema::path::{FieldPath, PathSegment};
use crate::schema::{FieldType, Schema};
use crate::token::ElementToken;
use crate::value::{ObservableValue, Scalar};

/// Live field of a [`Record`].
enum Field {
    Value(ObservableValue),
    Collection(ObservableCollection<Record>),
    Scope(Record),
}

impl Field {
    const fn type_name(&self) -> &'static str {
        match self {
            Field::Value(_) => "value",
            Field::Collection(_) => "collection",
            Field::Scope(_) => "scope",
        }
    }
}

/// Borrowed view of whatever a path resolved to.
enum Node<'a> {
    Value(&'a ObservableValue),
    Collection(&'a ObservableCollection<Record>),
    Record(&'a Record),
}

impl Node<'_> {
    const fn type_name(&self) -> &'static str {
        match self {
            Node::Value(_) => "value",
            Node::Collection(_) => "collection",
            Node::Record(_) => "scope",
        }
    }
}

/// A tree of observable fields laid out by a [`Schema`].
///
/// Fields are owned by value and live exactly as long as the record.
pub struct Record {
    schema: Rc<Schema>,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Record {
    /// Builds a record with every field at its default: scalars hold their
    /// declared default, collections are empty.
    pub fn instantiate(schema: &Schema) -> Self {
        Self::from_shared(Rc::new(schema.clone()))
    }

    fn from_shared(schema: Rc<Schema>) -> Self {
        let mut fields = Vec::with_capacity(schema.len());
        let mut index = HashMap::with_capacity(schema.len());

        for (position, field) in schema.fields().iter().enumerate() {
            let live = match &field.ty {
                FieldType::Value(default) => Field::Value(ObservableValue::new(default.clone())),
                FieldType::Collection(collection) => {
                    let element = Rc::new(collection.element.clone());
                    Field::Collection(
                        ObservableCollection::with_factory(move || {
                            Record::from_shared(Rc::clone(&element))
                        })
                        .with_policy(collection.on_missing),
                    )
                }
                FieldType::Scope(nested) => Field::Scope(Record::instantiate(nested)),
            };
            fields.push(live);
            index.insert(field.name.clone(), position);
        }

        Self {
            schema,
            fields,
            index,
        }
    }

    /// Layout this record was instantiated from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.schema.fields().iter().map(|field| field.name.as_str())
    }

    /// Scalar field called `name`.
    pub fn value(&self, name: &str) -> Result<&ObservableValue> {
        match self.field(name)? {
            Field::Value(value) => Ok(value),
            other => Err(wrong_type(name, "value", other.type_name())),
        }
    }

    /// Collection field called `name`.
    pub fn collection(&self, name: &str) -> Result<&ObservableCollection<Record>> {
        match self.field(name)? {
            Field::Collection(collection) => Ok(collection),
            other => Err(wrong_type(name, "collection", other.type_name())),
        }
    }

    /// Nested record called `name`.
    pub fn scope(&self, name: &str) -> Result<&Record> {
        match self.field(name)? {
            Field::Scope(record) => Ok(record),
            other => Err(wrong_type(name, "scope", other.type_name())),
        }
    }

    /// Runs `f` on the scalar at `path`.
    ///
    /// Element segments resolve through
    /// [`ObservableCollection::get_or_create`], so they follow each
    /// collection's [`MissingElementPolicy`](crate::MissingElementPolicy).
    pub fn with_value<R>(&self, path: &FieldPath, f: impl FnOnce(&ObservableValue) -> R) -> Result<R> {
        self.walk(path.segments(), path, |node| match node {
            Node::Value(value) => Ok(f(value)),
            other => Err(wrong_type(&path.to_string(), "value", other.type_name())),
        })
    }

    /// Runs `f` on the collection at `path`.
    pub fn with_collection<R>(
        &self,
        path: &FieldPath,
        f: impl FnOnce(&ObservableCollection<Record>) -> R,
    ) -> Result<R> {
        self.walk(path.segments(), path, |node| match node {
            Node::Collection(collection) => Ok(f(collection)),
            other => Err(wrong_type(&path.to_string(), "collection", other.type_name())),
        })
    }

    /// Runs `f` on the nested record or collection element at `path`.
    pub fn with_record<R>(&self, path: &FieldPath, f: impl FnOnce(&Record) -> R) -> Result<R> {
        self.walk(path.segments(), path, |node| match node {
            Node::Record(record) => Ok(f(record)),
            other => Err(wrong_type(&path.to_string(), "scope", other.type_name())),
        })
    }

    /// Captures the current content of every field.
    pub fn snapshot(&self) -> RecordSnapshot {
        let fields = self
            .field_names()
            .zip(&self.fields)
            .map(|(name, field)| {
                let snapshot = match field {
                    Field::Value(value) => SnapshotField::Value(value.snapshot()),
                    Field::Collection(collection) => {
                        let mut elements = Vec::with_capacity(collection.len());
                        collection.for_each(|token, element| {
                            elements.push(ElementSnapshot {
                                token,
                                fields: element.snapshot(),
                            });
                        });
                        SnapshotField::Collection(elements)
                    }
                    Field::Scope(record) => SnapshotField::Scope(record.snapshot()),
                };
                (name.to_owned(), snapshot)
            })
            .collect();
        RecordSnapshot { fields }
    }

    fn field(&self, name: &str) -> Result<&Field> {
        self.index
            .get(name)
            .map(|&position| &self.fields[position])
            .ok_or_else(|| DataHubError::UnknownField {
                name: name.to_owned(),
            })
    }

    fn walk<R>(
        &self,
        segments: &[PathSegment],
        path: &FieldPath,
        visit: impl FnOnce(Node<'_>) -> Result<R>,
    ) -> Result<R> {
        let Some((first, rest)) = segments.split_first() else {
            return visit(Node::Record(self));
        };
        let PathSegment::Field(name) = first else {
            return Err(path.invalid("element token must follow a collection"));
        };

        match (self.field(name)?, rest.split_first()) {
            (Field::Value(value), None) => visit(Node::Value(value)),
            (Field::Collection(collection), None) => visit(Node::Collection(collection)),
            (Field::Scope(record), None) => visit(Node::Record(record)),
            (Field::Scope(record), Some(_)) => record.walk(rest, path, visit),
            (Field::Collection(collection), Some((PathSegment::Element(token), tail))) => {
                let element = collection.get_or_create(*token)?;
                element.walk(tail, path, visit)
            }
            (Field::Collection(_), Some(_)) => {
                Err(path.invalid("collection fields are addressed by element token"))
            }
            (Field::Value(_), Some(_)) => Err(path.invalid("values have no nested fields")),
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

fn wrong_type(name: &str, expected: &'static str, found: &'static str) -> DataHubError {
    DataHubError::WrongFieldType {
        name: name.to_owned(),
        expected,
        found,
    }
}

/// Point-in-time copy of a record's content, for display in tooling.
///
/// Serializes as a map that keeps declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordSnapshot {
    pub fields: Vec<(String, SnapshotField)>,
}

impl RecordSnapshot {
    /// Content of the field called `name`.
    pub fn get(&self, name: &str) -> Option<&SnapshotField> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, snapshot)| snapshot)
    }
}

/// Captured content of one field.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SnapshotField {
    Value(Scalar),
    Collection(Vec<ElementSnapshot>),
    Scope(RecordSnapshot),
}

/// Captured collection element.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ElementSnapshot {
    pub token: ElementToken,
    pub fields: RecordSnapshot,
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordSnapshot {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, field) in &self.fields {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::MissingElementPolicy;

    fn sample() -> Record {
        let schema = Schema::builder()
            .value("title", "arena")
            .value("difficulty", 2)
            .scope("audio", |audio| audio.value("volume", 0.5).value("muted", false))
            .collection("enemies", |enemy| {
                enemy
                    .value("name", "goblin")
                    .value("health", 10)
                    .collection("loot", |item| item.value("name", "coin"))
            })
            .build()
            .unwrap();
        Record::instantiate(&schema)
    }

    #[test]
    fn instantiates_defaults() {
        let record = sample();
        assert!(*record.value("title").unwrap() == "arena");
        assert!(*record.value("difficulty").unwrap() == 2);
        assert!(*record.scope("audio").unwrap().value("volume").unwrap() == 0.5);
        assert!(record.collection("enemies").unwrap().is_empty());
        assert_eq!(
            record.field_names().collect::<Vec<_>>(),
            ["title", "difficulty", "audio", "enemies"]
        );
    }

    #[test]
    fn lookups_report_unknown_and_mistyped_fields() {
        let record = sample();
        assert_eq!(
            record.value("missing").unwrap_err(),
            DataHubError::UnknownField {
                name: "missing".to_owned()
            }
        );
        assert_eq!(
            record.collection("title").unwrap_err(),
            DataHubError::WrongFieldType {
                name: "title".to_owned(),
                expected: "collection",
                found: "value",
            }
        );
        assert!(record.scope("enemies").is_err());
    }

    #[test]
    fn elements_are_built_from_the_element_schema() {
        let record = sample();
        let enemies = record.collection("enemies").unwrap();
        let token = enemies.add(|enemy| {
            enemy.value("name").unwrap().assign("orc").unwrap();
        });

        let enemy = enemies.get(token).unwrap();
        assert!(*enemy.value("name").unwrap() == "orc");
        assert!(*enemy.value("health").unwrap() == 10);
        assert!(enemy.collection("loot").unwrap().is_empty());
    }

    #[test]
    fn paths_reach_through_scopes_and_elements() {
        let record = sample();
        let enemies = record.collection("enemies").unwrap();
        let token = enemies.add(|_| {});
        let loot = enemies
            .get(token)
            .unwrap()
            .collection("loot")
            .unwrap()
            .add(|_| {});

        let volume: FieldPath = "audio.volume".parse().unwrap();
        record.with_value(&volume, |v| v.assign(0.75).unwrap()).unwrap();
        assert_eq!(record.with_value(&volume, |v| v.text()).unwrap(), "0.75");

        let path = FieldPath::field("enemies")
            .then_element(token)
            .then_field("loot")
            .then_element(loot)
            .then_field("name");
        assert_eq!(record.with_value(&path, |v| v.text()).unwrap(), "coin");

        let element = FieldPath::field("enemies").then_element(token);
        assert!(record.with_record(&element, |e| e.value("health").is_ok()).unwrap());
        assert_eq!(
            record
                .with_collection(&"enemies".parse().unwrap(), |c| c.len())
                .unwrap(),
            1
        );
    }

    #[test]
    fn bad_paths_are_reported() {
        let record = sample();
        let stale = FieldPath::field("enemies")
            .then_element(ElementToken::from_raw(9))
            .then_field("name");
        assert_eq!(
            record.with_value(&stale, |_| ()).unwrap_err(),
            DataHubError::UnknownToken {
                token: ElementToken::from_raw(9)
            }
        );

        let through_value: FieldPath = "title.length".parse().unwrap();
        assert_eq!(
            record.with_value(&through_value, |_| ()).unwrap_err().error_code(),
            "invalid_path"
        );

        let missing_token: FieldPath = "enemies.name".parse().unwrap();
        assert!(record.with_value(&missing_token, |_| ()).is_err());

        let scope_as_value: FieldPath = "audio".parse().unwrap();
        assert_eq!(
            record.with_value(&scope_as_value, |_| ()).unwrap_err().error_code(),
            "wrong_field_type"
        );
    }

    #[test]
    fn collection_policy_flows_from_schema() {
        let schema = Schema::builder()
            .collection_with_policy("slots", MissingElementPolicy::CreateOnDemand, |slot| {
                slot.value("item", "")
            })
            .build()
            .unwrap();
        let record = Record::instantiate(&schema);
        let slots = record.collection("slots").unwrap();
        assert_eq!(slots.policy(), MissingElementPolicy::CreateOnDemand);
        assert_eq!(
            record.schema().field("slots").unwrap().ty.name(),
            "collection"
        );
        let slot = slots.get_or_create(ElementToken::from_raw(4)).unwrap();
        assert!(*slot.value("item").unwrap() == "");

        let path: FieldPath = "slots[7].item".parse().unwrap();
        record.with_value(&path, |v| v.assign("sword").unwrap()).unwrap();
        assert_eq!(slots.tokens(), [ElementToken::from_raw(4), ElementToken::from_raw(7)]);
        assert_eq!(slots.add(|_| {}), ElementToken::from_raw(8));
    }

    #[test]
    fn snapshot_captures_current_content() {
        let record = sample();
        record.value("difficulty").unwrap().assign(5).unwrap();
        let enemies = record.collection("enemies").unwrap();
        let token = enemies.add(|_| {});

        let snapshot = record.snapshot();
        assert_eq!(
            snapshot.get("difficulty"),
            Some(&SnapshotField::Value(Scalar::Number(5.0)))
        );
        let Some(SnapshotField::Collection(elements)) = snapshot.get("enemies") else {
            panic!("enemies should snapshot as a collection");
        };
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].token, token);
        assert_eq!(
            elements[0].fields.get("name"),
            Some(&SnapshotField::Value(Scalar::from("goblin")))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_in_declaration_order() {
        let record = sample();
        let json = serde_json::to_string(&record.snapshot()).unwrap();
        assert_eq!(
            json,
            r#"{"title":"arena","difficulty":2.0,"audio":{"volume":0.5,"muted":false},"enemies":[]}"#
        );
    }
}
