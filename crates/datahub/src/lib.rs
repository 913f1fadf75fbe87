//! Observable data primitives for live data binding and parameter tweaking.
//!
//! `datahub` exposes named, change-observable values and collections grouped
//! into process-wide [`Scope`]s. Tooling reads and edits these values as text
//! while game code subscribes to their change events.
//!
//! # Architecture
//!
//! - [`EventHandler`]: ordered multi-subscriber callback broadcaster
//! - [`ObservableValue`]: a numeric, boolean or textual scalar with coercion
//!   and unconditional change notification
//! - [`ObservableCollection`]: token-keyed set of elements with add/remove
//!   lifecycle events
//! - [`Schema`] / [`Scope`]: declarative field layout instantiated into a
//!   runtime tree of the primitives above
//! - [`registry`]: process-wide lookup of scopes by name
//!
//! # Threading
//!
//! Every operation is synchronous and runs on the caller's thread. The types
//! in this crate are `!Send` and `!Sync`, and the scope registry is
//! thread-local, so a scope can only ever be touched from the thread that
//! registered it.
//!
//! # Example
//!
//! ```
//! use datahub::{Schema, ScopeSchema, Scope};
//!
//! let fields = Schema::builder()
//!     .value("gravity", 9.81)
//!     .value("god_mode", false)
//!     .build()
//!     .unwrap();
//! let scope = Scope::new(&ScopeSchema::new("tuning", fields).unwrap());
//!
//! let gravity = scope.value("gravity").unwrap();
//! gravity.assign("12.5").unwrap();
//! assert_eq!(gravity.text(), "12.5");
//! ```
pub mod collection;
pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod schema;
pub mod token;
pub mod value;

pub use collection::{ElementAdded, MissingElementPolicy, ObservableCollection};
pub use config::HubConfig;
pub use error::{DataHubError, Result, SchemaError};
pub use event::EventHandler;
pub use schema::{
    CollectionSchema, ElementSnapshot, FieldPath, FieldSchema, FieldType, PathSegment, Record,
    RecordSnapshot, Schema, SchemaBuilder, Scope, ScopeSchema, SnapshotField,
};
pub use token::{ElementToken, EventToken};
pub use value::{FromScalar, ObservableValue, Scalar, ScalarKind, format_general, parse_lenient};
