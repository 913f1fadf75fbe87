//! Scope file loader.
//!
//! A scope file names the scope and lists its fields. Each field carries
//! exactly one of `value` (a default scalar), `collection` (the element
//! layout) or `scope` (a nested layout):
//!
//! ```ron
//! #![enable(implicit_some)]
//! (
//!     name: "audio",
//!     fields: [
//!         (name: "volume", value: 0.5),
//!         (name: "tracks", collection: [(name: "title", value: "")]),
//!     ],
//! )
//! ```

use std::path::Path;

use anyhow::{Context, bail};
use datahub::{CollectionSchema, FieldSchema, MissingElementPolicy, Scalar, Schema, ScopeSchema};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Top-level structure of a scope file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeFile {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// One field of a scope file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Vec<FieldSpec>>,
    /// Only meaningful next to `collection`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_missing: Option<MissingElementPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<FieldSpec>>,
}

impl FieldSpec {
    /// Converts this entry into a validated field definition.
    pub fn into_field(self) -> LoadResult<FieldSchema> {
        let FieldSpec {
            name,
            value,
            collection,
            on_missing,
            scope,
        } = self;

        if on_missing.is_some() && collection.is_none() {
            bail!("Field '{}': `on_missing` requires `collection`", name);
        }

        match (value, collection, scope) {
            (Some(default), None, None) => Ok(FieldSchema::value(name, default)),
            (None, Some(element), None) => {
                let element = build_schema(element)
                    .with_context(|| format!("in element layout of collection '{}'", name))?;
                let collection = CollectionSchema::new(element).with_policy(on_missing.unwrap_or_default());
                Ok(FieldSchema::collection(name, collection))
            }
            (None, None, Some(fields)) => {
                let fields =
                    build_schema(fields).with_context(|| format!("in nested scope '{}'", name))?;
                Ok(FieldSchema::scope(name, fields))
            }
            (None, None, None) => {
                bail!("Field '{}' needs one of `value`, `collection` or `scope`", name)
            }
            _ => bail!(
                "Field '{}' sets more than one of `value`, `collection` and `scope`",
                name
            ),
        }
    }
}

impl ScopeFile {
    /// Converts the file contents into a validated scope schema.
    pub fn into_schema(self) -> LoadResult<ScopeSchema> {
        let fields = build_schema(self.fields).with_context(|| format!("in scope '{}'", self.name))?;
        Ok(ScopeSchema::new(self.name, fields)?)
    }
}

fn build_schema(specs: Vec<FieldSpec>) -> LoadResult<Schema> {
    let fields = specs
        .into_iter()
        .map(FieldSpec::into_field)
        .collect::<LoadResult<Vec<_>>>()?;
    Ok(Schema::from_fields(fields)?)
}

/// Loader for scope definitions from RON or TOML files.
pub struct ScopeLoader;

impl ScopeLoader {
    /// Load a scope schema from a file.
    ///
    /// The format is picked by extension: `.ron` or `.toml`.
    pub fn load(path: &Path) -> LoadResult<ScopeSchema> {
        let content = read_file(path)?;
        let schema = match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => bail!(
                "Unsupported scope file {}: expected a .ron or .toml extension",
                path.display()
            ),
        }
        .with_context(|| format!("while loading {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            scope = schema.name(),
            fields = schema.fields().len(),
            "loaded scope schema"
        );
        Ok(schema)
    }

    /// Parse a scope schema from RON text.
    pub fn from_ron_str(content: &str) -> LoadResult<ScopeSchema> {
        let file: ScopeFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scope RON: {}", e))?;
        file.into_schema()
    }

    /// Parse a scope schema from TOML text.
    pub fn from_toml_str(content: &str) -> LoadResult<ScopeSchema> {
        let file: ScopeFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scope TOML: {}", e))?;
        file.into_schema()
    }

    /// Load every `.ron` and `.toml` scope file in `dir`, sorted by file name.
    ///
    /// Other files are skipped. Subdirectories are not searched.
    pub fn load_dir(dir: &Path) -> LoadResult<Vec<ScopeSchema>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_scope_file = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("ron" | "toml")
            );
            if path.is_file() && is_scope_file {
                paths.push(path);
            }
        }
        paths.sort();

        let mut schemas: Vec<ScopeSchema> = Vec::with_capacity(paths.len());
        for path in &paths {
            let schema = Self::load(path)?;
            if schemas.iter().any(|s| s.name() == schema.name()) {
                bail!(
                    "Scope '{}' is defined twice in {}",
                    schema.name(),
                    dir.display()
                );
            }
            schemas.push(schema);
        }
        Ok(schemas)
    }
}
