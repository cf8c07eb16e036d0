//! YAML configuration for a store and its registered models.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! database: app.db
//! defaults:
//!   boolean: false
//!   string: ""
//!   integer: -1
//! models:
//!   - name: User
//!     fields:
//!       - name: name
//!         type: string
//!       - name: active
//!         default: false
//!       - name: age
//!         type: integer
//!         default: 0
//! ```
//!
//! A field needs a `type`, a `default`, or both. Without a `type` the type is
//! inferred from the default; without a `default` the configured per-type
//! default applies.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ModelDescriptor;
use crate::types::{Field, FieldType, TypeDefaults, Value};

/// One declared field of a configured model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldConfig {
    fn to_field(&self, defaults: &TypeDefaults) -> Result<Field> {
        match (self.field_type, &self.default) {
            (Some(field_type), Some(default)) => Ok(Field {
                name: self.name.clone(),
                field_type,
                default: default.clone(),
            }),
            (Some(field_type), None) => Ok(Field::with_type_default(&self.name, field_type, defaults)),
            (None, Some(default)) => Field::inferred(&self.name, default.clone()),
            (None, None) => Err(Error::UntypedField(self.name.clone())),
        }
    }
}

/// A model registered in the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// Top-level store configuration.
///
/// # Examples
///
/// ```
/// use litemodel_core::config::OrmConfig;
///
/// let config: OrmConfig = serde_yaml::from_str(
///     "version: '1.0'\ndatabase: app.db\nmodels:\n  - name: User\n    fields:\n      - { name: age, default: 0 }\n",
/// )
/// .unwrap();
/// let models = config.descriptors().unwrap();
/// assert_eq!(models[0].table_name(), "user");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrmConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Path to the SQLite database file.
    pub database: PathBuf,
    /// Defaults for fields declared without one.
    #[serde(default)]
    pub defaults: TypeDefaults,
    /// Models in registration order.
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

impl OrmConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or [`Error::Yaml`]
    /// if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Builds a descriptor per configured model, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if two models map to the same table, and any
    /// declaration error from [`ModelBuilder::build`](crate::ModelBuilder::build).
    pub fn descriptors(&self) -> Result<Vec<ModelDescriptor>> {
        let mut descriptors: Vec<ModelDescriptor> = Vec::with_capacity(self.models.len());
        for model in &self.models {
            let mut builder = ModelDescriptor::builder(&model.name).defaults(self.defaults.clone());
            for field in &model.fields {
                builder = builder.field(field.to_field(&self.defaults)?);
            }
            let descriptor = builder.build()?;
            if descriptors
                .iter()
                .any(|d| d.table_name() == descriptor.table_name())
            {
                return Err(Error::Config(format!(
                    "model '{}' maps to table '{}' which is already registered",
                    model.name,
                    descriptor.table_name()
                )));
            }
            descriptors.push(descriptor);
        }
        Ok(descriptors)
    }
}
