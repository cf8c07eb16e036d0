//! Model descriptors, dynamic records and the typed [`Model`] trait.
//!
//! A [`ModelDescriptor`] is the ordered field set of one persisted entity
//! type. It is declared explicitly through [`ModelBuilder`], so schema and
//! statement generation never depend on runtime reflection. Every model
//! implicitly carries an integer `id` primary key which is never part of
//! the declared field list.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::{Field, FieldType, ID_FIELD, TypeDefaults, UNSAVED_ID, Value};
use crate::validate::validate_identifier;

/// The ordered field set of one model.
///
/// # Examples
///
/// ```
/// use litemodel_core::{FieldType, ModelDescriptor};
///
/// let user = ModelDescriptor::builder("User")
///     .string("name", "")
///     .boolean("active", false)
///     .integer("age", 0)
///     .build()
///     .unwrap();
///
/// assert_eq!(user.table_name(), "user");
/// assert_eq!(user.fields().len(), 3);
/// assert_eq!(user.field("age").unwrap().field_type, FieldType::Integer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    name: String,
    table: String,
    fields: Vec<Field>,
}

impl ModelDescriptor {
    /// Starts declaring a model named `name`.
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            defaults: TypeDefaults::default(),
            fields: Vec::new(),
        }
    }

    /// The model's type name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The persisted table name: the model name, lower-cased.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Declared fields in declaration order, excluding `id`.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Position of the field stored in `column`.
    ///
    /// SQLite column names are case-insensitive, so `Name` and `name` name
    /// the same column.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(column))
    }

    /// Returns `true` if `column` is `id` or a declared field.
    pub fn has_column(&self, column: &str) -> bool {
        column == ID_FIELD || self.field(column).is_some()
    }

    /// Default values of all declared fields, in declaration order.
    pub fn default_values(&self) -> Vec<Value> {
        self.fields.iter().map(|f| f.default.clone()).collect()
    }

    /// Checks that `values` lines up with the declared fields, one per field.
    pub fn check_values(&self, values: &[Value]) -> Result<()> {
        if values.len() != self.fields.len() {
            return Err(Error::Decode {
                model: self.name.clone(),
                reason: format!(
                    "expected {} field values, got {}",
                    self.fields.len(),
                    values.len()
                ),
            });
        }
        for (field, value) in self.fields.iter().zip(values) {
            field.check(value)?;
        }
        Ok(())
    }

    fn unknown_field(&self, field: &str) -> Error {
        Error::UnknownField {
            model: self.name.clone(),
            field: field.to_string(),
        }
    }
}

/// Builder for [`ModelDescriptor`].
///
/// Fields keep the order in which they are added.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    name: String,
    defaults: TypeDefaults,
    fields: Vec<Field>,
}

impl ModelBuilder {
    /// Sets the per-type defaults used by [`typed`](Self::typed).
    pub fn defaults(mut self, defaults: TypeDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn boolean(self, name: impl Into<String>, default: bool) -> Self {
        self.field(Field::boolean(name, default))
    }

    pub fn string(self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.field(Field::string(name, default))
    }

    pub fn integer(self, name: impl Into<String>, default: i64) -> Self {
        self.field(Field::integer(name, default))
    }

    /// Adds a field of type `ty` that defaults to the configured type default.
    pub fn typed(self, name: impl Into<String>, ty: FieldType) -> Self {
        let field = Field::with_type_default(name, ty, &self.defaults);
        self.field(field)
    }

    /// Validates the declaration and produces the descriptor.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIdentifier`] if the model or a field name is not a
    ///   plain identifier.
    /// - [`Error::ReservedField`] if a field is named `id`.
    /// - [`Error::DuplicateField`] if two fields share a name. SQLite
    ///   identifiers are case-insensitive, so `Name` and `name` collide.
    /// - [`Error::TypeMismatch`] if a default does not fit its field type.
    pub fn build(self) -> Result<ModelDescriptor> {
        validate_identifier(&self.name)?;
        let mut seen: Vec<String> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            validate_identifier(&field.name)?;
            let folded = field.name.to_ascii_lowercase();
            if folded == ID_FIELD {
                return Err(Error::ReservedField(field.name.clone()));
            }
            if seen.contains(&folded) {
                return Err(Error::DuplicateField {
                    model: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            seen.push(folded);
            field.check(&field.default)?;
        }
        Ok(ModelDescriptor {
            table: self.name.to_lowercase(),
            name: self.name,
            fields: self.fields,
        })
    }
}

/// A typed model persisted through a store.
///
/// Implementors describe their fields once and convert to and from the
/// descriptor-ordered value list. The descriptor is usually kept in a
/// `static` [`OnceLock`](std::sync::OnceLock).
///
/// # Examples
///
/// ```
/// use std::sync::OnceLock;
/// use litemodel_core::{Model, ModelDescriptor, Result, Row, UNSAVED_ID, Value};
///
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// impl Model for Tag {
///     fn descriptor() -> &'static ModelDescriptor {
///         static DESCRIPTOR: OnceLock<ModelDescriptor> = OnceLock::new();
///         DESCRIPTOR.get_or_init(|| {
///             ModelDescriptor::builder("Tag").string("label", "").build().unwrap()
///         })
///     }
///
///     fn id(&self) -> i64 {
///         self.id
///     }
///
///     fn set_id(&mut self, id: i64) {
///         self.id = id;
///     }
///
///     fn values(&self) -> Vec<Value> {
///         vec![self.label.clone().into()]
///     }
///
///     fn from_row(row: &Row) -> Result<Self> {
///         Ok(Self {
///             id: row.id(),
///             label: row.get_str("label")?.to_string(),
///         })
///     }
/// }
///
/// let tag = Tag { id: UNSAVED_ID, label: "rust".into() };
/// assert_eq!(tag.values(), vec![Value::from("rust")]);
/// ```
pub trait Model: Sized {
    /// The model's field set.
    fn descriptor() -> &'static ModelDescriptor;

    /// Current primary key, [`UNSAVED_ID`] until first saved.
    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Values of all declared fields in declaration order, excluding `id`.
    fn values(&self) -> Vec<Value>;

    /// Builds an instance from a decoded row.
    fn from_row(row: &Row) -> Result<Self>;

    fn is_saved(&self) -> bool {
        self.id() != UNSAVED_ID
    }
}

/// A record of a model known only at runtime.
///
/// Constructed with every field at its default and `id` set to
/// [`UNSAVED_ID`]. Assignments are type-checked against the descriptor.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use litemodel_core::{ModelDescriptor, Record, UNSAVED_ID, Value};
///
/// let user = Arc::new(
///     ModelDescriptor::builder("User").string("name", "").integer("age", 0).build().unwrap(),
/// );
/// let mut record = Record::new(user);
/// assert_eq!(record.id(), UNSAVED_ID);
///
/// record.set("age", 42).unwrap();
/// assert_eq!(record.get("age").unwrap(), &Value::Integer(42));
/// assert!(record.set("age", "old").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    descriptor: Arc<ModelDescriptor>,
    id: i64,
    values: Vec<Value>,
}

impl Record {
    pub fn new(descriptor: Arc<ModelDescriptor>) -> Self {
        let values = descriptor.default_values();
        Self {
            descriptor,
            id: UNSAVED_ID,
            values,
        }
    }

    /// Builds a record from a row decoded against the same descriptor.
    pub fn from_row(descriptor: Arc<ModelDescriptor>, row: Row) -> Result<Self> {
        let (id, values) = row.into_parts();
        descriptor.check_values(&values)?;
        Ok(Self {
            descriptor,
            id,
            values,
        })
    }

    pub fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    pub fn is_saved(&self) -> bool {
        self.id != UNSAVED_ID
    }

    /// Field values in declaration order, excluding `id`.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, field: &str) -> Result<&Value> {
        let index = self
            .descriptor
            .field_index(field)
            .ok_or_else(|| self.descriptor.unknown_field(field))?;
        Ok(&self.values[index])
    }

    /// Assigns a field after checking the value against its declared type.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let index = self
            .descriptor
            .field_index(field)
            .ok_or_else(|| self.descriptor.unknown_field(field))?;
        let value = value.into();
        self.descriptor.fields[index].check(&value)?;
        self.values[index] = value;
        Ok(())
    }
}
