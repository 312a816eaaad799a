//! Record schema registry.
//!
//! The mapping engines never introspect Rust types at runtime. Instead,
//! every record type a consumer wants projected is described by an explicit
//! [`RecordSchema`]: an ordered field-descriptor table built at registration
//! time. A field may carry a semantic tag, which the mapping crate turns
//! into a type-based rule.

use dashmap::DashMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors raised by schema construction and registration.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Schema or field name is empty.
    #[error("schema name must not be empty")]
    EmptyName,

    /// Two fields share the same name.
    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    /// A schema with this type name is already registered.
    #[error("schema '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Declared type of a record field.
///
/// Scalars cover booleans, every integer width, both float widths, text and
/// two date/time shapes (millisecond epoch and ISO-8601-like strings).
/// `Record` describes a nested object with its own schema. `Opaque` marks a
/// type the projection engine does not understand; projecting into it fails
/// with "unspecified value type".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Text,
    /// Milliseconds since the Unix epoch.
    EpochMillis,
    /// ISO-8601-like date/time string.
    DateTime,
    /// Nested record described by its own schema.
    Record { schema: RecordSchema },
    /// Homogeneous list. Populated by structural deserialization only; the
    /// projection engine always rejects array values.
    List { element: Box<FieldType> },
    /// Declared but unsupported by the projection engine.
    Opaque { name: String },
}

impl FieldType {
    /// Default value assigned when a target record is instantiated.
    pub fn default_value(&self) -> Value {
        match self {
            FieldType::Bool => Value::Bool(false),
            FieldType::Int8
            | FieldType::Int16
            | FieldType::Int32
            | FieldType::Int64
            | FieldType::UInt8
            | FieldType::UInt16
            | FieldType::UInt32
            | FieldType::UInt64
            | FieldType::EpochMillis => Value::from(0),
            FieldType::Float32 | FieldType::Float64 => Value::from(0.0),
            FieldType::Text => Value::String(String::new()),
            FieldType::DateTime => Value::Null,
            FieldType::Record { schema } => {
                Value::Object(ProjectedRecord::new_default(schema).into_fields())
            }
            FieldType::List { .. } => Value::Array(Vec::new()),
            FieldType::Opaque { .. } => Value::Null,
        }
    }
}

/// One field of a record schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, as it appears in the projected record.
    pub name: String,

    /// Declared type.
    pub field_type: FieldType,

    /// Optional semantic tag for type-based mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_tag: Option<String>,
}

/// Ordered field-descriptor table for one record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Record type name, unique within a registry.
    pub type_name: String,

    /// Ordered field descriptors.
    pub fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    /// Start building a schema for the given record type.
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Look up a field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate over fields carrying a semantic tag.
    pub fn tagged_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.semantic_tag.is_some())
    }
}

/// Builder for [`RecordSchema`].
pub struct SchemaBuilder {
    type_name: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    /// Add an untagged field.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            field_type,
            semantic_tag: None,
        });
        self
    }

    /// Add a field carrying a semantic tag.
    pub fn tagged_field(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        tag: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            field_type,
            semantic_tag: Some(tag.into()),
        });
        self
    }

    /// Validate and build the schema.
    pub fn build(self) -> Result<RecordSchema, SchemaError> {
        if self.type_name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(RecordSchema {
            type_name: self.type_name,
            fields: self.fields,
        })
    }
}

/// A record produced by the projection engine.
///
/// Serializes as a plain JSON object; the type name is carried out of band.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRecord {
    type_name: String,
    fields: serde_json::Map<String, Value>,
}

impl ProjectedRecord {
    /// Instantiate a default-valued record for the schema.
    pub fn new_default(schema: &RecordSchema) -> Self {
        let mut fields = serde_json::Map::new();
        for fd in &schema.fields {
            fields.insert(fd.name.clone(), fd.field_type.default_value());
        }
        Self {
            type_name: schema.type_name.clone(),
            fields,
        }
    }

    /// Record type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Read a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Write a field value. The field must already exist in the schema the
    /// record was instantiated from; unknown names are ignored by callers
    /// before reaching this point.
    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    /// Convert into a plain JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Consume the record, yielding its field map.
    pub fn into_fields(self) -> serde_json::Map<String, Value> {
        self.fields
    }
}

impl Serialize for ProjectedRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl From<ProjectedRecord> for Value {
    fn from(record: ProjectedRecord) -> Self {
        Value::Object(record.fields)
    }
}

/// Concurrent registry of record schemas, keyed by type name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: DashMap<String, RecordSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema. Fails if the type name is already taken.
    pub fn register(&self, schema: RecordSchema) -> Result<(), SchemaError> {
        if schema.type_name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if self.schemas.contains_key(&schema.type_name) {
            return Err(SchemaError::AlreadyRegistered(schema.type_name));
        }
        self.schemas.insert(schema.type_name.clone(), schema);
        Ok(())
    }

    /// Look up a schema by type name.
    pub fn get(&self, type_name: &str) -> Option<RecordSchema> {
        self.schemas.get(type_name).map(|s| s.value().clone())
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
