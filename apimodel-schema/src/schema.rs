//! Schema definitions and the JSON parsing walk.
//!
//! A [`Schema`] is an ordered, immutable set of named [`Field`]s. Fields are
//! collected once, in [`SchemaBuilder::build`]: inherited fields first, then
//! the schema's own. Built schemas are shared behind [`Arc`] and are safe to
//! read from any thread.
//!
//! ## Example
//!
//! ```rust
//! use apimodel_schema::{Field, FieldType, Schema};
//! use serde_json::json;
//!
//! let user = Schema::builder("User")
//!     .field("name", Field::new(FieldType::String).required())
//!     .field("age", Field::new(FieldType::Integer))
//!     .build()
//!     .unwrap();
//!
//! let model = user.parse(&json!({"name": "Ada", "age": 36})).unwrap().unwrap();
//! assert_eq!(model.to_json(), json!({"age": 36, "name": "Ada"}));
//!
//! let err = user.parse(&json!({"age": "old"})).unwrap_err();
//! assert_eq!(err.errors[0].path, "age");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use apimodel_core::{
    json_type_name, DeserializationError, ErrorCode, ErrorContext, ModelError, SchemaError,
    ValidationContext,
};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::field::Field;
use crate::model::Model;

static NULL: JsonValue = JsonValue::Null;

/// A named, ordered set of fields.
pub struct Schema {
    name: String,
    description: Option<String>,
    fields: IndexMap<String, Field>,
    operator_field: Option<String>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Fields in declaration order, inherited first.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Look up a field.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Whether the schema declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Attribute whose raw value sets the operator for nested validation.
    pub fn operator_field(&self) -> Option<&str> {
        self.operator_field.as_deref()
    }

    /// Parse a nested object, recording problems in `errors`.
    ///
    /// Returns `None` for JSON `null` or when any error was recorded.
    /// Every declared field is visited, whether or not its key is present,
    /// and every undeclared key is reported as `UNKNOWN_FIELD`.
    pub fn from_json(
        self: &Arc<Self>,
        raw: &JsonValue,
        errors: &mut ErrorContext,
        ctx: Option<&ValidationContext<'_>>,
    ) -> Option<Model> {
        let object = match raw {
            JsonValue::Null => return None,
            JsonValue::Object(object) => object,
            other => {
                errors.add_error(
                    ErrorCode::InvalidType,
                    format!("Invalid type \"{}\", expected \"object\"", json_type_name(other)),
                );
                return None;
            }
        };

        let nested_ctx = ctx.map(|ctx| self.derive_context(ctx, raw));

        let mut data = BTreeMap::new();
        for (name, field) in &self.fields {
            let raw_value = object.get(name).unwrap_or(&NULL);
            let value = field.from_json(raw_value, errors.field(name.as_str()), nested_ctx.as_ref());
            if object.contains_key(name) || !value.is_null() {
                data.insert(name.clone(), value);
            }
        }

        for key in object.keys().filter(|key| !self.fields.contains_key(*key)) {
            trace!(schema = %self.name, key = %key, "Unknown field in payload");
            errors
                .field(key.as_str())
                .add_error(ErrorCode::UnknownField, format!("Unknown field \"{}\"", key));
        }

        if errors.has_errors() {
            return None;
        }
        Some(Model::from_parts(Arc::clone(self), data))
    }

    /// Parse a root payload without business-rule validation.
    pub fn parse(self: &Arc<Self>, raw: &JsonValue) -> Result<Option<Model>, DeserializationError> {
        self.parse_with(raw, None)
    }

    /// Parse a root payload and run validators for the call described by `ctx`.
    pub fn parse_validated(
        self: &Arc<Self>,
        raw: &JsonValue,
        ctx: &ValidationContext<'_>,
    ) -> Result<Option<Model>, DeserializationError> {
        self.parse_with(raw, Some(ctx))
    }

    /// Parse a root payload from JSON text.
    pub fn parse_str(
        self: &Arc<Self>,
        text: &str,
        ctx: Option<&ValidationContext<'_>>,
    ) -> Result<Option<Model>, ModelError> {
        let raw: JsonValue = serde_json::from_str(text)?;
        Ok(self.parse_with(&raw, ctx)?)
    }

    fn parse_with(
        self: &Arc<Self>,
        raw: &JsonValue,
        ctx: Option<&ValidationContext<'_>>,
    ) -> Result<Option<Model>, DeserializationError> {
        let mut errors = ErrorContext::new();
        let model = self.from_json(raw, &mut errors, ctx);
        if errors.has_errors() {
            debug!(
                schema = %self.name,
                errors = errors.error_count(),
                "Rejected payload"
            );
            return Err(DeserializationError::new(errors.into_errors()));
        }
        Ok(model)
    }

    fn derive_context<'b>(
        &self,
        ctx: &ValidationContext<'_>,
        raw: &'b JsonValue,
    ) -> ValidationContext<'b> {
        match &self.operator_field {
            Some(field) => ctx.derive_with_operator(raw, raw.get(field).and_then(JsonValue::as_str)),
            None => ctx.derive(raw),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("operator_field", &self.operator_field)
            .finish()
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    description: Option<String>,
    parents: Vec<Arc<Schema>>,
    fields: Vec<(String, Field)>,
    operator_field: Option<String>,
}

impl SchemaBuilder {
    /// Create a builder for a schema called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parents: Vec::new(),
            fields: Vec::new(),
            operator_field: None,
        }
    }

    /// Inherit every field of `parent`. May be called more than once.
    #[must_use]
    pub fn extends(mut self, parent: &Arc<Schema>) -> Self {
        self.parents.push(Arc::clone(parent));
        self
    }

    /// Declare a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    /// Set the documentation text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Take the validation operator of nested fields from this attribute's raw value.
    #[must_use]
    pub fn operator_from(mut self, field: impl Into<String>) -> Self {
        self.operator_field = Some(field.into());
        self
    }

    /// Collect fields and freeze the schema.
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        let mut fields: IndexMap<String, Field> = IndexMap::new();
        let inherited = self
            .parents
            .iter()
            .flat_map(|parent| parent.fields.iter().map(|(n, f)| (n.clone(), f.clone())));

        for (name, field) in inherited.chain(self.fields) {
            if fields.contains_key(&name) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name,
                    field: name,
                });
            }
            fields.insert(name, field);
        }

        let operator_field = self.operator_field.or_else(|| {
            self.parents
                .iter()
                .find_map(|parent| parent.operator_field.clone())
        });

        debug!(schema = %self.name, fields = fields.len(), "Built schema");
        Ok(Arc::new(Schema {
            name: self.name,
            description: self.description,
            fields,
            operator_field,
        }))
    }
}
