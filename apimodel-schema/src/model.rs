//! Schema instances.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use apimodel_core::ModelError;
use serde_json::{Map, Value as JsonValue};

use crate::schema::Schema;
use crate::value::Value;

/// A sparse instance of a [`Schema`].
///
/// Attributes that were never assigned are absent, which is different from
/// being present with a null value: absent attributes are left out of
/// [`Model::to_json`], present nulls are emitted as JSON `null`.
///
/// # Example
///
/// ```rust
/// use apimodel_schema::{Field, FieldType, Model, Schema};
/// use serde_json::json;
///
/// let point = Schema::builder("Point")
///     .field("x", Field::new(FieldType::Float))
///     .field("y", Field::new(FieldType::Float))
///     .build()
///     .unwrap();
///
/// let mut model = Model::new(&point);
/// model.set("x", 1).unwrap();
/// assert_eq!(model.to_json(), json!({"x": 1.0}));
/// assert!(model.set("z", 2).is_err());
/// ```
#[derive(Clone)]
pub struct Model {
    schema: Arc<Schema>,
    data: BTreeMap<String, Value>,
}

impl Model {
    /// Create an empty instance.
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            data: BTreeMap::new(),
        }
    }

    /// Create an instance from attribute assignments.
    pub fn with_values<I, K, V>(schema: &Arc<Schema>, values: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut model = Self::new(schema);
        for (name, value) in values {
            model.set(name, value)?;
        }
        Ok(model)
    }

    pub(crate) fn from_parts(schema: Arc<Schema>, data: BTreeMap<String, Value>) -> Self {
        Self { schema, data }
    }

    /// The instance's schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Name of the instance's schema.
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Value of a present attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Whether `name` has been assigned, possibly to null.
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Assign an attribute. The value is normalized to the field's type.
    ///
    /// Values the field's type cannot hold are rejected, so [`Model::to_json`]
    /// only ever emits the declared wire shape.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), ModelError> {
        let name = name.into();
        let Some(field) = self.schema.field(&name) else {
            return Err(ModelError::UnknownField(name));
        };
        let value = value.into();
        let actual = value.kind();
        let Some(value) = field.normalize(value) else {
            return Err(ModelError::InvalidValue {
                expected: field.field_type().type_name(),
                actual: actual.to_string(),
                field: name,
            });
        };
        self.data.insert(name, value);
        Ok(())
    }

    /// Make an attribute absent again, returning its previous value.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.data.remove(name)
    }

    /// Present attributes sorted by name.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of present attributes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no attribute is present.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Serialize present attributes, sorted by name.
    pub fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        for (name, value) in &self.data {
            let json = match self.schema.field(name) {
                Some(field) => field.to_json(value),
                None => value.to_plain_json(),
            };
            object.insert(name.clone(), json);
        }
        JsonValue::Object(object)
    }

    /// Serialize to compact JSON text.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Multi-line debug rendering; `indent` is the current line's indentation.
    pub fn render(&self, indent: &str) -> String {
        let nested = format!("{}  ", indent);
        let mut out = format!("<{}: {{\n", self.schema.name());
        for (name, value) in &self.data {
            let rendered = match self.schema.field(name) {
                Some(field) => field.render(value, &nested),
                None => value.to_string(),
            };
            out.push_str(&format!("{}{}: {},\n", nested, name, rendered));
        }
        out.push_str(indent);
        out.push_str("}>");
        out
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.data == other.data
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("schema", &self.schema.name())
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, FieldType};
    use apimodel_core::{CodecSettings, HashidsCodec, IdCodec};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn child() -> Arc<Schema> {
        Schema::builder("Child")
            .field("name", Field::new(FieldType::String))
            .field("tags", Field::new(FieldType::list(FieldType::String)))
            .build()
            .unwrap()
    }

    fn parent() -> Arc<Schema> {
        Schema::builder("Parent")
            .field("id", Field::new(FieldType::Integer))
            .field("price", Field::new(FieldType::Decimal))
            .field("ratio", Field::new(FieldType::Float))
            .field("child", Field::new(FieldType::model(&child())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_sparsity() {
        let raw = json!({
            "child": {"name": "c", "tags": ["x", "y"]},
            "id": 7,
            "ratio": null,
        });
        let model = parent().parse(&raw).unwrap().unwrap();
        assert_eq!(model.to_json(), raw);
        assert!(!model.contains("price"));
        assert!(model.contains("ratio"));
    }

    fn codec() -> apimodel_core::BoxedIdCodec {
        HashidsCodec::new(&CodecSettings::new("test")).unwrap().shared()
    }

    fn everything() -> Arc<Schema> {
        Schema::builder("Everything")
            .field("day", Field::new(FieldType::Date))
            .field("at", Field::new(FieldType::DateTime))
            .field("blob", Field::new(FieldType::Bytes))
            .field("id", Field::new(FieldType::encrypted_id(codec())))
            .field("price", Field::new(FieldType::Decimal))
            .field("counts", Field::new(FieldType::dict(FieldType::Integer)))
            .field("color", Field::new(FieldType::enumeration(["RED", "BLUE"]).unwrap()))
            .field("extra", Field::new(FieldType::Any))
            .build()
            .unwrap()
    }

    #[test]
    fn test_round_trip_covers_every_wire_type() {
        let raw = json!({
            "at": "2012-04-12T10:08:23.500000+05:30",
            "blob": "aGVsbG8=",
            "color": "BLUE",
            "counts": {"zeta": 1, "alpha": 2},
            "day": "2016-02-18",
            "extra": {"nested": [1, true, null]},
            "id": "PYW33gW8",
            "price": "12.50",
        });
        let schema = everything();
        let model = schema.parse(&raw).unwrap().unwrap();
        assert_eq!(model.get("id"), Some(&Value::Id(123)));
        assert_eq!(model.to_json(), raw);

        let reparsed = schema.parse(&model.to_json()).unwrap().unwrap();
        assert_eq!(reparsed, model);
    }

    #[test]
    fn test_set_rejects_values_the_type_cannot_hold() {
        let mut model = Model::new(&everything());
        let err = model.set("id", -5).unwrap_err();
        assert!(matches!(
            &err,
            ModelError::InvalidValue { field, expected, actual }
                if field == "id" && expected == "id" && actual == "integer"
        ));
        assert!(model.set("color", "GREEN").is_err());
        assert!(!model.contains("id"));

        let mut numbers = Model::new(&parent());
        let err = numbers.set("id", "not a number").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for field \"id\": expected integer, got string"
        );
        assert!(numbers.set("child", Model::new(&parent())).is_err());
        assert_eq!(numbers.to_json_string(), "{}");

        model.set("id", 7).unwrap();
        assert_eq!(model.to_json(), json!({"id": codec().encode(7)}));
    }

    #[test]
    fn test_set_normalizes_and_rejects_unknown() {
        let mut model = Model::new(&parent());
        model.set("price", 3).unwrap();
        model.set("ratio", 2).unwrap();
        assert_eq!(model.get("price"), Some(&Value::Decimal(Decimal::from(3))));
        assert_eq!(model.get("ratio"), Some(&Value::Float(2.0)));
        assert_eq!(model.to_json(), json!({"price": "3", "ratio": 2.0}));

        let err = model.set("missing", 1).unwrap_err();
        assert_eq!(err.to_string(), "Unknown field \"missing\"");
    }

    #[test]
    fn test_unset_makes_attribute_absent() {
        let mut model = Model::with_values(&child(), [("name", "a")]).unwrap();
        assert_eq!(model.unset("name"), Some(Value::String("a".into())));
        assert!(model.is_empty());
        assert_eq!(model.to_json_string(), "{}");
    }

    #[test]
    fn test_equality_uses_schema_name_and_data() {
        let a = Model::with_values(&child(), [("name", "a")]).unwrap();
        let b = Model::with_values(&child(), [("name", "a")]).unwrap();
        let c = Model::with_values(&child(), [("name", "b")]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Model::new(&child()));
    }

    #[test]
    fn test_render_nests_models_and_lists() {
        let model = parent()
            .parse(&json!({"id": 1, "child": {"name": "it's", "tags": ["t"]}}))
            .unwrap()
            .unwrap();
        let expected = "\
<Parent: {
  child: <Child: {
    name: 'it\\'s',
    tags: [
      't',
    ],
  }>,
  id: 1,
}>";
        assert_eq!(model.to_string(), expected);
    }
}
