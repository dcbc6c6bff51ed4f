//! Field types.
//!
//! A [`FieldType`] knows how to turn raw JSON into a [`Value`] and back.
//! Parsing never aborts: type problems are recorded in the supplied
//! [`ErrorContext`] and the parse yields [`Value::Null`] for that location.
//! Composite types (lists, dictionaries, nested models) keep walking every
//! element so the caller sees every problem at once.

use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use apimodel_core::{
    json_type_name, BoxedIdCodec, ErrorCode, ErrorContext, SchemaError, ValidationContext,
};
use base64::Engine as _;
use chrono::{DateTime, NaiveDate};
use indexmap::IndexMap;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value as JsonValue};

use crate::schema::Schema;
use crate::value::Value;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}$").expect("date pattern is valid")
});

static DATETIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]{1,9})?([+-][0-9]{2}:[0-9]{2}|Z)$",
    )
    .expect("datetime pattern is valid")
});

const DATE_FORMAT: &str = "YYYY-MM-DD";
const DATETIME_FORMAT: &str = "YYYY-MM-DDTHH:MM:SS[.ffffff]+HH:MM";

/// Closed set of allowed strings for an enum field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValues {
    values: Vec<String>,
}

impl EnumValues {
    /// Create an enum value set. At least one value is required.
    pub fn new<I, S>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !collected.contains(&value) {
                collected.push(value);
            }
        }
        if collected.is_empty() {
            return Err(SchemaError::EmptyEnum);
        }
        Ok(Self { values: collected })
    }

    /// Values in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Values sorted lexicographically.
    pub fn sorted(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.values.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }

    /// Whether `value` is a member.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Structural type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// JSON string.
    String,
    /// JSON number without a fractional part.
    Integer,
    /// Any JSON number.
    Float,
    /// JSON boolean.
    Boolean,
    /// Base64 encoded string.
    Bytes,
    /// `YYYY-MM-DD` string.
    Date,
    /// ISO 8601 datetime string with offset.
    DateTime,
    /// Exact decimal text.
    Decimal,
    /// String restricted to a closed set.
    Enum(EnumValues),
    /// Opaque string decoded to an integer id by a codec.
    EncryptedId(BoxedIdCodec),
    /// Unchecked JSON.
    Any,
    /// Array of the inner type.
    List(Box<FieldType>),
    /// Object of string keys to the inner type.
    Dict(Box<FieldType>),
    /// Nested model.
    Model(Arc<Schema>),
}

impl FieldType {
    /// Enum over the given values.
    pub fn enumeration<I, S>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::Enum(EnumValues::new(values)?))
    }

    /// Encrypted id using the given codec.
    pub fn encrypted_id(codec: BoxedIdCodec) -> Self {
        Self::EncryptedId(codec)
    }

    /// List of `inner`.
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Dictionary of `inner`.
    pub fn dict(inner: FieldType) -> Self {
        Self::Dict(Box::new(inner))
    }

    /// Nested model of `schema`.
    pub fn model(schema: &Arc<Schema>) -> Self {
        Self::Model(Arc::clone(schema))
    }

    /// Documentation name, e.g. `list(object(User))`.
    pub fn type_name(&self) -> String {
        match self {
            Self::String => "string".into(),
            Self::Integer => "integer".into(),
            Self::Float => "float".into(),
            Self::Boolean => "boolean".into(),
            Self::Bytes => "bytes".into(),
            Self::Date => "date".into(),
            Self::DateTime => "datetime".into(),
            Self::Decimal => "decimal".into(),
            Self::Enum(values) => format!("enum({})", values.values().join(", ")),
            Self::EncryptedId(_) => "id".into(),
            Self::Any => "any".into(),
            Self::List(inner) => format!("list({})", inner.type_name()),
            Self::Dict(inner) => format!("dict({})", inner.type_name()),
            Self::Model(schema) => format!("object({})", schema.name()),
        }
    }

    /// JSON type used on the wire.
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String
            | Self::Bytes
            | Self::Date
            | Self::DateTime
            | Self::Decimal
            | Self::Enum(_)
            | Self::EncryptedId(_) => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Any => "any",
            Self::List(_) => "array",
            Self::Dict(_) | Self::Model(_) => "object",
        }
    }

    /// Human description for types whose wire form needs explaining.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::Bytes => Some("Binary data, base64 encoded"),
            Self::Date => Some("A date in ISO 8601 format (YYYY-MM-DD)"),
            Self::DateTime => Some(
                "A datetime with time zone in ISO 8601 format (YYYY-MM-DDTHH:MM:SS.mmmmmm+HH:MM)",
            ),
            Self::Decimal => Some("A fixed-point decimal number"),
            Self::EncryptedId(_) => Some("An entity id"),
            Self::Any => Some("Any JSON value"),
            _ => None,
        }
    }

    /// Schema of the model this type holds, looking through lists and dictionaries.
    pub fn model_schema(&self) -> Option<&Arc<Schema>> {
        match self {
            Self::Model(schema) => Some(schema),
            Self::List(inner) | Self::Dict(inner) => inner.model_schema(),
            _ => None,
        }
    }

    /// Serialize a value of this type.
    pub fn to_json(&self, value: &Value) -> JsonValue {
        match (self, value) {
            (_, Value::Null) => JsonValue::Null,
            (Self::EncryptedId(codec), Value::Id(id)) => JsonValue::String(codec.encode(*id)),
            (Self::Float, Value::Integer(i)) => JsonValue::from(*i as f64),
            (Self::List(inner), Value::List(items)) => {
                JsonValue::Array(items.iter().map(|item| inner.to_json(item)).collect())
            }
            (Self::Dict(inner), Value::Dict(map)) => JsonValue::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), inner.to_json(item)))
                    .collect::<Map<String, JsonValue>>(),
            ),
            (_, other) => other.to_plain_json(),
        }
    }

    /// Parse raw JSON, recording problems in `errors`.
    ///
    /// `null` is always accepted and yields [`Value::Null`].
    pub fn from_json(
        &self,
        raw: &JsonValue,
        errors: &mut ErrorContext,
        ctx: Option<&ValidationContext<'_>>,
    ) -> Value {
        if raw.is_null() {
            return Value::Null;
        }
        match self {
            Self::String => match raw.as_str() {
                Some(s) => Value::String(s.to_string()),
                None => self.invalid_type(raw, errors),
            },
            Self::Integer => match raw {
                JsonValue::Number(n) if n.is_i64() => n.as_i64().map_or(Value::Null, Value::Integer),
                JsonValue::Number(n) if n.is_u64() => {
                    errors.add_error(ErrorCode::InvalidValue, format!("Integer {} is out of range", n));
                    Value::Null
                }
                _ => self.invalid_type(raw, errors),
            },
            Self::Float => match raw.as_f64() {
                Some(f) => Value::Float(f),
                None => self.invalid_type(raw, errors),
            },
            Self::Boolean => match raw.as_bool() {
                Some(b) => Value::Bool(b),
                None => self.invalid_type(raw, errors),
            },
            Self::Bytes => match raw.as_str() {
                Some(s) => match base64::engine::general_purpose::STANDARD.decode(s) {
                    Ok(bytes) => Value::Bytes(bytes),
                    Err(_) => {
                        errors.add_error(ErrorCode::InvalidValue, "Invalid base64 data");
                        Value::Null
                    }
                },
                None => self.invalid_type(raw, errors),
            },
            Self::Date => match raw.as_str() {
                Some(s) => parse_date(s).map_or_else(
                    || {
                        errors.add_error(
                            ErrorCode::InvalidValue,
                            format!("Invalid date \"{}\", expected format {}", s, DATE_FORMAT),
                        );
                        Value::Null
                    },
                    Value::Date,
                ),
                None => self.invalid_type(raw, errors),
            },
            Self::DateTime => match raw.as_str() {
                Some(s) => match parse_datetime(s) {
                    Some(dt) => Value::DateTime(dt),
                    None => {
                        errors.add_error(
                            ErrorCode::InvalidValue,
                            format!("Invalid datetime \"{}\", expected format {}", s, DATETIME_FORMAT),
                        );
                        Value::Null
                    }
                },
                None => self.invalid_type(raw, errors),
            },
            Self::Decimal => match raw.as_str() {
                Some(s) => match Decimal::from_str(s) {
                    Ok(d) => Value::Decimal(d),
                    Err(_) => {
                        errors.add_error(ErrorCode::InvalidValue, format!("Invalid decimal \"{}\"", s));
                        Value::Null
                    }
                },
                None => self.invalid_type(raw, errors),
            },
            Self::Enum(values) => match raw.as_str() {
                Some(s) if values.contains(s) => Value::String(s.to_string()),
                Some(s) => {
                    errors.add_error(
                        ErrorCode::InvalidValue,
                        format!(
                            "Invalid value \"{}\", expected one of: {}",
                            s,
                            values.sorted().join(", ")
                        ),
                    );
                    Value::Null
                }
                None => self.invalid_type(raw, errors),
            },
            Self::EncryptedId(codec) => match raw.as_str() {
                Some(s) => match codec.decode(s).as_slice() {
                    [id] => Value::Id(*id),
                    _ => {
                        errors.add_error(ErrorCode::InvalidValue, format!("Invalid id \"{}\"", s));
                        Value::Null
                    }
                },
                None => self.invalid_type(raw, errors),
            },
            Self::Any => Value::Json(raw.clone()),
            Self::List(inner) => match raw.as_array() {
                Some(raw_items) => {
                    let mut items = Vec::with_capacity(raw_items.len());
                    let mut failed = false;
                    for (index, raw_item) in raw_items.iter().enumerate() {
                        let item_errors = errors.index(index);
                        items.push(inner.from_json(raw_item, item_errors, ctx));
                        failed |= item_errors.has_errors();
                    }
                    if failed {
                        Value::Null
                    } else {
                        Value::List(items)
                    }
                }
                None => self.invalid_type(raw, errors),
            },
            Self::Dict(inner) => match raw.as_object() {
                Some(raw_map) => {
                    let mut map = IndexMap::with_capacity(raw_map.len());
                    let mut failed = false;
                    for (key, raw_item) in raw_map {
                        let item_errors = errors.key(key.as_str());
                        map.insert(key.clone(), inner.from_json(raw_item, item_errors, ctx));
                        failed |= item_errors.has_errors();
                    }
                    if failed {
                        Value::Null
                    } else {
                        Value::Dict(map)
                    }
                }
                None => self.invalid_type(raw, errors),
            },
            Self::Model(schema) => schema
                .from_json(raw, errors, ctx)
                .map_or(Value::Null, Value::Model),
        }
    }

    /// Canonicalize a value assigned to a field of this type.
    ///
    /// Integers widen to floats or decimals, non-negative integers become
    /// ids, and containers are rebuilt element by element. Returns `None`
    /// when the value cannot be held by this type, so nothing is ever
    /// serialized in a shape the field does not declare.
    pub fn normalize(&self, value: Value) -> Option<Value> {
        let normalized = match (self, value) {
            (_, Value::Null) => Value::Null,
            (Self::Any, value) => value,
            (Self::Float, Value::Integer(i)) => Value::Float(i as f64),
            (Self::Decimal, Value::Integer(i)) => Value::Decimal(Decimal::from(i)),
            (Self::EncryptedId(_), Value::Integer(i)) if i >= 0 => Value::Id(i.unsigned_abs()),
            (Self::Enum(values), Value::String(s)) if values.contains(&s) => Value::String(s),
            (Self::List(inner), Value::List(items)) => Value::List(
                items
                    .into_iter()
                    .map(|item| inner.normalize(item))
                    .collect::<Option<_>>()?,
            ),
            (Self::Dict(inner), Value::Dict(map)) => Value::Dict(
                map.into_iter()
                    .map(|(key, item)| inner.normalize(item).map(|item| (key, item)))
                    .collect::<Option<_>>()?,
            ),
            (Self::Model(schema), Value::Model(model)) if model.name() == schema.name() => {
                Value::Model(model)
            }
            (Self::String, value @ Value::String(_))
            | (Self::Integer, value @ Value::Integer(_))
            | (Self::Float, value @ Value::Float(_))
            | (Self::Boolean, value @ Value::Bool(_))
            | (Self::Bytes, value @ Value::Bytes(_))
            | (Self::Date, value @ Value::Date(_))
            | (Self::DateTime, value @ Value::DateTime(_))
            | (Self::Decimal, value @ Value::Decimal(_))
            | (Self::EncryptedId(_), value @ Value::Id(_)) => value,
            _ => return None,
        };
        Some(normalized)
    }

    /// Debug rendering of a value of this type.
    ///
    /// `indent` is the indentation of the line the value starts on.
    pub fn render(&self, value: &Value, indent: &str) -> String {
        let nested = format!("{}  ", indent);
        match (self, value) {
            (_, Value::Null) => "null".into(),
            (_, Value::Model(model)) => model.render(indent),
            (Self::String, Value::String(s)) => format!("'{}'", s.replace('\'', "\\'")),
            (Self::List(inner), Value::List(items)) => {
                let mut out = String::from("[\n");
                for item in items {
                    out.push_str(&format!("{}{},\n", nested, inner.render(item, &nested)));
                }
                out.push_str(indent);
                out.push(']');
                out
            }
            (Self::Dict(inner), Value::Dict(map)) => {
                let mut out = String::from("{\n");
                for (key, item) in map {
                    out.push_str(&format!("{}\"{}\": {},\n", nested, key, inner.render(item, &nested)));
                }
                out.push_str(indent);
                out.push('}');
                out
            }
            (_, other) => other.to_string(),
        }
    }

    fn invalid_type(&self, raw: &JsonValue, errors: &mut ErrorContext) -> Value {
        errors.add_error(
            ErrorCode::InvalidType,
            format!(
                "Invalid type \"{}\", expected \"{}\"",
                json_type_name(raw),
                self.json_type()
            ),
        );
        Value::Null
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if !DATE_PATTERN.is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_datetime(s: &str) -> Option<DateTime<chrono::FixedOffset>> {
    if !DATETIME_PATTERN.is_match(s) {
        return None;
    }
    DateTime::parse_from_rfc3339(s).ok()
}
