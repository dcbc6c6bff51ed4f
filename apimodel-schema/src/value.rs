//! Parsed field values.
//!
//! A [`Value`] is the native form of a field after its JSON has been parsed
//! against a [`FieldType`](crate::FieldType). Enum members are carried as
//! strings and encrypted ids as decoded integers.

use std::cmp::Ordering;
use std::fmt;

use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Timelike};
use indexmap::IndexMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::model::Model;

/// A parsed field value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// String or enum member.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time with a UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Exact decimal.
    Decimal(Decimal),
    /// Decoded entity id.
    Id(u64),
    /// Unchecked JSON payload.
    Json(JsonValue),
    /// Ordered list.
    List(Vec<Value>),
    /// String-keyed dictionary, insertion ordered.
    Dict(IndexMap<String, Value>),
    /// Nested model instance.
    Model(Model),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value counts as empty for required-ness checks.
    ///
    /// `null`, `""`, empty lists, empty dictionaries and empty byte strings
    /// are empty. `0`, `0.0` and `false` are not. An unchecked JSON payload
    /// is empty when its JSON is.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::Bytes(b) => b.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Dict(map) => map.is_empty(),
            Self::Json(raw) => apimodel_core::is_empty_json(raw),
            _ => false,
        }
    }

    /// Short name of the variant, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Decimal(_) => "decimal",
            Self::Id(_) => "id",
            Self::Json(_) => "any",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Model(_) => "object",
        }
    }

    /// Borrow as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Read as a float. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Read as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read as a decoded id.
    pub fn as_id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// Read as a decimal.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Read as a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Read as a datetime.
    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Borrow as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a dictionary.
    pub fn as_dict(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as a nested model.
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Self::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Order two values of compatible kinds.
    ///
    /// Integers, floats and decimals compare numerically with each other.
    /// Strings, dates, datetimes and ids compare within their own kind.
    /// Anything else is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Integer(b)) => Some(a.cmp(&Decimal::from(*b))),
            (Self::Integer(a), Self::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
            (Self::Decimal(a), Self::Float(b)) => a.to_f64()?.partial_cmp(b),
            (Self::Float(a), Self::Decimal(b)) => a.partial_cmp(&b.to_f64()?),
            (Self::Integer(_) | Self::Float(_), Self::Integer(_) | Self::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Id(a), Self::Id(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Best-effort JSON form, used when no field type guides serialization.
    pub fn to_plain_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Integer(i) => JsonValue::from(*i),
            Self::Float(f) => JsonValue::from(*f),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Bytes(b) => JsonValue::String(base64::engine::general_purpose::STANDARD.encode(b)),
            Self::Date(d) => JsonValue::String(format_date(d)),
            Self::DateTime(dt) => JsonValue::String(format_datetime(dt)),
            Self::Decimal(d) => JsonValue::String(d.to_string()),
            Self::Id(id) => JsonValue::from(*id),
            Self::Json(raw) => raw.clone(),
            Self::List(items) => JsonValue::Array(items.iter().map(Value::to_plain_json).collect()),
            Self::Dict(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_plain_json()))
                    .collect(),
            ),
            Self::Model(m) => m.to_json(),
        }
    }
}

/// Wire form of a date: `YYYY-MM-DD`.
pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Wire form of a datetime: ISO 8601 with a `±HH:MM` offset.
///
/// Sub-second parts are written as microseconds, or nanoseconds when they
/// need the extra precision. Whole seconds carry no fraction.
pub(crate) fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    let format = match dt.nanosecond() {
        0 => SecondsFormat::Secs,
        n if n % 1_000 == 0 => SecondsFormat::Micros,
        _ => SecondsFormat::Nanos,
    };
    dt.to_rfc3339_opts(format, false)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
            Self::Bytes(b) => f.write_str(&base64::engine::general_purpose::STANDARD.encode(b)),
            Self::Date(d) => f.write_str(&format_date(d)),
            Self::DateTime(dt) => f.write_str(&format_datetime(dt)),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Id(id) => write!(f, "{}", id),
            Self::Json(raw) => write!(f, "{}", raw),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Dict(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                f.write_str("}")
            }
            Self::Model(m) => write!(f, "{}", m),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<Model> for Value {
    fn from(m: Model) -> Self {
        Self::Model(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> FromIterator<(String, T)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self::Dict(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
