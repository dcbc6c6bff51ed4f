//! Error types for apimodel.
//!
//! Validation problems are plain data ([`ValidationError`]) collected into an
//! [`ErrorContext`](crate::ErrorContext) while a payload is walked. Only the
//! outermost parse turns a non-empty error list into a
//! [`DeserializationError`]. Mistakes in schema declarations and codec
//! configuration are reported through [`SchemaError`] and [`CodecError`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Machine-readable code attached to every validation error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The JSON shape does not match the declared type.
    InvalidType,
    /// The JSON shape is right but the content cannot be parsed or is out of domain.
    InvalidValue,
    /// A JSON object key that the schema does not declare.
    UnknownField,
    /// A value is missing or empty where the current operation mandates it.
    Required,
    /// More than one member of a mutually exclusive group is set.
    Ambiguous,
    /// A list contains an empty element.
    NonemptyItemRequired,
    /// A value appears more than once where uniqueness is required.
    DuplicateValue,
    /// A value falls outside its declared bounds.
    ValueNotInRange,
    /// Two fields repeat each other where they must differ.
    Repeated,
    /// Application-defined code.
    Custom(String),
}

impl ErrorCode {
    /// The wire representation of this code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidType => "INVALID_TYPE",
            Self::InvalidValue => "INVALID_VALUE",
            Self::UnknownField => "UNKNOWN_FIELD",
            Self::Required => "REQUIRED",
            Self::Ambiguous => "AMBIGUOUS",
            Self::NonemptyItemRequired => "NONEMPTY_ITEM_REQUIRED",
            Self::DuplicateValue => "DUPLICATE_VALUE",
            Self::ValueNotInRange => "VALUE_NOT_IN_RANGE",
            Self::Repeated => "REPEATED",
            Self::Custom(code) => code,
        }
    }

    /// Create an application-defined code.
    pub fn custom(code: impl Into<String>) -> Self {
        Self::Custom(code.into())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ErrorCode {
    fn from(s: &str) -> Self {
        match s {
            "INVALID_TYPE" => Self::InvalidType,
            "INVALID_VALUE" => Self::InvalidValue,
            "UNKNOWN_FIELD" => Self::UnknownField,
            "REQUIRED" => Self::Required,
            "AMBIGUOUS" => Self::Ambiguous,
            "NONEMPTY_ITEM_REQUIRED" => Self::NonemptyItemRequired,
            "DUPLICATE_VALUE" => Self::DuplicateValue,
            "VALUE_NOT_IN_RANGE" => Self::ValueNotInRange,
            "REPEATED" => Self::Repeated,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl FromStr for ErrorCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// A single validation failure at a structural path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path of the offending value, e.g. `lchild[1].fint`.
    pub path: String,
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(path: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at \"{}\" - {}", self.code, self.path, self.message)
    }
}

/// Aggregate failure raised by a root-level parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct DeserializationError {
    /// Every error found, in traversal order.
    pub errors: Vec<ValidationError>,
}

impl DeserializationError {
    /// Wrap a flattened error list.
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the error list is empty.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors carrying the given code.
    pub fn with_code<'a>(&'a self, code: &'a ErrorCode) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| &e.code == code)
    }
}

impl fmt::Display for DeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deserialization failed with {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

/// Mistakes in a schema declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field name is declared twice, possibly across inheritance.
    #[error("Duplicate field \"{field}\" in schema \"{schema}\"")]
    DuplicateField {
        /// Schema being built.
        schema: String,
        /// Colliding field name.
        field: String,
    },

    /// A method spec string does not follow `[service.]method[/operator]`.
    #[error("Invalid method spec \"{0}\"")]
    InvalidMethodSpec(String),

    /// A range validator needs at least one bound.
    #[error("Range requires a min or a max")]
    RangeWithoutBounds,

    /// An enum type needs at least one value.
    #[error("Enum requires at least one value")]
    EmptyEnum,

    /// A schema with this name is already registered.
    #[error("Schema \"{0}\" is already registered")]
    DuplicateSchema(String),
}

/// Errors from building or reading model instances.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Attempt to set an attribute the schema does not declare.
    #[error("Unknown field \"{0}\"")]
    UnknownField(String),

    /// Attempt to assign a value the field's type cannot hold.
    #[error("Invalid value for field \"{field}\": expected {expected}, got {actual}")]
    InvalidValue {
        /// Attribute name.
        field: String,
        /// Declared type name.
        expected: String,
        /// Kind of the rejected value.
        actual: String,
    },

    /// Root-level parse failure.
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    /// Malformed JSON text.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Id codec setup and encoding failures.
///
/// These are configuration problems, never validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Missing or unusable codec configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CodecError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type alias for schema declarations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::InvalidType, "INVALID_TYPE")]
    #[case(ErrorCode::NonemptyItemRequired, "NONEMPTY_ITEM_REQUIRED")]
    #[case(ErrorCode::ValueNotInRange, "VALUE_NOT_IN_RANGE")]
    #[case(ErrorCode::custom("NOT_EVIL"), "NOT_EVIL")]
    fn test_error_code_wire_form(#[case] code: ErrorCode, #[case] wire: &str) {
        assert_eq!(code.as_str(), wire);
        assert_eq!(wire.parse::<ErrorCode>().unwrap(), code);
    }

    #[test]
    fn test_validation_error_serializes_code_as_string() {
        let err = ValidationError::new("foo[0]", ErrorCode::DuplicateValue, "Duplicate value found: \"a\"");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "path": "foo[0]",
                "code": "DUPLICATE_VALUE",
                "message": "Duplicate value found: \"a\""
            })
        );
        assert_eq!(
            err.to_string(),
            "DUPLICATE_VALUE at \"foo[0]\" - Duplicate value found: \"a\""
        );
    }

    #[test]
    fn test_deserialization_error_display() {
        let err = DeserializationError::new(vec![
            ValidationError::new("a", ErrorCode::Required, "Field is required"),
            ValidationError::new("b", ErrorCode::UnknownField, "Unknown field \"b\""),
        ]);
        assert_eq!(err.len(), 2);
        assert_eq!(err.with_code(&ErrorCode::Required).count(), 1);
        assert!(err.to_string().starts_with("Deserialization failed with 2 error(s)"));
    }

    #[test]
    fn test_model_error_unknown_field_message() {
        assert_eq!(ModelError::UnknownField("foo".into()).to_string(), "Unknown field \"foo\"");
    }

    #[test]
    fn test_model_error_invalid_value_message() {
        let err = ModelError::InvalidValue {
            field: "id".into(),
            expected: "id".into(),
            actual: "integer".into(),
        };
        assert_eq!(err.to_string(), "Invalid value for field \"id\": expected id, got integer");
    }
}
