//! Field validators.
//!
//! Validators run after a field's JSON has parsed cleanly and only when a
//! [`ValidationContext`] is supplied. Each one receives the parsed value and
//! returns either the (possibly replaced) value or [`Value::Null`] after
//! recording an error. The first validator that records an error ends the
//! chain for that field.

use std::fmt;
use std::sync::Arc;

use apimodel_core::{
    is_empty_json, ErrorCode, ErrorContext, MethodMatcher, SchemaError, ValidationContext,
};

use crate::value::Value;

/// Custom validation logic.
pub trait Validate: fmt::Debug + Send + Sync {
    /// Validate `value`, returning it or [`Value::Null`] after recording an error.
    fn validate(&self, value: Value, errors: &mut ErrorContext, ctx: &ValidationContext<'_>) -> Value;

    /// Documentation text for generated API docs.
    fn documentation(&self) -> String {
        String::new()
    }
}

/// Shared custom validator.
pub type BoxedValidate = Arc<dyn Validate>;

/// Validator built from a closure.
pub struct FnValidator<F> {
    func: F,
    documentation: String,
}

impl<F> FnValidator<F>
where
    F: Fn(Value, &mut ErrorContext, &ValidationContext<'_>) -> Value + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(func: F) -> Self {
        Self {
            func,
            documentation: String::new(),
        }
    }

    /// Attach documentation text.
    #[must_use]
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }
}

impl<F> Validate for FnValidator<F>
where
    F: Fn(Value, &mut ErrorContext, &ValidationContext<'_>) -> Value + Send + Sync,
{
    fn validate(&self, value: Value, errors: &mut ErrorContext, ctx: &ValidationContext<'_>) -> Value {
        (self.func)(value, errors, ctx)
    }

    fn documentation(&self) -> String {
        self.documentation.clone()
    }
}

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("documentation", &self.documentation)
            .finish_non_exhaustive()
    }
}

/// Inclusive bounds for [`Validator::Range`].
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    min: Option<Value>,
    max: Option<Value>,
}

impl Range {
    /// Create a range. At least one bound is required.
    pub fn new(min: Option<Value>, max: Option<Value>) -> Result<Self, SchemaError> {
        if min.is_none() && max.is_none() {
            return Err(SchemaError::RangeWithoutBounds);
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    pub fn min(&self) -> Option<&Value> {
        self.min.as_ref()
    }

    /// Upper bound.
    pub fn max(&self) -> Option<&Value> {
        self.max.as_ref()
    }

    fn documentation(&self) -> String {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => format!("Value must be between {} and {} (inclusive)", min, max),
            (Some(min), None) => format!("Value must be greater than or equal to {}", min),
            (None, Some(max)) => format!("Value must be less than or equal to {}", max),
            (None, None) => String::new(),
        }
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        use std::cmp::Ordering::{Greater, Less};

        if let Some(min) = &self.min {
            match value.compare(min) {
                Some(Less) => return Err(format!("Value {} is less than {}", value, min)),
                None => return Err(incomparable(value, min)),
                _ => {}
            }
        }
        if let Some(max) = &self.max {
            match value.compare(max) {
                Some(Greater) => return Err(format!("Value {} is greater than {}", value, max)),
                None => return Err(incomparable(value, max)),
                _ => {}
            }
        }
        Ok(())
    }
}

fn incomparable(value: &Value, bound: &Value) -> String {
    format!(
        "Value {} cannot be compared with {} bound {}",
        value,
        bound.kind(),
        bound
    )
}

/// A validation rule attached to a field.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Empty values are rejected on matching calls.
    Required(MethodMatcher),
    /// Values are silently dropped on matching calls.
    Readonly(MethodMatcher),
    /// Every list element must be nonempty.
    NonemptyElements,
    /// List elements must be distinct.
    Unique,
    /// The named attribute must be distinct across a list of models.
    UniqueFields(String),
    /// Value must lie within inclusive bounds.
    Range(Range),
    /// Exactly one of the named sibling attributes must be nonempty.
    ExactlyOneNonempty(Vec<String>),
    /// At most one of the named sibling attributes may be nonempty.
    AtMostOneNonempty(Vec<String>),
    /// Application-defined rule.
    Custom(BoxedValidate),
}

impl Validator {
    /// Required on every call.
    pub fn required() -> Self {
        Self::Required(MethodMatcher::All)
    }

    /// Required on calls matching any of `specs`.
    pub fn required_on<I, S>(specs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::Required(MethodMatcher::parse(specs)?))
    }

    /// Read-only on every call.
    pub fn readonly() -> Self {
        Self::Readonly(MethodMatcher::All)
    }

    /// Read-only on calls matching any of `specs`.
    pub fn readonly_on<I, S>(specs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::Readonly(MethodMatcher::parse(specs)?))
    }

    /// Distinct values of `field` across a list of models.
    pub fn unique_fields(field: impl Into<String>) -> Self {
        Self::UniqueFields(field.into())
    }

    /// Inclusive range. At least one bound is required.
    pub fn range(min: Option<Value>, max: Option<Value>) -> Result<Self, SchemaError> {
        Ok(Self::Range(Range::new(min, max)?))
    }

    /// Lower bound only.
    pub fn min(min: impl Into<Value>) -> Self {
        Self::Range(Range {
            min: Some(min.into()),
            max: None,
        })
    }

    /// Upper bound only.
    pub fn max(max: impl Into<Value>) -> Self {
        Self::Range(Range {
            min: None,
            max: Some(max.into()),
        })
    }

    /// Both bounds.
    pub fn between(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self::Range(Range {
            min: Some(min.into()),
            max: Some(max.into()),
        })
    }

    /// Exactly one of `fields` must be nonempty. List the owning field too.
    pub fn exactly_one_nonempty<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ExactlyOneNonempty(fields.into_iter().map(Into::into).collect())
    }

    /// At most one of `fields` may be nonempty. List the owning field too.
    pub fn at_most_one_nonempty<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AtMostOneNonempty(fields.into_iter().map(Into::into).collect())
    }

    /// Wrap a custom rule.
    pub fn custom(validator: impl Validate + 'static) -> Self {
        Self::Custom(Arc::new(validator))
    }

    /// Wrap a closure.
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(Value, &mut ErrorContext, &ValidationContext<'_>) -> Value + Send + Sync + 'static,
    {
        Self::custom(FnValidator::new(func))
    }

    /// Apply the rule.
    pub fn validate(&self, value: Value, errors: &mut ErrorContext, ctx: &ValidationContext<'_>) -> Value {
        match self {
            Self::Required(matcher) => {
                if value.is_empty() && matcher.matches_context(ctx) {
                    let message = if matcher.for_all_methods() {
                        "Field is required".to_string()
                    } else {
                        format!("Field is required on method(s) \"{}\"", matcher.methods().join(", "))
                    };
                    errors.add_error(ErrorCode::Required, message);
                    return Value::Null;
                }
                value
            }
            Self::Readonly(matcher) => {
                if matcher.matches_context(ctx) {
                    Value::Null
                } else {
                    value
                }
            }
            Self::NonemptyElements => {
                if let Value::List(items) = &value {
                    for (index, item) in items.iter().enumerate() {
                        if item.is_empty() {
                            errors.index(index).add_error(
                                ErrorCode::NonemptyItemRequired,
                                "Nonempty list elements are required",
                            );
                        }
                    }
                }
                finish(value, errors)
            }
            Self::Unique => {
                if let Value::List(items) = &value {
                    for (index, item) in items.iter().enumerate() {
                        if items[..index].contains(item) {
                            errors.index(index).add_error(
                                ErrorCode::DuplicateValue,
                                format!("Duplicate value found: \"{}\"", item),
                            );
                        }
                    }
                }
                finish(value, errors)
            }
            Self::UniqueFields(field) => {
                if let Value::List(items) = &value {
                    let mut seen: Vec<&Value> = Vec::new();
                    for (index, item) in items.iter().enumerate() {
                        let Some(item_value) = item.as_model().and_then(|m| m.get(field)) else {
                            continue;
                        };
                        if seen.contains(&item_value) {
                            errors.index(index).field(field.as_str()).add_error(
                                ErrorCode::DuplicateValue,
                                format!("Duplicate value found: \"{}\"", item_value),
                            );
                        }
                        seen.push(item_value);
                    }
                }
                finish(value, errors)
            }
            Self::Range(range) => {
                if value.is_null() {
                    return value;
                }
                match range.check(&value) {
                    Ok(()) => value,
                    Err(message) => {
                        errors.add_error(ErrorCode::ValueNotInRange, message);
                        Value::Null
                    }
                }
            }
            Self::ExactlyOneNonempty(fields) => match count_nonempty(fields, ctx) {
                0 => {
                    errors.add_error(ErrorCode::Required, exactly_one_message(fields));
                    Value::Null
                }
                1 => value,
                _ => {
                    errors.add_error(ErrorCode::Ambiguous, exactly_one_message(fields));
                    Value::Null
                }
            },
            Self::AtMostOneNonempty(fields) => {
                if count_nonempty(fields, ctx) > 1 {
                    errors.add_error(ErrorCode::Ambiguous, at_most_one_message(fields));
                    return Value::Null;
                }
                value
            }
            Self::Custom(validator) => validator.validate(value, errors, ctx),
        }
    }

    /// Documentation text for generated API docs.
    pub fn documentation(&self) -> String {
        match self {
            Self::Required(matcher) if matcher.for_all_methods() => "Value is required".into(),
            Self::Required(matcher) => {
                format!("Value is required for methods: {}", matcher.methods().join(", "))
            }
            Self::Readonly(matcher) if matcher.for_all_methods() => "Value is read-only".into(),
            Self::Readonly(matcher) => {
                format!("Value is read-only for methods: {}", matcher.methods().join(", "))
            }
            Self::NonemptyElements => "Nonempty elements are required".into(),
            Self::Unique => "Unique values are required".into(),
            Self::UniqueFields(field) => format!("Unique values for \"{}\" are required", field),
            Self::Range(range) => range.documentation(),
            Self::ExactlyOneNonempty(fields) => exactly_one_message(fields),
            Self::AtMostOneNonempty(fields) => at_most_one_message(fields),
            Self::Custom(validator) => validator.documentation(),
        }
    }
}

fn finish(value: Value, errors: &ErrorContext) -> Value {
    if errors.has_errors() {
        Value::Null
    } else {
        value
    }
}

fn count_nonempty(fields: &[String], ctx: &ValidationContext<'_>) -> usize {
    fields
        .iter()
        .filter(|name| ctx.sibling(name).is_some_and(|raw| !is_empty_json(raw)))
        .count()
}

fn exactly_one_message(fields: &[String]) -> String {
    format!("Exactly one of {} must be nonempty", fields.join(", "))
}

fn at_most_one_message(fields: &[String]) -> String {
    format!("At most one of {} must be nonempty", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, FieldType, Schema};
    use apimodel_core::ValidationError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{json, Value as JsonValue};

    fn run(validator: &Validator, value: Value, ctx: &ValidationContext<'_>) -> (Value, Vec<ValidationError>) {
        let mut root = ErrorContext::new();
        let out = validator.validate(value, root.field("lfoo"), ctx);
        (out, root.into_errors())
    }

    fn codes(errors: &[ValidationError]) -> Vec<ErrorCode> {
        errors.iter().map(|e| e.code.clone()).collect()
    }

    fn paths(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[rstest]
    #[case(Value::from(0))]
    #[case(Value::from(0.0))]
    #[case(Value::from(false))]
    #[case(Value::from("x"))]
    #[case(Value::from(vec![Value::Null]))]
    fn test_required_accepts_present_values(#[case] value: Value) {
        let (out, errors) = run(&Validator::required(), value.clone(), &ValidationContext::new());
        assert!(errors.is_empty());
        assert_eq!(out, value);
    }

    #[rstest]
    #[case(Value::Null)]
    #[case(Value::from(""))]
    #[case(Value::List(vec![]))]
    #[case(Value::Dict(Default::default()))]
    fn test_required_rejects_empty_values(#[case] value: Value) {
        let (out, errors) = run(&Validator::required(), value, &ValidationContext::new());
        assert_eq!(out, Value::Null);
        assert_eq!(codes(&errors), vec![ErrorCode::Required]);
        assert_eq!(errors[0].message, "Field is required");
    }

    #[test]
    fn test_required_on_method_only_applies_to_that_method() {
        let validator = Validator::required_on(["fooservice.insert/ADD"]).unwrap();
        let matching = ValidationContext::new()
            .with_service("fooservice")
            .with_method("insert")
            .with_operator("ADD");
        let (_, errors) = run(&validator, Value::Null, &matching);
        assert_eq!(
            errors[0].message,
            "Field is required on method(s) \"fooservice.insert/ADD\""
        );

        let other = ValidationContext::new().with_method("insert").with_operator("ADD");
        let (out, errors) = run(&validator, Value::from(""), &other);
        assert!(errors.is_empty());
        assert_eq!(out, Value::from(""));
    }

    #[test]
    fn test_readonly_drops_value_silently() {
        let validator = Validator::readonly_on(["update"]).unwrap();
        let update = ValidationContext::new().with_method("update");
        let (out, errors) = run(&validator, Value::from("keep me?"), &update);
        assert_eq!(out, Value::Null);
        assert!(errors.is_empty());

        let insert = ValidationContext::new().with_method("insert");
        assert_eq!(run(&validator, Value::from("kept"), &insert).0, Value::from("kept"));
    }

    #[test]
    fn test_nonempty_elements_checks_every_index() {
        let value = Value::from(vec![
            Value::from("foo"),
            Value::from(""),
            Value::from(0),
            Value::List(vec![]),
            Value::Null,
        ]);
        let (out, errors) = run(&Validator::NonemptyElements, value, &ValidationContext::new());
        assert_eq!(out, Value::Null);
        assert_eq!(paths(&errors), vec!["lfoo[1]", "lfoo[3]", "lfoo[4]"]);
        assert!(errors.iter().all(|e| e.code == ErrorCode::NonemptyItemRequired));
    }

    #[test]
    fn test_unique_flags_only_repeats() {
        let value = Value::from(vec![9, 8, 7, 6, 7, 8, 9]);
        let (out, errors) = run(&Validator::Unique, value, &ValidationContext::new());
        assert_eq!(out, Value::Null);
        assert_eq!(paths(&errors), vec!["lfoo[4]", "lfoo[5]", "lfoo[6]"]);
        assert_eq!(errors[0].message, "Duplicate value found: \"7\"");
    }

    #[test]
    fn test_unique_counts_repeated_nulls() {
        let value = Value::from(vec![Value::from("a"), Value::Null, Value::Null]);
        let (_, errors) = run(&Validator::Unique, value, &ValidationContext::new());
        assert_eq!(paths(&errors), vec!["lfoo[2]"]);
    }

    #[test]
    fn test_unique_passes_distinct_values() {
        let value = Value::from(vec!["a", "b"]);
        let (out, errors) = run(&Validator::Unique, value.clone(), &ValidationContext::new());
        assert!(errors.is_empty());
        assert_eq!(out, value);
    }

    fn items(raw: JsonValue) -> Value {
        let schema = Schema::builder("Item")
            .field("id", Field::new(FieldType::Integer))
            .field("foo", Field::new(FieldType::String))
            .build()
            .unwrap();
        FieldType::list(FieldType::model(&schema)).from_json(&raw, &mut ErrorContext::new(), None)
    }

    #[rstest]
    #[case(json!([]))]
    #[case(json!([{}, {}]))]
    #[case(json!([{"id": null}, {}]))]
    #[case(json!([{"id": 1}, {"id": null}]))]
    #[case(json!([{"id": 1}, {}, {"id": 3}]))]
    fn test_unique_fields_accepts(#[case] raw: JsonValue) {
        let (_, errors) = run(&Validator::unique_fields("id"), items(raw), &ValidationContext::new());
        assert!(errors.is_empty());
    }

    #[rstest]
    #[case(json!([{"id": 1}, {"id": 1}]), vec!["lfoo[1].id"])]
    #[case(json!([{"id": 1}, {"id": 1}, null, {"id": 1}]), vec!["lfoo[1].id", "lfoo[3].id"])]
    #[case(json!([{"id": null}, {"id": null}]), vec!["lfoo[1].id"])]
    fn test_unique_fields_rejects(#[case] raw: JsonValue, #[case] expected: Vec<&str>) {
        let (out, errors) = run(&Validator::unique_fields("id"), items(raw), &ValidationContext::new());
        assert_eq!(out, Value::Null);
        assert_eq!(paths(&errors), expected);
    }

    #[rstest]
    #[case(Validator::min(1), Value::from(1))]
    #[case(Validator::min(1), Value::from(1.1))]
    #[case(Validator::min(-0.5), Value::from(-0.1))]
    #[case(Validator::between(1, 3), Value::from(1))]
    #[case(Validator::between(1, 3), Value::from(3))]
    #[case(Validator::between(1, 3), Value::from(2.9))]
    #[case(Validator::max(-1), Value::from(-2))]
    #[case(Validator::between("a", "c"), Value::from("b"))]
    #[case(Validator::min(1), Value::Null)]
    fn test_range_accepts(#[case] validator: Validator, #[case] value: Value) {
        let (out, errors) = run(&validator, value.clone(), &ValidationContext::new());
        assert!(errors.is_empty());
        assert_eq!(out, value);
    }

    #[rstest]
    #[case(Validator::min(1), Value::from(0), "Value 0 is less than 1")]
    #[case(Validator::between(1, 3), Value::from(0.999), "Value 0.999 is less than 1")]
    #[case(Validator::between(1, 3), Value::from(3.001), "Value 3.001 is greater than 3")]
    #[case(Validator::max(10), Value::from(15.5), "Value 15.5 is greater than 10")]
    #[case(Validator::min(-5), Value::from(-5.0000001), "Value -5.0000001 is less than -5")]
    fn test_range_rejects(#[case] validator: Validator, #[case] value: Value, #[case] message: &str) {
        let (out, errors) = run(&validator, value, &ValidationContext::new());
        assert_eq!(out, Value::Null);
        assert_eq!(codes(&errors), vec![ErrorCode::ValueNotInRange]);
        assert_eq!(errors[0].message, message);
    }

    #[test]
    fn test_range_requires_a_bound() {
        assert_eq!(Validator::range(None, None).unwrap_err(), SchemaError::RangeWithoutBounds);
    }

    #[test]
    fn test_range_rejects_incomparable_values() {
        let (_, errors) = run(&Validator::min(1), Value::from("x"), &ValidationContext::new());
        assert_eq!(codes(&errors), vec![ErrorCode::ValueNotInRange]);
    }

    #[rstest]
    #[case(json!({"ids": [1, 2, 3], "user_ids": []}), None)]
    #[case(json!({"ids": null, "user_ids": [3]}), None)]
    #[case(json!({"ids": [1], "user_ids": [3]}), Some(ErrorCode::Ambiguous))]
    #[case(json!({"ids": null, "user_ids": null}), Some(ErrorCode::Required))]
    #[case(json!({}), Some(ErrorCode::Required))]
    fn test_exactly_one_nonempty(#[case] parent: JsonValue, #[case] expected: Option<ErrorCode>) {
        let validator = Validator::exactly_one_nonempty(["ids", "user_ids"]);
        let ctx = ValidationContext::new().derive(&parent);
        let (_, errors) = run(&validator, Value::Null, &ctx);
        assert_eq!(codes(&errors), expected.into_iter().collect::<Vec<_>>());
    }

    #[rstest]
    #[case(json!({"ids": [1, 2, 3], "user_ids": []}), false)]
    #[case(json!({"ids": null, "user_ids": null}), false)]
    #[case(json!({"ids": [1], "user_ids": [3]}), true)]
    fn test_at_most_one_nonempty(#[case] parent: JsonValue, #[case] ambiguous: bool) {
        let validator = Validator::at_most_one_nonempty(["ids", "user_ids"]);
        let ctx = ValidationContext::new().derive(&parent);
        let (_, errors) = run(&validator, Value::Null, &ctx);
        assert_eq!(!errors.is_empty(), ambiguous);
        if ambiguous {
            assert_eq!(errors[0].message, "At most one of ids, user_ids must be nonempty");
        }
    }

    #[test]
    fn test_custom_closure_validator() {
        let not_evil = Validator::from_fn(|value, errors, _ctx| {
            if value.as_str().is_some_and(|s| s.eq_ignore_ascii_case("evil")) {
                errors.add_error(ErrorCode::custom("EVIL_VALUE"), "An evil value was found");
                return Value::Null;
            }
            value
        });
        let (out, errors) = run(&not_evil, Value::from("EvIL"), &ValidationContext::new());
        assert_eq!(out, Value::Null);
        assert_eq!(codes(&errors), vec![ErrorCode::custom("EVIL_VALUE")]);
        assert_eq!(run(&not_evil, Value::from("good"), &ValidationContext::new()).0, Value::from("good"));
    }

    #[rstest]
    #[case(Validator::required(), "Value is required")]
    #[case(Validator::required_on(["mutate/ADD", "svc.get"]).unwrap(), "Value is required for methods: mutate/ADD, svc.get")]
    #[case(Validator::readonly(), "Value is read-only")]
    #[case(Validator::NonemptyElements, "Nonempty elements are required")]
    #[case(Validator::Unique, "Unique values are required")]
    #[case(Validator::unique_fields("id"), "Unique values for \"id\" are required")]
    #[case(Validator::between(1, 10), "Value must be between 1 and 10 (inclusive)")]
    #[case(Validator::min(0), "Value must be greater than or equal to 0")]
    #[case(Validator::max(3), "Value must be less than or equal to 3")]
    #[case(Validator::exactly_one_nonempty(["foo", "bar"]), "Exactly one of foo, bar must be nonempty")]
    #[case(Validator::at_most_one_nonempty(["foo", "bar"]), "At most one of foo, bar must be nonempty")]
    fn test_documentation(#[case] validator: Validator, #[case] expected: &str) {
        assert_eq!(validator.documentation(), expected);
    }
}
