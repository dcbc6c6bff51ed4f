//! Schema attributes.

use apimodel_core::{ErrorContext, MethodMatcher, SchemaError, ValidationContext};
use serde_json::Value as JsonValue;

use crate::types::FieldType;
use crate::validators::Validator;
use crate::value::Value;

/// One schema attribute: a [`FieldType`] plus its validator chain.
///
/// `required` and `readonly` declarations become implicit validators that run
/// before any explicit ones, in that order.
///
/// # Example
///
/// ```rust
/// use apimodel_schema::{Field, FieldType, Validator};
///
/// let field = Field::new(FieldType::list(FieldType::Integer))
///     .required_on(["insert"])
///     .unwrap()
///     .validator(Validator::Unique);
/// assert_eq!(field.validator_chain().count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    field_type: FieldType,
    required: Option<Validator>,
    readonly: Option<Validator>,
    validators: Vec<Validator>,
    description: Option<String>,
}

impl Field {
    /// Create a field with no validators.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: None,
            readonly: None,
            validators: Vec::new(),
            description: None,
        }
    }

    /// Require a nonempty value on every call.
    #[must_use]
    pub fn required(self) -> Self {
        self.required_for(MethodMatcher::All)
    }

    /// Require a nonempty value on calls matching `matcher`.
    #[must_use]
    pub fn required_for(mut self, matcher: MethodMatcher) -> Self {
        self.required = Some(Validator::Required(matcher));
        self
    }

    /// Require a nonempty value on calls matching any of `specs`.
    pub fn required_on<I, S>(self, specs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.required_for(MethodMatcher::parse(specs)?))
    }

    /// Drop the value on every call.
    #[must_use]
    pub fn readonly(self) -> Self {
        self.readonly_for(MethodMatcher::All)
    }

    /// Drop the value on calls matching `matcher`.
    #[must_use]
    pub fn readonly_for(mut self, matcher: MethodMatcher) -> Self {
        self.readonly = Some(Validator::Readonly(matcher));
        self
    }

    /// Drop the value on calls matching any of `specs`.
    pub fn readonly_on<I, S>(self, specs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.readonly_for(MethodMatcher::parse(specs)?))
    }

    /// Append an explicit validator.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Append several explicit validators.
    #[must_use]
    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Set the documentation text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The field's type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Documentation text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Matcher of the implicit required rule, if declared.
    pub fn required_matcher(&self) -> Option<&MethodMatcher> {
        match &self.required {
            Some(Validator::Required(matcher)) => Some(matcher),
            _ => None,
        }
    }

    /// Matcher of the implicit read-only rule, if declared.
    pub fn readonly_matcher(&self) -> Option<&MethodMatcher> {
        match &self.readonly {
            Some(Validator::Readonly(matcher)) => Some(matcher),
            _ => None,
        }
    }

    /// Validators in execution order: required, read-only, then explicit ones.
    pub fn validator_chain(&self) -> impl Iterator<Item = &Validator> {
        self.required
            .iter()
            .chain(self.readonly.iter())
            .chain(self.validators.iter())
    }

    /// Serialize a value of this field.
    pub fn to_json(&self, value: &Value) -> JsonValue {
        self.field_type.to_json(value)
    }

    /// Parse and validate raw JSON for this field.
    ///
    /// Type errors stop processing. Validators only run when `ctx` is given,
    /// and the first one to record an error ends the chain.
    pub fn from_json(
        &self,
        raw: &JsonValue,
        errors: &mut ErrorContext,
        ctx: Option<&ValidationContext<'_>>,
    ) -> Value {
        let parsed = self.field_type.from_json(raw, errors, ctx);
        if errors.has_errors() {
            return Value::Null;
        }
        let Some(ctx) = ctx else {
            return parsed;
        };

        let mut value = parsed;
        for validator in self.validator_chain() {
            value = validator.validate(value, errors, ctx);
            if errors.has_errors() {
                return Value::Null;
            }
        }
        value
    }

    /// Canonicalize an assigned value, or `None` if the type cannot hold it.
    pub fn normalize(&self, value: Value) -> Option<Value> {
        self.field_type.normalize(value)
    }

    /// Debug rendering of a value of this field.
    pub fn render(&self, value: &Value, indent: &str) -> String {
        self.field_type.render(value, indent)
    }
}
