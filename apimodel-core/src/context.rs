//! Per-call validation context.

use serde_json::Value as JsonValue;

/// Describes the API call a payload is being validated for.
///
/// The context is threaded through the recursive parse. Each time parsing
/// descends into a nested object a new context is derived whose `parent`
/// is that object's *raw* JSON, so validators can inspect sibling values
/// that have not been parsed yet.
///
/// # Example
///
/// ```rust
/// use apimodel_core::ValidationContext;
///
/// let ctx = ValidationContext::new()
///     .with_service("fooservice")
///     .with_method("insert")
///     .with_operator("ADD");
/// assert_eq!(ctx.method(), Some("insert"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationContext<'a> {
    service: Option<String>,
    method: Option<String>,
    operator: Option<String>,
    parent: Option<&'a JsonValue>,
}

impl ValidationContext<'static> {
    /// Create an empty context that matches no method-scoped rule.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> ValidationContext<'a> {
    /// Set the service name.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the method name.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the operator.
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Service being invoked.
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Method being invoked.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Operator of the enclosing operation, if any.
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// Raw JSON of the object currently being parsed.
    pub fn parent(&self) -> Option<&'a JsonValue> {
        self.parent
    }

    /// Raw JSON of a sibling attribute in the enclosing object.
    pub fn sibling(&self, name: &str) -> Option<&'a JsonValue> {
        self.parent.and_then(|parent| parent.get(name))
    }

    /// Derive a context for a nested object, keeping service, method and operator.
    pub fn derive<'b>(&self, parent: &'b JsonValue) -> ValidationContext<'b> {
        ValidationContext {
            service: self.service.clone(),
            method: self.method.clone(),
            operator: self.operator.clone(),
            parent: Some(parent),
        }
    }

    /// Derive a context for a nested object that carries its own operator.
    pub fn derive_with_operator<'b>(
        &self,
        parent: &'b JsonValue,
        operator: Option<&str>,
    ) -> ValidationContext<'b> {
        ValidationContext {
            operator: operator.map(str::to_string),
            ..self.derive(parent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_derive_keeps_call_identity() {
        let ctx = ValidationContext::new()
            .with_service("fooservice")
            .with_method("insert");
        let raw = json!({"a": 1, "b": null});
        let child = ctx.derive(&raw);

        assert_eq!(child.service(), Some("fooservice"));
        assert_eq!(child.method(), Some("insert"));
        assert_eq!(child.operator(), None);
        assert_eq!(child.parent(), Some(&raw));
        assert_eq!(child.sibling("a"), Some(&json!(1)));
        assert_eq!(child.sibling("missing"), None);
    }

    #[test]
    fn test_derive_with_operator_replaces_operator() {
        let ctx = ValidationContext::new()
            .with_method("mutate")
            .with_operator("UPDATE");
        let raw = json!({"operator": "ADD"});

        let child = ctx.derive_with_operator(&raw, Some("ADD"));
        assert_eq!(child.operator(), Some("ADD"));
        assert_eq!(child.method(), Some("mutate"));

        let cleared = ctx.derive_with_operator(&raw, None);
        assert_eq!(cleared.operator(), None);
    }

    #[test]
    fn test_new_context_has_no_parent() {
        let ctx = ValidationContext::new();
        assert!(ctx.parent().is_none());
        assert!(ctx.sibling("x").is_none());
    }
}
