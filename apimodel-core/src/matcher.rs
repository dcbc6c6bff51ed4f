//! Method applicability rules.
//!
//! Rules such as "required on insert" are scoped with method specs of the
//! form `[service.]method[/operator]`. A missing service or operator acts as
//! a wildcard for that dimension.

use std::fmt;
use std::str::FromStr;

use crate::context::ValidationContext;
use crate::errors::SchemaError;

/// One parsed `[service.]method[/operator]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSpec {
    service: Option<String>,
    method: String,
    operator: Option<String>,
}

impl MethodSpec {
    /// Create a spec that matches `method` on any service and operator.
    pub fn method(method: impl Into<String>) -> Self {
        Self {
            service: None,
            method: method.into(),
            operator: None,
        }
    }

    /// Restrict the spec to one service.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Restrict the spec to one operator.
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Service restriction, if any.
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Method name.
    pub fn method_name(&self) -> &str {
        &self.method
    }

    /// Operator restriction, if any.
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// Whether a call matches this triple.
    pub fn matches(&self, service: Option<&str>, method: Option<&str>, operator: Option<&str>) -> bool {
        method == Some(self.method.as_str())
            && self.service.as_deref().map_or(true, |s| service == Some(s))
            && self.operator.as_deref().map_or(true, |o| operator == Some(o))
    }
}

impl FromStr for MethodSpec {
    type Err = SchemaError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidMethodSpec(spec.to_string());

        let (head, operator) = match spec.split_once('/') {
            Some((head, operator)) => (head, Some(operator)),
            None => (spec, None),
        };
        let (service, method) = match head.split_once('.') {
            Some((service, method)) => (Some(service), method),
            None => (None, head),
        };

        let well_formed = |part: &str| !part.is_empty() && !part.contains(['.', '/']);
        if !well_formed(method)
            || !service.map_or(true, well_formed)
            || !operator.map_or(true, well_formed)
        {
            return Err(invalid());
        }

        Ok(Self {
            service: service.map(str::to_string),
            method: method.to_string(),
            operator: operator.map(str::to_string),
        })
    }
}

impl fmt::Display for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(service) = &self.service {
            write!(f, "{}.", service)?;
        }
        f.write_str(&self.method)?;
        if let Some(operator) = &self.operator {
            write!(f, "/{}", operator)?;
        }
        Ok(())
    }
}

/// Predicate over (service, method, operator).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MethodMatcher {
    /// Matches every invocation.
    #[default]
    All,
    /// Matches invocations covered by at least one spec.
    Only(Vec<MethodSpec>),
}

impl MethodMatcher {
    /// Matcher that applies to every call.
    pub fn all() -> Self {
        Self::All
    }

    /// Parse a list of spec strings.
    ///
    /// An empty list applies to every call.
    pub fn parse<I, S>(specs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let specs = specs
            .into_iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<MethodSpec>, _>>()?;
        if specs.is_empty() {
            Ok(Self::All)
        } else {
            Ok(Self::Only(specs))
        }
    }

    /// Whether this matcher applies to every call.
    pub fn for_all_methods(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Parsed specs. Empty for [`MethodMatcher::All`].
    pub fn specs(&self) -> &[MethodSpec] {
        match self {
            Self::All => &[],
            Self::Only(specs) => specs,
        }
    }

    /// Specs rendered back to their string form.
    pub fn methods(&self) -> Vec<String> {
        self.specs().iter().map(ToString::to_string).collect()
    }

    /// Whether a call matches.
    ///
    /// A call with no service, method or operator never matches a scoped matcher.
    pub fn matches(&self, service: Option<&str>, method: Option<&str>, operator: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(_) if service.is_none() && method.is_none() && operator.is_none() => false,
            Self::Only(specs) => specs.iter().any(|spec| spec.matches(service, method, operator)),
        }
    }

    /// Whether the call described by a validation context matches.
    pub fn matches_context(&self, ctx: &ValidationContext<'_>) -> bool {
        self.matches(ctx.service(), ctx.method(), ctx.operator())
    }
}

impl FromStr for MethodMatcher {
    type Err = SchemaError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        Ok(Self::Only(vec![spec.parse()?]))
    }
}

impl From<MethodSpec> for MethodMatcher {
    fn from(spec: MethodSpec) -> Self {
        Self::Only(vec![spec])
    }
}

impl From<Vec<MethodSpec>> for MethodMatcher {
    fn from(specs: Vec<MethodSpec>) -> Self {
        if specs.is_empty() {
            Self::All
        } else {
            Self::Only(specs)
        }
    }
}
