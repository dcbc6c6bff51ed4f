//! Hierarchical error accumulation.
//!
//! An [`ErrorContext`] is a tree node bound to a structural path. Parsing code
//! calls [`ErrorContext::extend`] once per nested location it visits and
//! records errors on the returned child. Errors are read back in pre-order:
//! a node's own errors first, then each child's in creation order.

use std::fmt;

use crate::errors::{ErrorCode, ValidationError};

/// One step in an error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object attribute, rendered as `parent.name`.
    Field(String),
    /// List position, rendered as `parent[3]`.
    Index(usize),
    /// Dictionary key, rendered as `parent["key"]`.
    Key(String),
}

impl PathSegment {
    fn append_to(&self, base: &str) -> String {
        match self {
            Self::Field(name) if base.is_empty() => name.clone(),
            Self::Field(name) => format!("{}.{}", base, name),
            Self::Index(index) => format!("{}[{}]", base, index),
            Self::Key(key) => format!("{}[\"{}\"]", base, key),
        }
    }
}

/// Mutable error sink scoped to one path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    path: String,
    errors: Vec<ValidationError>,
    children: Vec<ErrorContext>,
}

impl ErrorContext {
    /// Create a root context with an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context rooted at an explicit path.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// The path this context reports errors at.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Append a child context for `segment` and return it.
    pub fn extend(&mut self, segment: PathSegment) -> &mut ErrorContext {
        let child = ErrorContext::with_path(segment.append_to(&self.path));
        let position = self.children.len();
        self.children.push(child);
        &mut self.children[position]
    }

    /// Shorthand for `extend(PathSegment::Field(..))`.
    pub fn field(&mut self, name: impl Into<String>) -> &mut ErrorContext {
        self.extend(PathSegment::Field(name.into()))
    }

    /// Shorthand for `extend(PathSegment::Index(..))`.
    pub fn index(&mut self, index: usize) -> &mut ErrorContext {
        self.extend(PathSegment::Index(index))
    }

    /// Shorthand for `extend(PathSegment::Key(..))`.
    pub fn key(&mut self, key: impl Into<String>) -> &mut ErrorContext {
        self.extend(PathSegment::Key(key.into()))
    }

    /// Record an error at this node's path.
    pub fn add_error(&mut self, code: ErrorCode, message: impl Into<String>) -> &mut Self {
        self.errors
            .push(ValidationError::new(self.path.clone(), code, message));
        self
    }

    /// Errors recorded directly on this node.
    pub fn local_errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Child contexts in creation order.
    pub fn children(&self) -> &[ErrorContext] {
        &self.children
    }

    /// Whether this node or any descendant holds an error.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.children.iter().any(ErrorContext::has_errors)
    }

    /// Total number of errors in the subtree.
    pub fn error_count(&self) -> usize {
        self.errors.len() + self.children.iter().map(ErrorContext::error_count).sum::<usize>()
    }

    /// All errors in the subtree, pre-order.
    pub fn all_errors(&self) -> Vec<ValidationError> {
        let mut out = Vec::with_capacity(self.error_count());
        self.collect_into(&mut out);
        out
    }

    /// Consume the tree and return its errors, pre-order.
    pub fn into_errors(self) -> Vec<ValidationError> {
        let mut out = self.errors;
        for child in self.children {
            out.extend(child.into_errors());
        }
        out
    }

    fn collect_into(&self, out: &mut Vec<ValidationError>) {
        out.extend(self.errors.iter().cloned());
        for child in &self.children {
            child.collect_into(out);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self
            .all_errors()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "<ErrorContext: {}>", errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn paths(ctx: &ErrorContext) -> Vec<String> {
        ctx.all_errors().into_iter().map(|e| e.path).collect()
    }

    #[rstest]
    #[case(vec![PathSegment::Field("foo".into())], "foo")]
    #[case(vec![PathSegment::Field("foo".into()), PathSegment::Field("bar".into())], "foo.bar")]
    #[case(vec![PathSegment::Field("foo".into()), PathSegment::Index(1)], "foo[1]")]
    #[case(vec![PathSegment::Field("foo".into()), PathSegment::Key("k".into())], "foo[\"k\"]")]
    #[case(
        vec![
            PathSegment::Field("lchild".into()),
            PathSegment::Index(1),
            PathSegment::Field("lstring".into()),
            PathSegment::Index(3),
        ],
        "lchild[1].lstring[3]"
    )]
    #[case(vec![PathSegment::Index(0)], "[0]")]
    fn test_path_syntax(#[case] segments: Vec<PathSegment>, #[case] expected: &str) {
        let mut root = ErrorContext::new();
        let mut ctx = &mut root;
        for segment in segments {
            ctx = ctx.extend(segment);
        }
        assert_eq!(ctx.path(), expected);
    }

    #[test]
    fn test_errors_are_pre_order() {
        let mut root = ErrorContext::new();
        root.field("b").add_error(ErrorCode::Required, "first child");
        {
            let a = root.field("a");
            a.index(0).add_error(ErrorCode::InvalidType, "grandchild");
            a.add_error(ErrorCode::InvalidValue, "local to a");
        }
        root.add_error(ErrorCode::UnknownField, "root");

        assert_eq!(paths(&root), vec!["", "b", "a", "a[0]"]);
        assert_eq!(root.error_count(), 4);
        assert_eq!(root.clone().into_errors(), root.all_errors());
    }

    #[test]
    fn test_has_errors_is_recursive() {
        let mut root = ErrorContext::new();
        root.field("quiet");
        assert!(!root.has_errors());

        root.field("loud").key("x").add_error(ErrorCode::Ambiguous, "boom");
        assert!(root.has_errors());
        assert!(root.local_errors().is_empty());
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn test_display_lists_errors() {
        let mut root = ErrorContext::new();
        root.field("f").add_error(ErrorCode::Required, "Field is required");
        assert_eq!(
            root.to_string(),
            "<ErrorContext: REQUIRED at \"f\" - Field is required>"
        );
    }
}
