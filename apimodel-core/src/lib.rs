//! # apimodel-core
//!
//! Foundational types shared by every apimodel crate:
//!
//! - **Errors**: error codes, path-annotated validation errors and the
//!   aggregate failure raised by root-level parses
//! - **Error contexts**: a tree that turns nested parse locations into
//!   paths such as `lchild[1].lstring[3]`
//! - **Validation contexts**: the service, method and operator a payload is
//!   validated for
//! - **Method matchers**: `[service.]method[/operator]` applicability rules
//! - **Id codecs**: reversible id obfuscation and its configuration
//!
//! ## Example
//!
//! ```rust
//! use apimodel_core::{ErrorCode, ErrorContext, MethodMatcher, ValidationContext};
//!
//! let mut errors = ErrorContext::new();
//! errors
//!     .field("items")
//!     .index(2)
//!     .add_error(ErrorCode::InvalidType, "Invalid type \"string\", expected \"integer\"");
//! assert_eq!(errors.all_errors()[0].path, "items[2]");
//!
//! let matcher: MethodMatcher = "fooservice.insert/ADD".parse().unwrap();
//! let ctx = ValidationContext::new()
//!     .with_service("fooservice")
//!     .with_method("insert")
//!     .with_operator("ADD");
//! assert!(matcher.matches_context(&ctx));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod context;
pub mod error_context;
pub mod errors;
pub mod json;
pub mod matcher;
pub mod settings;

// Re-exports for convenience
pub use codec::{BoxedIdCodec, HashidsCodec, IdCodec};
pub use context::ValidationContext;
pub use error_context::{ErrorContext, PathSegment};
pub use errors::{
    CodecError, DeserializationError, ErrorCode, ModelError, Result, SchemaError, ValidationError,
};
pub use json::{is_empty_json, json_type_name};
pub use matcher::{MethodMatcher, MethodSpec};
pub use settings::CodecSettings;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        CodecSettings, DeserializationError, ErrorCode, ErrorContext, HashidsCodec, IdCodec,
        MethodMatcher, ModelError, PathSegment, SchemaError, ValidationContext, ValidationError,
    };
}
