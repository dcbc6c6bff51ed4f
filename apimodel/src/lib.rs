//! # apimodel - Typed API Models for Rust
//!
//! apimodel declares the request and response bodies of an HTTP/JSON API as
//! schemas, parses untrusted JSON into sparse typed instances, and reports
//! every problem at once with a path to the offending value.
//!
//! ## Quick Start
//!
//! ```rust
//! use apimodel::prelude::*;
//! use serde_json::json;
//!
//! let user = Schema::builder("User")
//!     .field("name", Field::new(FieldType::String).required())
//!     .field(
//!         "emails",
//!         Field::new(FieldType::list(FieldType::String)).validator(Validator::Unique),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let ctx = ValidationContext::new().with_service("users").with_method("insert");
//! let err = user
//!     .parse_validated(&json!({"emails": ["a@x", "a@x"]}), &ctx)
//!     .unwrap_err();
//!
//! let response = error_response(&err.errors).unwrap();
//! assert_eq!(response.to_json()["response_code"], "REQUEST_ERROR");
//! ```
//!
//! ## Architecture
//!
//! - [`apimodel_core`] - Error codes, error and validation contexts, method
//!   matchers and id codecs
//! - [`apimodel_schema`] - Field types, validators, schemas and models
//! - [`service_models`] - Operations, ordering, pagination and the response
//!   envelope shared by most services

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod service_models;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Foundational types.
pub use apimodel_core as core;

/// Schema engine.
pub use apimodel_schema as schema;

// ============================================================================
// Flat Re-exports
// ============================================================================

// Errors
pub use apimodel_core::{
    CodecError, DeserializationError, ErrorCode, ModelError, SchemaError, ValidationError,
};

// Contexts and matching
pub use apimodel_core::{ErrorContext, MethodMatcher, MethodSpec, PathSegment, ValidationContext};

// Ids
pub use apimodel_core::{BoxedIdCodec, CodecSettings, HashidsCodec, IdCodec};

// Schemas
pub use apimodel_schema::{
    document, document_all, global_registry, referenced_schemas, EnumValues, Field, FieldDoc,
    FieldType, FnValidator, Model, Range, Schema, SchemaBuilder, SchemaDoc, SchemaRegistry,
    Validate, Validator, Value,
};

// Service models
pub use service_models::{error_response, Operator, OrderingDirection, ResponseCode};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::service_models::{error_response, Operator, OrderingDirection, ResponseCode};
    pub use apimodel_schema::prelude::*;
}
