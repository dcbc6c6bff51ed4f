//! # apimodel-schema
//!
//! Schema definitions and the JSON walk that turns untrusted request bodies
//! into typed [`Model`] instances.
//!
//! Parsing collects every problem in one pass instead of stopping at the
//! first: each error carries the path of the offending value, so a client
//! gets `lchild[1].fint` rather than "invalid request".
//!
//! ## Core Concepts
//!
//! - **[`FieldType`]**: how a value looks on the wire and in memory
//! - **[`Field`]**: a type plus its validator chain
//! - **[`Validator`]**: business rules scoped to service calls
//! - **[`Schema`]**: an ordered set of fields, built once and shared
//! - **[`Model`]**: a sparse schema instance
//!
//! ## Example
//!
//! ```rust
//! use apimodel_schema::prelude::*;
//! use serde_json::json;
//!
//! let item = Schema::builder("Item")
//!     .field("sku", Field::new(FieldType::String).required_on(["insert"]).unwrap())
//!     .field(
//!         "quantity",
//!         Field::new(FieldType::Integer).validator(Validator::min(1)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let ctx = ValidationContext::new().with_method("insert");
//! let err = item
//!     .parse_validated(&json!({"quantity": 0}), &ctx)
//!     .unwrap_err();
//!
//! let paths: Vec<&str> = err.errors.iter().map(|e| e.path.as_str()).collect();
//! assert_eq!(paths, vec!["sku", "quantity"]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod field;
pub mod meta;
pub mod model;
pub mod registry;
pub mod schema;
pub mod types;
pub mod validators;
pub mod value;

// Re-exports for convenience
pub use field::Field;
pub use meta::{document, document_all, referenced_schemas, FieldDoc, SchemaDoc};
pub use model::Model;
pub use registry::{global_registry, SchemaRegistry};
pub use schema::{Schema, SchemaBuilder};
pub use types::{EnumValues, FieldType};
pub use validators::{BoxedValidate, FnValidator, Range, Validate, Validator};
pub use value::Value;

pub use apimodel_core;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{Field, FieldType, Model, Schema, Validate, Validator, Value};
    pub use apimodel_core::prelude::*;
}
