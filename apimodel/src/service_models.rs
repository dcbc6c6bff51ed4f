//! Schemas shared by most services: operations, ordering, pagination and
//! the standard response envelope.

use std::fmt;
use std::sync::{Arc, LazyLock};

use apimodel_core::{ModelError, ValidationError};
use apimodel_schema::{Field, FieldType, Model, Schema, Validator, Value};
use tracing::debug;

/// Mutation kind carried by an [`OPERATION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Create an entity.
    Add,
    /// Modify an entity.
    Update,
    /// Remove an entity.
    Delete,
}

impl Operator {
    /// All operators in wire order.
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Update, Operator::Delete];

    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// Sort direction of an [`ORDERING_CRITERION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderingDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl OrderingDirection {
    /// All directions in wire order.
    pub const ALL: [OrderingDirection; 2] = [OrderingDirection::Asc, OrderingDirection::Desc];

    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Outcome of a service call, carried in `response_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// The call succeeded.
    Success,
    /// The service failed.
    ServerError,
    /// The request was rejected.
    RequestError,
}

impl ResponseCode {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::ServerError => "SERVER_ERROR",
            Self::RequestError => "REQUEST_ERROR",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(Operator, OrderingDirection, ResponseCode);

fn enumeration(values: impl IntoIterator<Item = &'static str>) -> FieldType {
    FieldType::enumeration(values).expect("standard enums are nonempty")
}

fn build(builder: apimodel_schema::SchemaBuilder) -> Arc<Schema> {
    builder.build().expect("standard schemas have unique fields")
}

/// Base schema for mutations; its `operator` scopes nested validation.
pub static OPERATION: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    build(
        Schema::builder("Operation")
            .field(
                "operator",
                Field::new(enumeration(Operator::ALL.iter().map(Operator::as_str))).required(),
            )
            .operator_from("operator"),
    )
});

/// One sort key.
pub static ORDERING_CRITERION: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    build(
        Schema::builder("OrderingCriterion")
            .field("field_name", Field::new(FieldType::String).required())
            .field(
                "direction",
                Field::new(enumeration(
                    OrderingDirection::ALL.iter().map(OrderingDirection::as_str),
                )),
            ),
    )
});

/// Sort keys, each field at most once.
pub static ORDERING: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    build(
        Schema::builder("Ordering").field(
            "criteria",
            Field::new(FieldType::list(FieldType::model(&ORDERING_CRITERION)))
                .required()
                .validator(Validator::unique_fields("field_name")),
        ),
    )
});

/// Page window of a listing request.
pub static PAGINATION: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    build(
        Schema::builder("Pagination")
            .field("start", Field::new(FieldType::Integer).validator(Validator::min(0)))
            .field("num", Field::new(FieldType::Integer).validator(Validator::min(1))),
    )
});

/// Ordering and pagination of a listing request.
pub static SELECTOR: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    build(
        Schema::builder("Selector")
            .field("ordering", Field::new(FieldType::model(&ORDERING)))
            .field("pagination", Field::new(FieldType::model(&PAGINATION))),
    )
});

/// One error reported to a client.
pub static API_ERROR: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    build(
        Schema::builder("ApiError")
            .field("code", Field::new(FieldType::String))
            .field("path", Field::new(FieldType::String))
            .field("message", Field::new(FieldType::String)),
    )
});

/// Base schema for service responses.
pub static RESPONSE: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    build(
        Schema::builder("Response")
            .field("response_code", Field::new(FieldType::String))
            .field("errors", Field::new(FieldType::list(FieldType::model(&API_ERROR)))),
    )
});

/// Response carrying one page of results.
pub static RESPONSE_PAGE: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    build(
        Schema::builder("ResponsePage")
            .extends(&RESPONSE)
            .field("start", Field::new(FieldType::Integer))
            .field("num", Field::new(FieldType::Integer))
            .field("total_results", Field::new(FieldType::Integer)),
    )
});

/// Convert one validation error into an `ApiError` instance.
pub fn api_error(error: &ValidationError) -> Result<Model, ModelError> {
    Model::with_values(
        &API_ERROR,
        [
            ("code", error.code.to_string()),
            ("path", error.path.clone()),
            ("message", error.message.clone()),
        ],
    )
}

/// Build a `REQUEST_ERROR` response listing `errors`.
pub fn error_response(errors: &[ValidationError]) -> Result<Model, ModelError> {
    let api_errors = errors.iter().map(api_error).collect::<Result<Vec<_>, _>>()?;
    debug!(errors = api_errors.len(), "Built request error response");

    let mut response = Model::new(&RESPONSE);
    response.set("response_code", ResponseCode::RequestError.as_str())?;
    response.set("errors", Value::List(api_errors.into_iter().map(Value::Model).collect()))?;
    Ok(response)
}
