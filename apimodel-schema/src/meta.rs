//! Schema introspection.
//!
//! Walks schema definitions to find every schema a request or response can
//! contain, and renders field-level documentation that can be serialized for
//! API reference pages.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;
use crate::types::FieldType;

/// Documentation for one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDoc {
    /// Schema name.
    pub name: String,
    /// Schema description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDoc>,
}

/// Documentation for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDoc {
    /// Attribute name.
    pub name: String,
    /// Human-readable type, e.g. `list(integer)`.
    pub type_name: String,
    /// JSON type on the wire.
    pub json_type: String,
    /// Field description, or the type's when the field has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// One line per validator, in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<String>,
}

/// Every schema reachable from `schema` through its fields, sorted by name.
///
/// The root itself is not included.
pub fn referenced_schemas(schema: &Arc<Schema>) -> Vec<Arc<Schema>> {
    let mut found = BTreeMap::new();
    collect_schema(schema, &mut found);
    found.remove(schema.name());
    found.into_values().collect()
}

fn collect_schema(schema: &Arc<Schema>, found: &mut BTreeMap<String, Arc<Schema>>) {
    for (_, field) in schema.fields() {
        collect_type(field.field_type(), found);
    }
}

fn collect_type(field_type: &FieldType, found: &mut BTreeMap<String, Arc<Schema>>) {
    match field_type {
        FieldType::List(inner) | FieldType::Dict(inner) => collect_type(inner, found),
        FieldType::Model(schema) => {
            if !found.contains_key(schema.name()) {
                found.insert(schema.name().to_string(), Arc::clone(schema));
                collect_schema(schema, found);
            }
        }
        _ => {}
    }
}

/// Build the documentation of one schema.
pub fn document(schema: &Schema) -> SchemaDoc {
    let fields = schema
        .fields()
        .map(|(name, field)| FieldDoc {
            name: name.to_string(),
            type_name: field.field_type().type_name(),
            json_type: field.field_type().json_type().to_string(),
            description: field
                .description()
                .or_else(|| field.field_type().description())
                .map(str::to_string),
            validators: field.validator_chain().map(|v| v.documentation()).collect(),
        })
        .collect();

    SchemaDoc {
        name: schema.name().to_string(),
        description: schema.description().map(str::to_string),
        fields,
    }
}

/// Documentation for `schema` followed by every schema it references.
pub fn document_all(schema: &Arc<Schema>) -> Vec<SchemaDoc> {
    std::iter::once(document(schema))
        .chain(referenced_schemas(schema).iter().map(|s| document(s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Field, Validator};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schemas() -> Arc<Schema> {
        let tag = Schema::builder("Tag")
            .field("label", Field::new(FieldType::String))
            .build()
            .unwrap();
        let author = Schema::builder("Author")
            .field("tags", Field::new(FieldType::list(FieldType::model(&tag))))
            .build()
            .unwrap();
        Schema::builder("Post")
            .description("A blog post")
            .field(
                "title",
                Field::new(FieldType::String)
                    .required()
                    .with_description("Post title"),
            )
            .field("authors", Field::new(FieldType::dict(FieldType::model(&author))))
            .field("tag", Field::new(FieldType::model(&tag)))
            .field(
                "score",
                Field::new(FieldType::Integer).validator(Validator::between(0, 10)),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_referenced_schemas_transitive_and_sorted() {
        let names: Vec<String> = referenced_schemas(&schemas())
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["Author", "Tag"]);
    }

    #[test]
    fn test_document_lists_fields_and_validators() {
        let doc = document(&schemas());
        assert_eq!(doc.name, "Post");
        assert_eq!(doc.description.as_deref(), Some("A blog post"));

        let title = &doc.fields[0];
        assert_eq!(title.name, "title");
        assert_eq!(title.json_type, "string");
        assert_eq!(title.description.as_deref(), Some("Post title"));
        assert_eq!(title.validators, vec!["Value is required"]);

        let score = &doc.fields[3];
        assert_eq!(
            score.validators,
            vec!["Value must be between 0 and 10 (inclusive)"]
        );
    }

    #[test]
    fn test_document_serializes() {
        let schema = Schema::builder("Flag")
            .field("on", Field::new(FieldType::Boolean).with_description("Switch"))
            .build()
            .unwrap();
        let json = serde_json::to_value(document(&schema)).unwrap();
        assert_eq!(
            json,
            json!({
                "name": "Flag",
                "fields": [{
                    "name": "on",
                    "type_name": "boolean",
                    "json_type": "boolean",
                    "description": "Switch",
                }],
            })
        );
    }

    #[test]
    fn test_document_all_starts_with_root() {
        let docs = document_all(&schemas());
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Post", "Author", "Tag"]);
    }
}
