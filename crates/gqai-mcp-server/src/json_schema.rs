//! Input schemas derived from GraphQL variable definitions
//!
//! The schema is descriptive only: arguments are never validated against it before an
//! operation is executed. Element types of lists are not modelled.

use std::path::Path;

use apollo_compiler::{
    Node,
    ast::{Type, VariableDefinition},
};
use rmcp::model::JsonObject;
use serde_json::{Value, json};

use crate::errors::OperationError;
use crate::operations::{first_operation, parse_document};

/// Derive the input schema for the first operation in a document
pub fn derive_schema(source_text: &str) -> Result<JsonObject, OperationError> {
    let document = parse_document(source_text, Path::new("operation.graphql"))?;
    let operation = first_operation(&document).ok_or(OperationError::NoOperations)?;
    Ok(input_schema(&operation.variables))
}

/// Build an object schema with one property per variable.
///
/// Non-null variables are listed under `required`, which is omitted when there are none.
pub fn input_schema(variables: &[Node<VariableDefinition>]) -> JsonObject {
    let mut properties = JsonObject::new();
    let mut required = Vec::new();

    for variable in variables {
        let name = variable.name.to_string();
        if variable.ty.is_non_null() {
            required.push(Value::String(name.clone()));
        }
        properties.insert(name, json!({ "type": json_schema_type(&variable.ty) }));
    }

    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), Value::from("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema
}

fn json_schema_type(ty: &Type) -> &'static str {
    if ty.is_list() {
        return "array";
    }

    match ty.inner_named_type().as_str() {
        "String" | "ID" => "string",
        "Int" => "integer",
        "Float" => "number",
        "Boolean" => "boolean",
        _ => "string",
    }
}
