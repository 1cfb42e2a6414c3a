//! Tools
//!
//! A tool is the MCP face of one GraphQL operation. Tools are rebuilt from the document
//! tree on every request so edits to `.graphql` files are picked up without a restart.

use gqai_registry::GraphQLConfig;
use rmcp::model::{JsonObject, ToolAnnotations};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::{ExecutionError, ToolError};
use crate::graphql::{self, Executable};
use crate::json_schema::input_schema;
use crate::operations::{Operation, load_operations};

/// An MCP tool backed by a GraphQL operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: JsonObject,
    pub annotations: ToolAnnotations,

    #[serde(skip)]
    operation: Operation,
}

impl From<Operation> for Tool {
    fn from(operation: Operation) -> Self {
        let is_query = !operation.kind().is_mutation();
        let annotations = ToolAnnotations {
            title: Some(operation.name().to_string()),
            read_only_hint: Some(is_query),
            destructive_hint: Some(!is_query),
            idempotent_hint: Some(is_query),
            open_world_hint: Some(true),
        };

        Tool {
            name: operation.name().to_string(),
            description: operation.description().to_string(),
            input_schema: input_schema(operation.variables()),
            annotations,
            operation,
        }
    }
}

impl Executable for Tool {
    fn operation(&self) -> &str {
        self.operation.source_text()
    }

    fn operation_name(&self) -> Option<&str> {
        self.operation.operation_name()
    }
}

/// Build a tool for every operation in the project
pub fn tools_from_config(config: &GraphQLConfig) -> Result<Vec<Tool>, ToolError> {
    Ok(load_operations(config)?
        .into_values()
        .map(Tool::from)
        .collect())
}

/// Build the tool with the given name, loading operations afresh
pub fn load_tool(config: &GraphQLConfig, name: &str) -> Result<Tool, ToolError> {
    load_operations(config)?
        .remove(name)
        .map(Tool::from)
        .ok_or_else(|| ToolError::NotFound(name.to_string()))
}

/// Execute a tool against the project's endpoint.
///
/// The input is passed through as the operation's variables without being checked
/// against the tool's input schema.
pub async fn invoke(
    tool: &Tool,
    config: &GraphQLConfig,
    input: JsonObject,
) -> Result<Value, ExecutionError> {
    let endpoint = config.endpoint().ok_or(ExecutionError::NoEndpoint)?;
    debug!(tool = %tool.name, "Invoking tool");
    tool.execute(graphql::Request { input, endpoint }).await
}

#[cfg(test)]
mod tests {
    use std::fs;

    use gqai_registry::{Endpoint, GraphQLConfig};
    use mockito::Matcher;
    use rmcp::model::JsonObject;
    use serde_json::json;
    use tempfile::TempDir;

    use super::{Tool, invoke, load_tool, tools_from_config};
    use crate::errors::{ExecutionError, ToolError};

    const GET_FILM: &str = "query GetFilm($id: ID!) { film(id: $id) { title } }";

    fn project(files: &[(&str, &str)], endpoint: Option<Endpoint>) -> (TempDir, GraphQLConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("operations")).unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join("operations").join(name), contents).unwrap();
        }
        let config = GraphQLConfig {
            schema: endpoint.into_iter().collect(),
            documents: vec!["operations".to_string()],
            base_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        (dir, config)
    }

    fn tool_json(tool: &Tool) -> serde_json::Value {
        let mut json = serde_json::to_value(tool).unwrap();
        json.sort_all_objects();
        json
    }

    #[test]
    fn query_tool_serialization() {
        let (_dir, config) = project(&[("get_film.graphql", GET_FILM)], None);

        let tools = tools_from_config(&config).unwrap();

        assert_eq!(tools.len(), 1);
        insta::assert_snapshot!(serde_json::to_string_pretty(&tool_json(&tools[0])).unwrap(), @r#"
        {
          "annotations": {
            "destructiveHint": false,
            "idempotentHint": true,
            "openWorldHint": true,
            "readOnlyHint": true,
            "title": "GetFilm"
          },
          "description": "Execute GraphQL query operation: GetFilm",
          "inputSchema": {
            "properties": {
              "id": {
                "type": "string"
              }
            },
            "required": [
              "id"
            ],
            "type": "object"
          },
          "name": "GetFilm"
        }
        "#);
    }

    #[test]
    fn mutation_annotations_are_the_complement() {
        let (_dir, config) = project(
            &[(
                "add.graphql",
                "mutation AddFilm($title: String) { addFilm(title: $title) { id } }",
            )],
            None,
        );

        let tool = load_tool(&config, "AddFilm").unwrap();

        assert_eq!(
            tool_json(&tool)["annotations"],
            json!({
                "destructiveHint": true,
                "idempotentHint": false,
                "openWorldHint": true,
                "readOnlyHint": false,
                "title": "AddFilm"
            })
        );
        assert_eq!(
            tool_json(&tool)["inputSchema"],
            json!({ "properties": { "title": { "type": "string" } }, "type": "object" })
        );
    }

    #[test]
    fn one_tool_per_named_operation() {
        let (_dir, config) = project(
            &[
                ("films.graphql", "query A { a }\nquery B($x: Int!) { b(x: $x) }"),
                ("people.graphql", "mutation C { c }"),
            ],
            None,
        );

        let tools = tools_from_config(&config).unwrap();

        let names: Vec<_> = tools.iter().map(|tool| tool.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(tools[0].input_schema["properties"], json!({}));
        assert_eq!(tools[1].input_schema["required"], json!(["x"]));
    }

    #[test]
    fn unknown_tools_are_not_found() {
        let (_dir, config) = project(&[("get_film.graphql", GET_FILM)], None);

        let error = load_tool(&config, "Missing").unwrap_err();

        assert!(matches!(error, ToolError::NotFound(ref name) if name == "Missing"));
        assert_eq!(error.to_string(), "tool Missing not found");
    }

    #[test]
    fn tools_reflect_the_current_documents() {
        let (dir, config) = project(&[("get_film.graphql", GET_FILM)], None);
        assert_eq!(tools_from_config(&config).unwrap().len(), 1);

        fs::write(
            dir.path().join("operations").join("more.graphql"),
            "query More { more }",
        )
        .unwrap();

        assert_eq!(tools_from_config(&config).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invoke_sends_the_bound_operation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::Json(json!({
                "query": GET_FILM,
                "variables": { "id": "123" }
            })))
            .with_body(r#"{"data":{"film":{"title":"A New Hope"}}}"#)
            .expect(1)
            .create_async()
            .await;
        let (_dir, config) = project(
            &[("get_film.graphql", GET_FILM)],
            Some(Endpoint::new(format!("{}/graphql", server.url()))),
        );
        let tool = load_tool(&config, "GetFilm").unwrap();

        let result = invoke(
            &tool,
            &config,
            json!({ "id": "123" }).as_object().cloned().unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(result, json!({ "data": { "film": { "title": "A New Hope" } } }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invoke_requires_an_endpoint() {
        let (_dir, config) = project(&[("get_film.graphql", GET_FILM)], None);
        let tool = load_tool(&config, "GetFilm").unwrap();

        let error = invoke(&tool, &config, JsonObject::new()).await.unwrap_err();

        assert!(matches!(error, ExecutionError::NoEndpoint));
    }
}
