//! Method dispatch
//!
//! The router holds no state between calls. Every request is answered from the project
//! configuration it is given, loading operations from disk as needed.

use gqai_registry::GraphQLConfig;
use rmcp::model::{CallToolResult, Content, ErrorCode, JsonObject};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::initialize::initialize;
use super::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use super::request::{CallToolParams, McpRequest};
use crate::errors::McpError;
use crate::tools::{Tool, invoke, load_tool, tools_from_config};

#[derive(Serialize)]
struct ListToolsResult {
    tools: Vec<Tool>,
}

/// Answer one JSON-RPC message, checking the protocol marker first.
///
/// Returns `None` for notifications, which get no response at all.
pub async fn dispatch(request: JsonRpcRequest, config: &GraphQLConfig) -> Option<JsonRpcResponse> {
    if !request.has_valid_version() {
        return Some(JsonRpcResponse::invalid_request(request.id));
    }
    route(request, config).await
}

/// Route a request to its method handler
pub async fn route(request: JsonRpcRequest, config: &GraphQLConfig) -> Option<JsonRpcResponse> {
    let JsonRpcRequest {
        id, method, params, ..
    } = request;
    debug!(method = %method, "Routing MCP request");

    let result = match McpRequest::decode(&method, params) {
        Ok(request) => handle(request, config).await,
        Err(error) => Err(error),
    };

    match result {
        Ok(Some(result)) => Some(JsonRpcResponse::success(id, result)),
        Ok(None) => None,
        Err(error) => Some(JsonRpcResponse::error(id, error)),
    }
}

async fn handle(request: McpRequest, config: &GraphQLConfig) -> Result<Option<Value>, McpError> {
    let result = match request {
        McpRequest::Initialize(params) => to_result(initialize(&params))?,
        McpRequest::Initialized => {
            info!("Server initialized successfully");
            return Ok(None);
        }
        McpRequest::ListTools => {
            let tools = tools_from_config(config).map_err(|e| internal_error(e.to_string()))?;
            to_result(ListToolsResult { tools })?
        }
        McpRequest::CallTool(params) => call_tool(params, config).await?,
        McpRequest::ListPrompts => json!({ "prompts": [] }),
        McpRequest::ListResources => json!({ "resources": [] }),
    };
    Ok(Some(result))
}

async fn call_tool(params: CallToolParams, config: &GraphQLConfig) -> Result<Value, McpError> {
    let CallToolParams { name, arguments } = params;
    let tool = load_tool(config, &name).map_err(|e| internal_error(e.to_string()))?;

    let response = invoke(&tool, config, arguments)
        .await
        .map_err(|e| internal_error(format!("Error executing tool {name}: {e}")))?;

    let response = match response {
        Value::Null => Value::Object(JsonObject::new()),
        Value::Object(_) => response,
        _ => {
            return Err(internal_error(format!(
                "Tool {name} returned an invalid response"
            )));
        }
    };

    // A response with errors and no data means the operation itself failed
    let is_error = response.get("errors").is_some_and(|errors| !errors.is_null())
        && response.get("data").is_none_or(Value::is_null);

    to_result(CallToolResult {
        content: vec![Content::text(response.to_string())],
        is_error: Some(is_error),
    })
}

fn to_result(result: impl Serialize) -> Result<Value, McpError> {
    serde_json::to_value(result).map_err(|e| internal_error(e.to_string()))
}

fn internal_error(message: String) -> McpError {
    McpError::new(ErrorCode::INTERNAL_ERROR, message, None)
}
