//! Typed MCP requests
//!
//! Raw JSON-RPC params are checked here, once, so the router only ever sees well-formed
//! requests. Every shape problem becomes an `InvalidParams` error.

use rmcp::model::{ErrorCode, JsonObject};
use serde_json::Value;

use crate::errors::McpError;

/// A decoded MCP request
#[derive(Debug, Clone, PartialEq)]
pub enum McpRequest {
    Initialize(InitializeParams),
    Initialized,
    ListTools,
    CallTool(CallToolParams),
    ListPrompts,
    ListResources,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitializeParams {
    /// The client's requested version; `None` when it was not a string
    pub protocol_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: JsonObject,
}

impl McpRequest {
    pub fn decode(method: &str, params: Option<Value>) -> Result<Self, McpError> {
        match method {
            "initialize" => InitializeParams::decode(params).map(McpRequest::Initialize),
            "notifications/initialized" | "initialized" => Ok(McpRequest::Initialized),
            "tools/list" => Ok(McpRequest::ListTools),
            "tools/call" => CallToolParams::decode(params).map(McpRequest::CallTool),
            "prompts/list" => Ok(McpRequest::ListPrompts),
            "resources/list" => Ok(McpRequest::ListResources),
            _ => Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Method '{method}' not found"),
                None,
            )),
        }
    }
}

impl InitializeParams {
    fn decode(params: Option<Value>) -> Result<Self, McpError> {
        let params = match params {
            None => return Err(invalid_params("Invalid parameters")),
            Some(Value::Object(params)) => params,
            Some(_) => return Err(invalid_params("Invalid parameters format")),
        };

        match params.get("protocolVersion") {
            None => Err(invalid_params("Missing protocolVersion")),
            Some(version) => Ok(Self {
                protocol_version: version.as_str().map(str::to_string),
            }),
        }
    }
}

impl CallToolParams {
    fn decode(params: Option<Value>) -> Result<Self, McpError> {
        let mut params = match params {
            None => return Err(invalid_params("Params must include tool name")),
            Some(Value::Object(params)) => params,
            Some(_) => return Err(invalid_params("Tool name is required")),
        };

        let name = match params.remove("name") {
            Some(Value::String(name)) => name,
            _ => return Err(invalid_params("Tool name is required")),
        };

        let arguments = match params.remove("arguments") {
            None | Some(Value::Null) => JsonObject::new(),
            Some(Value::Object(arguments)) => arguments,
            Some(_) => return Err(invalid_params("Tool arguments must be an object")),
        };

        Ok(Self { name, arguments })
    }
}

fn invalid_params(message: &'static str) -> McpError {
    McpError::new(ErrorCode::INVALID_PARAMS, message, None)
}
