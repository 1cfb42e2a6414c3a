//! JSON-RPC 2.0 envelopes

use rmcp::model::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::McpError;

pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request as read off the wire.
///
/// Missing fields decode to their defaults. A field of the wrong type is still a decode
/// error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default)]
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    pub fn has_valid_version(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION
    }
}

/// A JSON-RPC response carrying exactly one of `result` or `error`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,

    /// The request's id, or null when it had none
    pub id: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(error),
        }
    }

    /// The response sent when a message cannot be decoded at all
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::error(None, McpError::new(ErrorCode::PARSE_ERROR, message.into(), None))
    }

    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(
            id,
            McpError::new(ErrorCode::INVALID_REQUEST, "Only JSON-RPC 2.0 is supported", None),
        )
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;
    use serde_json::json;

    use super::{JsonRpcRequest, JsonRpcResponse};
    use crate::errors::McpError;

    #[test]
    fn it_decodes_lenient_requests() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({ "id": "abc", "params": null })).unwrap();

        assert!(!request.has_valid_version());
        assert_eq!(request.id, Some(json!("abc")));
        assert_eq!(request.method, "");
        assert_eq!(request.params, None);
    }

    #[test]
    fn mistyped_fields_do_not_decode() {
        let request = json!({ "jsonrpc": 2, "id": 1, "method": "x" });

        let result = serde_json::from_value::<JsonRpcRequest>(request);

        assert!(result.is_err());
    }

    #[test]
    fn success_responses_echo_the_id() {
        let response = JsonRpcResponse::success(Some(json!(7)), json!({ "tools": [] }));

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({ "jsonrpc": "2.0", "id": 7, "result": { "tools": [] } })
        );
    }

    #[test]
    fn error_responses_omit_the_result() {
        let response = JsonRpcResponse::error(
            None,
            McpError::new(ErrorCode::METHOD_NOT_FOUND, "Method 'x' not found", None),
        );

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32601, "message": "Method 'x' not found" }
            })
        );
    }

    #[test]
    fn parse_errors_have_no_id() {
        let response = JsonRpcResponse::parse_error("expected value");

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32700, "message": "expected value" }
            })
        );
    }
}
