//! Execute GraphQL operations from an MCP tool

use gqai_registry::Endpoint;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use rmcp::model::JsonObject;
use serde_json::{Value, json};
use tracing::debug;

use crate::errors::ExecutionError;

pub struct Request<'a> {
    pub input: JsonObject,
    pub endpoint: &'a Endpoint,
}

/// Able to be executed as a GraphQL operation
pub trait Executable {
    /// Get the query text to send
    fn operation(&self) -> &str;

    /// Get the operation name, when the query text needs one to select an operation
    fn operation_name(&self) -> Option<&str>;

    /// Get the variables to execute the operation with
    fn variables(&self, input: JsonObject) -> Value {
        Value::Object(input)
    }

    /// Get the headers to execute the operation with
    fn headers(&self, endpoint: &Endpoint) -> Result<HeaderMap, ExecutionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &endpoint.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ExecutionError::Header {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| ExecutionError::Header {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    /// Execute as a GraphQL operation using the endpoint and its headers.
    ///
    /// A GraphQL `errors` payload is returned as a successful result; only transport
    /// failures are errors here.
    async fn execute(&self, request: Request<'_>) -> Result<Value, ExecutionError> {
        let mut request_body = json!({
            "query": self.operation(),
            "variables": self.variables(request.input),
        });

        if let Some(op_name) = self.operation_name()
            && let Some(obj) = request_body.as_object_mut()
        {
            obj.insert("operationName".to_string(), Value::from(op_name));
        }

        debug!(endpoint = %request.endpoint.url, "Executing GraphQL operation");
        let response = reqwest::Client::new()
            .post(&request.endpoint.url)
            .headers(self.headers(request.endpoint)?)
            .body(request_body.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(ExecutionError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(ExecutionError::Response)
    }
}
