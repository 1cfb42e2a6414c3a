use std::path::PathBuf;

use apollo_compiler::{ast::Document, validation::WithErrors};
use gqai_registry::{ConfigError, DocumentError};
use reqwest::StatusCode;

/// An error in operation loading
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("Could not parse GraphQL document {path}: {errors}")]
    GraphQLDocument {
        path: PathBuf,
        errors: Box<WithErrors<Document>>,
    },

    #[error("No operations defined")]
    NoOperations,

    #[error(transparent)]
    Discovery(#[from] DocumentError),
}

/// An error resolving a tool from the project configuration
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Load(#[from] OperationError),
}

/// An error executing a GraphQL operation against its endpoint
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("no GraphQL endpoint configured")]
    NoEndpoint,

    #[error("invalid header {name}: {reason}")]
    Header { name: String, reason: String },

    #[error("failed to send GraphQL request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GraphQL request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse GraphQL response: {0}")]
    Response(serde_json::Error),
}

/// An error in server initialization or transport handling
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A JSON-RPC error
pub type McpError = rmcp::model::ErrorData;
