//! Model Context Protocol over JSON-RPC 2.0

mod initialize;
mod jsonrpc;
mod request;
mod router;

pub use initialize::{SERVER_NAME, SUPPORTED_PROTOCOL_VERSIONS, negotiate};
pub use jsonrpc::{JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse};
pub use request::{CallToolParams, InitializeParams, McpRequest};
pub use router::{dispatch, route};
