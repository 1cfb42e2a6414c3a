//! The MCP initialization handshake

use serde::Serialize;
use serde_json::{Map, Value};

use super::request::InitializeParams;

/// Protocol versions this server speaks, oldest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26"];

const LATEST_PROTOCOL_VERSION: &str = "2025-03-26";

pub const SERVER_NAME: &str = "gqai";

/// Agree on a protocol version.
///
/// A supported client version is echoed back. Anything else gets the newest version this
/// server supports; a mismatch is never an error.
pub fn negotiate(client_version: Option<&str>) -> &'static str {
    client_version
        .and_then(|requested| {
            SUPPORTED_PROTOCOL_VERSIONS
                .iter()
                .find(|supported| **supported == requested)
                .copied()
        })
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: &'static str,
    pub server_info: ServerInfo,
    pub capabilities: Capabilities,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Capabilities {
    pub tools: Map<String, Value>,
}

pub fn initialize(params: &InitializeParams) -> InitializeResult {
    InitializeResult {
        protocol_version: negotiate(params.protocol_version.as_deref()),
        server_info: ServerInfo {
            name: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
        },
        capabilities: Capabilities { tools: Map::new() },
    }
}
