//! Runtime utilities
//!
//! This module is only used by the main binary and provides helper code
//! related to runtime configuration.

mod logging;

use std::path::Path;

use gqai_mcp_server::errors::ServerError;
use gqai_registry::GraphQLConfig;
pub use logging::{LogRotationKind, Logging, setup_logging};
use tracing::{debug, info};

/// Read the project configuration, reporting where its documents come from
pub fn read_config(path: impl AsRef<Path>) -> Result<GraphQLConfig, ServerError> {
    let path = path.as_ref();
    let config = GraphQLConfig::load(path)?;

    info!(
        config = %path.display(),
        documents = ?config.documents,
        "Loaded GraphQL project configuration"
    );
    match config.endpoint() {
        Some(endpoint) => debug!(endpoint = %endpoint.url, "Using GraphQL endpoint"),
        None => debug!("No GraphQL endpoint configured"),
    }
    Ok(config)
}
