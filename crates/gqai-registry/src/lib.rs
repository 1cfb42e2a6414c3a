//! Project configuration and GraphQL document discovery
//!
//! The MCP server reads its project layout through this crate: where the GraphQL endpoint
//! lives, which headers to send, and which `.graphql` files hold the operations to expose.

pub mod config;
pub mod files;

pub use config::{ConfigError, Endpoint, GraphQLConfig};
pub use files::{DocumentError, DocumentFile, discover};
