pub mod errors;
pub mod graphql;
pub mod json_schema;
pub mod mcp;
pub mod operations;
pub mod server;
pub mod session;
pub mod tools;
pub mod transport;
