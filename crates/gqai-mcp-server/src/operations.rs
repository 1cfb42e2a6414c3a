//! Operations
//!
//! Loads the GraphQL operations that are exposed as MCP tools.

mod operation;
mod operation_source;

pub use operation::{
    Operation, OperationKind, extract_and_format_comments, first_operation, operation_defs,
    parse_document,
};
pub use operation_source::load_operations;
