use std::fmt;
use std::path::{Path, PathBuf};

use apollo_compiler::{
    Node,
    ast::{Definition, Document, OperationDefinition, OperationType, VariableDefinition},
    parser::Parser,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::errors::OperationError;

/// The kind of a GraphQL operation that can be exposed as a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn is_mutation(self) -> bool {
        self == OperationKind::Mutation
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
        }
    }
}

/// A named GraphQL operation loaded from a document file
#[derive(Debug, Clone)]
pub struct Operation {
    name: String,
    kind: OperationKind,
    description: String,
    source_text: String,
    source_path: PathBuf,
    variables: Vec<Node<VariableDefinition>>,
    shares_document: bool,
}

impl Operation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The full text of the document this operation was declared in
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn variables(&self) -> &[Node<VariableDefinition>] {
        &self.variables
    }

    /// The operation name to send alongside the query text.
    ///
    /// Only needed when the document declares more than one operation, since the endpoint
    /// cannot otherwise tell which one to run.
    pub fn operation_name(&self) -> Option<&str> {
        self.shares_document.then_some(self.name.as_str())
    }
}

/// Parse a GraphQL document into an AST
pub fn parse_document(source_text: &str, source_path: &Path) -> Result<Document, OperationError> {
    Parser::new()
        .parse_ast(source_text, source_path)
        .map_err(|errors| OperationError::GraphQLDocument {
            path: source_path.to_path_buf(),
            errors: Box::new(errors),
        })
}

/// Extract every addressable operation from a document.
///
/// Anonymous operations and subscriptions are skipped. Each operation keeps the whole
/// document as its source text.
pub fn operation_defs(
    source_text: &str,
    source_path: &Path,
) -> Result<Vec<Operation>, OperationError> {
    let document = parse_document(source_text, source_path)?;
    let operation_count = document
        .definitions
        .iter()
        .filter(|def| matches!(def, Definition::OperationDefinition(_)))
        .count();

    let mut last_offset: Option<usize> = Some(0);
    let mut operations = Vec::new();
    for def in &document.definitions {
        let comments = match def.location() {
            Some(source_span) => {
                let comments = last_offset
                    .and_then(|start_offset| source_text.get(start_offset..source_span.offset()));
                last_offset = Some(source_span.end_offset());
                comments
            }
            None => {
                last_offset = None;
                None
            }
        };

        let operation_def = match def {
            Definition::OperationDefinition(operation_def) => operation_def,
            Definition::FragmentDefinition(_) => continue,
            _ => {
                warn!(
                    path = %source_path.display(),
                    "Schema definitions were passed in, but only operations and fragments are allowed"
                );
                continue;
            }
        };

        let Some(name) = operation_def.name.as_ref() else {
            warn!("Skipping unnamed operation in {}", source_path.display());
            continue;
        };
        let kind = match operation_def.operation_type {
            OperationType::Query => OperationKind::Query,
            OperationType::Mutation => OperationKind::Mutation,
            OperationType::Subscription => {
                debug!("Skipping subscription operation {name}");
                continue;
            }
        };

        let description = extract_and_format_comments(comments)
            .unwrap_or_else(|| format!("Execute GraphQL {kind} operation: {name}"));

        operations.push(Operation {
            name: name.to_string(),
            kind,
            description,
            source_text: source_text.to_string(),
            source_path: source_path.to_path_buf(),
            variables: operation_def.variables.clone(),
            shares_document: operation_count > 1,
        });
    }

    Ok(operations)
}

/// The first operation definition in a document, named or not
pub fn first_operation(document: &Document) -> Option<&Node<OperationDefinition>> {
    document.definitions.iter().find_map(|def| match def {
        Definition::OperationDefinition(operation_def) => Some(operation_def),
        _ => None,
    })
}

/// Turn a block of `#` comments into plain description text
pub fn extract_and_format_comments(comments: Option<&str>) -> Option<String> {
    comments.and_then(|comments| {
        let content = Regex::new(r"(\n|^)(\s*,*)*#")
            .ok()?
            .replace_all(comments, "$1");
        let trimmed = content.trim();

        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
