//! GraphQL document discovery
//!
//! Finds the `.graphql` files a project's operations are loaded from. Discovery always
//! reads from disk so callers see the current state of the document tree.

mod pattern;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::GraphQLConfig;
pub use pattern::Pattern;
use pattern::{is_glob, static_prefix, to_slash};

const OPERATION_DOCUMENT_EXTENSION: &str = "graphql";

/// Errors raised while discovering documents
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid document pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

/// The contents of a single GraphQL document file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub path: PathBuf,
    pub source_text: String,
}

/// Find and read every GraphQL document under the configured roots.
///
/// Files are returned sorted by path. Roots that do not exist contribute nothing.
pub fn discover(config: &GraphQLConfig) -> Result<Vec<DocumentFile>, DocumentError> {
    let include = compile(&config.include)?;
    let exclude = compile(&config.exclude)?;

    let mut paths = Vec::new();
    for (document, root) in config.documents.iter().zip(config.document_roots()) {
        if is_glob(document) {
            let root_pattern = compile_one(&to_slash(&root))?;
            let mut walk_root = static_prefix(&root);
            if walk_root.as_os_str().is_empty() {
                walk_root = PathBuf::from(".");
            }
            let mut found = Vec::new();
            walk_root_path(&walk_root, &mut found)?;
            paths.extend(found.into_iter().filter(|path| root_pattern.matches(path)));
        } else {
            walk_root_path(&root, &mut paths)?;
        }
    }

    paths.retain(|path| {
        let relative = path.strip_prefix(&config.base_dir).unwrap_or(path);
        let included =
            include.is_empty() || include.iter().any(|pattern| pattern.matches(relative));
        let excluded = exclude.iter().any(|pattern| pattern.matches(relative));
        if included && excluded {
            debug!(path = %path.display(), "Document excluded by pattern");
        }
        included && !excluded
    });
    paths.sort();
    paths.dedup();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let source_text = fs::read_to_string(&path).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;
        // An empty file is most likely one an editor just created
        if source_text.trim().is_empty() {
            warn!(path = %path.display(), "Skipping empty operation document");
            continue;
        }
        documents.push(DocumentFile { path, source_text });
    }

    debug!("Discovered {} GraphQL documents", documents.len());
    Ok(documents)
}

fn compile(globs: &[String]) -> Result<Vec<Pattern>, DocumentError> {
    globs.iter().map(|glob| compile_one(glob)).collect()
}

fn compile_one(glob: &str) -> Result<Pattern, DocumentError> {
    Pattern::new(glob).map_err(|source| DocumentError::Pattern {
        pattern: glob.to_string(),
        source,
    })
}

fn walk_root_path(root: &Path, found: &mut Vec<PathBuf>) -> Result<(), DocumentError> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!(root = %root.display(), "Document root does not exist");
            return Ok(());
        }
        Err(source) => {
            return Err(DocumentError::Io {
                path: root.to_path_buf(),
                source,
            });
        }
    };

    if metadata.is_dir() {
        walk_dir(root, found)
    } else {
        if is_document(root) {
            found.push(root.to_path_buf());
        }
        Ok(())
    }
}

fn walk_dir(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), DocumentError> {
    let io_error = |source| DocumentError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        // Symlinked directories are not followed
        if entry.file_type().map_err(io_error)?.is_dir() {
            walk_dir(&path, found)?;
        } else if is_document(&path) {
            found.push(path);
        }
    }
    Ok(())
}

fn is_document(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(OPERATION_DOCUMENT_EXTENSION)
}
