use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, PatternError};

/// `*` and `?` stay within one path segment; `**` crosses directories
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A path glob matched against `/`-separated relative paths
#[derive(Debug, Clone)]
pub struct Pattern(glob::Pattern);

impl Pattern {
    pub fn new(glob: &str) -> Result<Self, PatternError> {
        let normalized = glob.replace('\\', "/");
        let normalized = normalized.trim_start_matches("./");
        glob::Pattern::new(normalized).map(Self)
    }

    /// Match a path, using `/` as the separator on every platform
    pub fn matches(&self, path: &Path) -> bool {
        self.0.matches_with(&to_slash(path), MATCH_OPTIONS)
    }
}

/// Whether a document root is a glob pattern rather than a concrete path
pub fn is_glob(root: &str) -> bool {
    glob::Pattern::escape(root) != root
}

/// The longest leading directory of a glob containing no glob characters
pub fn static_prefix(glob: &Path) -> PathBuf {
    glob.components()
        .take_while(|component| match component {
            Component::Normal(segment) => !is_glob(&segment.to_string_lossy()),
            _ => true,
        })
        .collect()
}

pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            Component::RootDir => Some(String::new()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
