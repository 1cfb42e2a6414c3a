//! GraphQL project configuration
//!
//! Reads a `.graphqlrc.yml` style file into a resolved [`GraphQLConfig`]. The file format
//! is loose: most keys accept either a single string or a list, and schema entries may
//! carry per-endpoint headers. Every string value has environment variables expanded
//! once at load time, and the result is never mutated afterwards.

mod expand;
mod header;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Format, Yaml};
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::{debug, warn};

pub use expand::{expand_env_vars, expand_with};
pub use header::canonical_header_name;

/// Errors raised while loading a project configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(Box<figment::Error>),
}

/// A GraphQL endpoint together with the headers sent on every request to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,

    /// Header values keyed by canonical header name
    pub headers: BTreeMap<String, String>,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .insert(canonical_header_name(name), value.into());
        self
    }
}

/// A resolved single-project configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphQLConfig {
    /// Schema endpoints, in declaration order
    pub schema: Vec<Endpoint>,

    /// Document roots as written in the config (after variable expansion)
    pub documents: Vec<String>,

    /// Glob patterns a document path must match to be loaded
    pub include: Vec<String>,

    /// Glob patterns excluding document paths
    pub exclude: Vec<String>,

    /// Directory relative document roots and patterns are resolved against
    pub base_dir: PathBuf,
}

impl GraphQLConfig {
    /// Load a config file. Relative document roots resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = Self::from_yaml(&contents, base_dir)?;
        debug!(path = %path.display(), ?config, "Loaded GraphQL config");
        Ok(config)
    }

    /// Parse config from YAML text
    pub fn from_yaml(yaml: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let raw: RawProject = Figment::from(Yaml::string(yaml))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))?;

        if raw.projects.is_some() {
            warn!("Multi-project configs are not supported, only top-level keys are used");
        }

        Ok(Self {
            schema: raw.schema.map(resolve_schema).unwrap_or_default(),
            documents: raw.documents.map(resolve_strings).unwrap_or_default(),
            include: raw.include.map(resolve_strings).unwrap_or_default(),
            exclude: raw.exclude.map(resolve_strings).unwrap_or_default(),
            base_dir: base_dir.into(),
        })
    }

    /// The endpoint tools are bound to. Only the first configured schema is used.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.schema.first()
    }

    /// Document roots resolved against the base directory
    pub fn document_roots(&self) -> Vec<PathBuf> {
        self.documents
            .iter()
            .map(|document| self.base_dir.join(document))
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProject {
    schema: Option<OneOrMany<SchemaEntry>>,
    documents: Option<OneOrMany<StringEntry>>,
    include: Option<OneOrMany<StringEntry>>,
    exclude: Option<OneOrMany<StringEntry>>,
    projects: Option<IgnoredAny>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(String),
    Many(Vec<T>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaEntry {
    Url(String),
    WithOptions(BTreeMap<String, Option<SchemaOptions>>),
    Other(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SchemaOptions {
    headers: BTreeMap<String, StringEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringEntry {
    Value(String),
    Other(IgnoredAny),
}

impl StringEntry {
    fn into_value(self) -> Option<String> {
        match self {
            StringEntry::Value(value) => Some(value),
            StringEntry::Other(_) => None,
        }
    }
}

fn resolve_schema(schema: OneOrMany<SchemaEntry>) -> Vec<Endpoint> {
    match schema {
        OneOrMany::One(url) => vec![Endpoint::new(expand_env_vars(&url))],
        OneOrMany::Many(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                SchemaEntry::Url(url) => Some(Endpoint::new(expand_env_vars(&url))),
                // A keyed entry maps exactly one URL to its options
                SchemaEntry::WithOptions(map) => map.into_iter().next().map(|(url, options)| {
                    let headers = options
                        .unwrap_or_default()
                        .headers
                        .into_iter()
                        .filter_map(|(name, value)| {
                            value.into_value().map(|value| {
                                (canonical_header_name(&name), expand_env_vars(&value))
                            })
                        })
                        .collect();
                    Endpoint {
                        url: expand_env_vars(&url),
                        headers,
                    }
                }),
                SchemaEntry::Other(_) => None,
            })
            .collect(),
    }
}

fn resolve_strings(values: OneOrMany<StringEntry>) -> Vec<String> {
    match values {
        OneOrMany::One(value) => vec![expand_env_vars(&value)],
        OneOrMany::Many(entries) => entries
            .into_iter()
            .filter_map(StringEntry::into_value)
            .map(|value| expand_env_vars(&value))
            .collect(),
    }
}
