use std::collections::BTreeMap;

use gqai_registry::{GraphQLConfig, discover};
use tracing::{debug, warn};

use crate::errors::OperationError;

use super::{Operation, operation_defs};

/// Load every operation from the configured document roots, keyed by name.
///
/// Documents are read fresh from disk on each call. When two operations share a name the
/// one from the later file in path order wins.
pub fn load_operations(
    config: &GraphQLConfig,
) -> Result<BTreeMap<String, Operation>, OperationError> {
    let mut operations = BTreeMap::new();

    for document in discover(config)? {
        for operation in operation_defs(&document.source_text, &document.path)? {
            if let Some(previous) = operations.get(operation.name()).map(Operation::source_path)
            {
                warn!(
                    "Operation {} in {} replaces the one defined in {}",
                    operation.name(),
                    operation.source_path().display(),
                    previous.display()
                );
            }
            operations.insert(operation.name().to_string(), operation);
        }
    }

    debug!("Loaded {} operations", operations.len());
    Ok(operations)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use gqai_registry::GraphQLConfig;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    use super::load_operations;
    use crate::errors::OperationError;
    use crate::operations::OperationKind;

    fn project(files: &[(&str, &str)]) -> (TempDir, GraphQLConfig) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            let path = dir.path().join("operations").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        let config = GraphQLConfig {
            documents: vec!["operations".to_string()],
            base_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        (dir, config)
    }

    #[test]
    fn it_loads_operations_across_files() {
        let (_dir, config) = project(&[
            (
                "films.graphql",
                "query GetFilm($id: ID!) { film(id: $id) { title } }\nquery AllFilms { films { title } }",
            ),
            (
                "nested/people.graphql",
                "mutation AddPerson($name: String) { addPerson(name: $name) { id } }",
            ),
        ]);

        let operations = load_operations(&config).unwrap();

        assert_eq!(
            operations.keys().collect::<Vec<_>>(),
            vec!["AddPerson", "AllFilms", "GetFilm"]
        );
        assert_eq!(operations["AddPerson"].kind(), OperationKind::Mutation);
    }

    #[test]
    fn it_returns_nothing_for_an_empty_root() {
        let (_dir, config) = project(&[]);

        assert!(load_operations(&config).unwrap().is_empty());
    }

    #[test]
    #[traced_test]
    fn later_files_win_on_duplicate_names() {
        let (_dir, config) = project(&[
            ("a.graphql", "query Dup { first }"),
            ("b.graphql", "query Dup { second }"),
        ]);

        let operations = load_operations(&config).unwrap();

        assert_eq!(operations.len(), 1);
        assert_eq!(
            operations["Dup"].source_path().file_name(),
            Some(Path::new("b.graphql").as_os_str())
        );
        assert!(logs_contain("Operation Dup in"));
    }

    #[test]
    fn a_parse_failure_aborts_the_load() {
        let (_dir, config) = project(&[
            ("good.graphql", "query Good { a }"),
            ("bad.graphql", "query Bad {"),
        ]);

        let error = load_operations(&config).unwrap_err();

        assert!(matches!(error, OperationError::GraphQLDocument { .. }));
        assert!(error.to_string().contains("bad.graphql"));
    }
}
