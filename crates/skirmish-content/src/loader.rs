//! Directory loader shared by every definition type.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ContentError;

/// Parse every `*.yaml` file in `dir` as a `T`.
///
/// Files are visited in file-name order so registries built from the
/// result are reproducible. Subdirectories and other extensions are
/// skipped. The first unreadable or malformed file aborts the load.
pub fn load_yaml_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<(PathBuf, T)>, ContentError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ContentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "yaml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read_to_string(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed: T = serde_yml::from_str(&contents).map_err(|source| ContentError::Yaml {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "loaded content file");
        out.push((path, parsed));
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Item {
        id: String,
    }

    #[test]
    fn loads_yaml_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "id: second\n").unwrap();
        std::fs::write(dir.path().join("a.yaml"), "id: first\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let items: Vec<(PathBuf, Item)> = load_yaml_dir(dir.path()).unwrap();
        let ids: Vec<&str> = items.iter().map(|(_, item)| item.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Vec<(PathBuf, Item)>, _> = load_yaml_dir(&dir.path().join("absent"));
        assert!(matches!(result, Err(ContentError::Io { .. })));
    }

    #[test]
    fn malformed_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.yaml"), "id: [unclosed\n").unwrap();
        let result: Result<Vec<(PathBuf, Item)>, _> = load_yaml_dir(dir.path());
        assert!(matches!(
            &result,
            Err(ContentError::Yaml { path, .. }) if path.ends_with("bad.yaml")
        ));
    }
}
