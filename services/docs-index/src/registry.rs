//! Loads the TOML registry file listing docsets.

use crate::model::Docset;
use docsearch_core::{DocsearchError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Deserialize)]
struct RegistryFile {
    docsets: Option<Vec<RawDocset>>,
}

#[derive(Deserialize)]
struct RawDocset {
    docset_id: String,
    root_path: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    version: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Loads and validates the registry at `registry_path`. Relative
/// `root_path` entries resolve against the registry file's own directory.
pub fn load_docsets(registry_path: &Path) -> Result<Vec<Docset>> {
    let bytes = std::fs::read(registry_path).map_err(|e| {
        DocsearchError::configuration(format!(
            "failed to read registry {}: {e}",
            registry_path.display()
        ))
    })?;
    let text = String::from_utf8(bytes)
        .map_err(|e| DocsearchError::configuration(format!("registry is not valid UTF-8: {e}")))?;
    let parsed: RegistryFile = toml::from_str(&text)
        .map_err(|e| DocsearchError::configuration(format!("failed to parse registry: {e}")))?;

    let items = parsed.docsets.ok_or_else(|| {
        DocsearchError::configuration("registry must define [[docsets]] entries")
    })?;
    if items.is_empty() {
        return Err(DocsearchError::configuration(
            "registry must define [[docsets]] entries",
        ));
    }

    let base_dir = registry_path
        .canonicalize()
        .unwrap_or_else(|_| registry_path.to_path_buf())
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let mut seen = HashSet::new();
    let mut docsets = Vec::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.docset_id.clone()) {
            return Err(DocsearchError::configuration(format!(
                "duplicate docset_id: {}",
                item.docset_id
            )));
        }

        let raw_root = std::path::PathBuf::from(&item.root_path);
        let root_path = if raw_root.is_absolute() {
            raw_root
        } else {
            base_dir.join(raw_root)
        };

        if item.enabled {
            if !root_path.exists() {
                return Err(DocsearchError::configuration(format!(
                    "root_path does not exist for docset {}: {}",
                    item.docset_id,
                    root_path.display()
                )));
            }
            if !root_path.is_dir() {
                return Err(DocsearchError::configuration(format!(
                    "root_path is not a directory for docset {}: {}",
                    item.docset_id,
                    root_path.display()
                )));
            }
        }

        docsets.push(Docset {
            docset_id: item.docset_id,
            root_path,
            tags: item.tags,
            keywords: item.keywords,
            version: item.version,
            enabled: item.enabled,
        });
    }

    Ok(docsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_registry(dir: &Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("docsets.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_enabled_docset_with_existing_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        let registry = write_registry(
            dir.path(),
            r#"
            [[docsets]]
            docset_id = "pandas"
            root_path = "docs"
            keywords = ["pandas", "dataframe"]
            "#,
        );
        let docsets = load_docsets(&registry).unwrap();
        assert_eq!(docsets.len(), 1);
        assert_eq!(docsets[0].docset_id, "pandas");
        assert!(docsets[0].enabled);
        assert_eq!(docsets[0].root_path, dir.path().join("docs"));
    }

    #[test]
    fn rejects_duplicate_docset_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        let registry = write_registry(
            dir.path(),
            r#"
            [[docsets]]
            docset_id = "pandas"
            root_path = "docs"

            [[docsets]]
            docset_id = "pandas"
            root_path = "docs"
            "#,
        );
        assert!(load_docsets(&registry).is_err());
    }

    #[test]
    fn rejects_missing_root_for_enabled_docset() {
        let dir = tempfile::tempdir().unwrap();
        let registry = write_registry(
            dir.path(),
            r#"
            [[docsets]]
            docset_id = "pandas"
            root_path = "nope"
            "#,
        );
        assert!(load_docsets(&registry).is_err());
    }

    #[test]
    fn disabled_docset_tolerates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let registry = write_registry(
            dir.path(),
            r#"
            [[docsets]]
            docset_id = "pandas"
            root_path = "nope"
            enabled = false
            "#,
        );
        let docsets = load_docsets(&registry).unwrap();
        assert!(!docsets[0].enabled);
    }

    #[test]
    fn rejects_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = write_registry(dir.path(), "");
        assert!(load_docsets(&registry).is_err());
    }
}
