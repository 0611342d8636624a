//! Asset path resolution: normalizing `src` attributes into safe,
//! docset-relative paths at parse time, and sandboxed filesystem lookups
//! at request time.

use crate::model::Asset;
use docsearch_core::{DocsearchError, Result};
use std::path::{Path, PathBuf};

/// Normalizes each asset's `src` into a docset-relative `path`, given the
/// POSIX path of the file the asset was found in. External URLs, `data:`
/// URIs, and anything that would escape the docset root resolve to `None`.
pub fn resolve_assets(assets: Vec<Asset>, file_path: &str) -> Vec<Asset> {
    let base_dir = posix_parent(file_path);
    assets
        .into_iter()
        .map(|asset| {
            let path = resolve_one(&asset.src, &base_dir);
            Asset { path, ..asset }
        })
        .collect()
}

fn posix_parent(file_path: &str) -> String {
    match file_path.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

fn resolve_one(src: &str, base_dir: &str) -> Option<String> {
    let clean = src
        .split(['#', '?'])
        .next()
        .unwrap_or("")
        .trim()
        .replace('\\', "/");

    if clean.is_empty()
        || clean.starts_with("http://")
        || clean.starts_with("https://")
        || clean.starts_with("data:")
    {
        return None;
    }

    let rel = if let Some(stripped) = clean.strip_prefix('/') {
        stripped.trim_start_matches('/').to_string()
    } else {
        normalize_posix(&join_posix(base_dir, &clean))
    };

    let rel = rel.trim_start_matches("./").to_string();

    if rel.is_empty() || rel == "." || rel == ".." || rel.starts_with("../") {
        return None;
    }
    Some(rel)
}

fn join_posix(base: &str, rel: &str) -> String {
    if base.is_empty() {
        rel.to_string()
    } else {
        format!("{base}/{rel}")
    }
}

/// Collapses `.` and `..` components the way `posixpath.normpath` does,
/// without touching the filesystem.
fn normalize_posix(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if matches!(out.last(), Some(&last) if last != "..") {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    if out.is_empty() {
        ".".to_string()
    } else {
        out.join("/")
    }
}

/// Resolves a runtime `(docset root, relative_path)` request to a
/// filesystem path, rejecting anything that could escape the root.
pub fn safe_resolve_under_root(root: &Path, relative_path: &str) -> Result<PathBuf> {
    if relative_path.starts_with('/')
        || relative_path.starts_with('\\')
        || relative_path.contains(':')
    {
        return Err(DocsearchError::bad_input("invalid asset path"));
    }

    let root_canonical = root
        .canonicalize()
        .map_err(|e| DocsearchError::internal(format!("failed to canonicalize docset root: {e}")))?;
    let candidate = root.join(relative_path);
    let target = candidate
        .canonicalize()
        .map_err(|_| DocsearchError::not_found("asset not found"))?;

    if target != root_canonical && !target.starts_with(&root_canonical) {
        return Err(DocsearchError::bad_input("path traversal attempt"));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(src: &str) -> Asset {
        Asset {
            src: src.to_string(),
            alt: None,
            caption: None,
            path: None,
        }
    }

    #[test]
    fn external_and_data_urls_stay_null() {
        let assets = resolve_assets(
            vec![asset("https://example.com/a.png"), asset("data:image/png;base64,xx")],
            "docs/a.html",
        );
        assert!(assets.iter().all(|a| a.path.is_none()));
    }

    #[test]
    fn relative_sibling_path_resolves() {
        let assets = resolve_assets(vec![asset("../sibling/img.png")], "docs/a/b.html");
        assert_eq!(assets[0].path.as_deref(), Some("docs/sibling/img.png"));
    }

    #[test]
    fn escaping_above_root_is_null() {
        let assets = resolve_assets(vec![asset("../../../etc/passwd")], "a.html");
        assert!(assets[0].path.is_none());
    }

    #[test]
    fn leading_slash_is_stripped_and_treated_root_relative() {
        let assets = resolve_assets(vec![asset("/images/a.png")], "docs/a.html");
        assert_eq!(assets[0].path.as_deref(), Some("images/a.png"));
    }

    #[test]
    fn safe_resolve_rejects_absolute_and_traversal_inputs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(safe_resolve_under_root(dir.path(), "/etc/passwd").is_err());
        assert!(safe_resolve_under_root(dir.path(), "../etc/passwd").is_err());
    }

    #[test]
    fn safe_resolve_succeeds_for_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        std::fs::write(dir.path().join("img/a.png"), b"x").unwrap();
        let resolved = safe_resolve_under_root(dir.path(), "img/a.png").unwrap();
        assert!(resolved.ends_with("img/a.png"));
    }

    #[test]
    fn safe_resolve_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(safe_resolve_under_root(dir.path(), "nope.png").is_err());
    }
}
