use crate::models::Settings;
use crate::validation::validate;
use docsearch_core::{DocsearchError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "DOCSEARCH_";

/// Loads settings with precedence defaults < file < environment, the same
/// layering order the rest of the ecosystem uses for its own config.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(default_file_location().as_deref())
}

/// Like [`load_settings`], but with an explicit (optional) file path rather
/// than the default search locations. Passing `None` skips the file layer
/// entirely.
pub fn load_settings_from(file_path: Option<&Path>) -> Result<Settings> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    if let Some(path) = file_path {
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX));

    let settings: Settings = figment
        .extract()
        .map_err(|e| DocsearchError::configuration(e.to_string()))?;

    validate(&settings)?;
    Ok(settings)
}

fn default_file_location() -> Option<PathBuf> {
    let candidates = ["docsearch.toml", "config/docsearch.toml"];
    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Some(path);
        }
    }
    dirs::config_dir().map(|dir| dir.join("docsearch").join("docsearch.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_load_without_a_file_or_env() {
        let settings = load_settings_from(None).unwrap();
        assert_eq!(settings.chunk_words, 280);
        assert_eq!(settings.chunk_overlap_words, 60);
        assert!(settings.auto_index);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docsearch.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "chunk_words = 120").unwrap();
        writeln!(file, "results_top_k = 5").unwrap();
        drop(file);

        let settings = load_settings_from(Some(&path)).unwrap();
        assert_eq!(settings.chunk_words, 120);
        assert_eq!(settings.results_top_k, 5);
    }

    #[test]
    fn invalid_overlap_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docsearch.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "chunk_words = 50").unwrap();
        writeln!(file, "chunk_overlap_words = 50").unwrap();
        drop(file);

        assert!(load_settings_from(Some(&path)).is_err());
    }
}
