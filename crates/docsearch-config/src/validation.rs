use crate::models::Settings;
use docsearch_core::{DocsearchError, Result};

/// Validates the invariants the rest of the service relies on without
/// re-checking: chunking sizes, and a positive router/result fan-out.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.chunk_words == 0 {
        return Err(DocsearchError::configuration(
            "chunk_words must be > 0",
        ));
    }
    if settings.chunk_overlap_words >= settings.chunk_words {
        return Err(DocsearchError::configuration(
            "chunk_overlap_words must be < chunk_words",
        ));
    }
    if settings.router_max_docsets == 0 {
        return Err(DocsearchError::configuration(
            "router_max_docsets must be > 0",
        ));
    }
    if settings.results_top_k == 0 {
        return Err(DocsearchError::configuration(
            "results_top_k must be > 0",
        ));
    }
    if settings.bm25_top_k == 0 {
        return Err(DocsearchError::configuration("bm25_top_k must be > 0"));
    }
    if settings.vector_top_k == 0 {
        return Err(DocsearchError::configuration("vector_top_k must be > 0"));
    }
    if settings.embedding_model.trim().is_empty() {
        return Err(DocsearchError::configuration(
            "embedding_model must not be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(validate(&Settings::default()).is_ok());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let mut settings = Settings::default();
        settings.chunk_overlap_words = settings.chunk_words;
        let err = validate(&settings).unwrap_err();
        assert!(err.to_string().contains("chunk_overlap_words"));
    }

    #[test]
    fn zero_results_top_k_is_rejected() {
        let mut settings = Settings::default();
        settings.results_top_k = 0;
        assert!(validate(&settings).is_err());
    }
}
