use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_registry_path() -> PathBuf {
    PathBuf::from("docsets.toml")
}

fn default_embedding_model() -> String {
    "intfloat/multilingual-e5-small".to_string()
}

fn default_embedding_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docsearch")
        .join("embeddings")
}

fn default_chunk_words() -> usize {
    280
}

fn default_chunk_overlap_words() -> usize {
    60
}

fn default_router_max_docsets() -> usize {
    3
}

fn default_bm25_top_k() -> usize {
    20
}

fn default_vector_top_k() -> usize {
    20
}

fn default_results_top_k() -> usize {
    8
}

fn default_true() -> bool {
    true
}

/// Every knob the index manager and router need, layered from defaults,
/// an optional TOML file, and `DOCSEARCH_`-prefixed environment variables
/// (highest precedence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the registry TOML file listing docsets.
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// Bearer token checked by the transport layer. Never consulted by the
    /// core library itself; carried here only because it is sourced the
    /// same way as everything else.
    #[serde(default)]
    pub token: Option<String>,

    /// Name of the embedding model the injected embedder is expected to
    /// serve. Opaque to this crate; forwarded to the embedder.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Directory the embedding cache persists vectors under.
    #[serde(default = "default_embedding_cache_dir")]
    pub embedding_cache_dir: PathBuf,

    /// Where the index snapshot is read from and written to. `None` means
    /// snapshots are disabled: every start performs a full reindex.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,
    #[serde(default = "default_chunk_overlap_words")]
    pub chunk_overlap_words: usize,

    #[serde(default = "default_router_max_docsets")]
    pub router_max_docsets: usize,
    #[serde(default = "default_bm25_top_k")]
    pub bm25_top_k: usize,
    #[serde(default = "default_vector_top_k")]
    pub vector_top_k: usize,
    #[serde(default = "default_results_top_k")]
    pub results_top_k: usize,

    /// When true, a stale or missing snapshot triggers an automatic
    /// reindex instead of a hard error.
    #[serde(default = "default_true")]
    pub auto_index: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            token: None,
            embedding_model: default_embedding_model(),
            embedding_cache_dir: default_embedding_cache_dir(),
            snapshot_path: None,
            chunk_words: default_chunk_words(),
            chunk_overlap_words: default_chunk_overlap_words(),
            router_max_docsets: default_router_max_docsets(),
            bm25_top_k: default_bm25_top_k(),
            vector_top_k: default_vector_top_k(),
            results_top_k: default_results_top_k(),
            auto_index: default_true(),
        }
    }
}
