//! Immutable domain records. Nothing here mutates after construction; a
//! reindex builds a whole new [`IndexState`] and swaps it in atomically.

use docsearch_search::Bm25Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Docset {
    pub docset_id: String,
    pub root_path: PathBuf,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub version: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
    /// Normalized POSIX path relative to the docset root, or `None` if the
    /// source is external or escapes the root.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocSection {
    pub section_ref: String,
    pub docset_id: String,
    /// POSIX path relative to the docset root.
    pub file_path: String,
    pub anchor: String,
    pub heading_path: Vec<String>,
    pub text: String,
    pub code_blocks: Vec<String>,
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub doc_ref: String,
    pub section_ref: String,
    pub chunk_index: usize,
    pub text: String,
}

/// Everything needed to search one docset: parsed sections, the ordered
/// chunk list (BM25 rows and embedding rows line up with it 1:1), and a
/// `doc_ref -> chunk index` lookup.
#[derive(Clone, Serialize, Deserialize)]
pub struct DocsetIndex {
    pub docset: Docset,
    pub sections: HashMap<String, DocSection>,
    pub chunks: Vec<Chunk>,
    pub doc_ref_to_chunk_index: HashMap<String, usize>,
    pub bm25: Bm25Index,
    /// One L2-normalized row per chunk, in `chunks` order; `embeddings.nrows()
    /// == chunks.len()`.
    pub embeddings: Array2<f32>,
}

impl DocsetIndex {
    pub fn chunk_for_doc_ref(&self, doc_ref: &str) -> Option<&Chunk> {
        self.doc_ref_to_chunk_index
            .get(doc_ref)
            .map(|&i| &self.chunks[i])
    }
}

/// The live, queryable snapshot of the whole service. Replaced wholesale on
/// every successful reindex; never mutated in place.
#[derive(Clone, Serialize, Deserialize)]
pub struct IndexState {
    pub revision: u64,
    pub docsets: HashMap<String, Docset>,
    pub indexes: HashMap<String, DocsetIndex>,
    pub doc_ref_to_docset: HashMap<String, String>,
}

impl IndexState {
    pub fn docset_ids_sorted(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.docsets.keys().cloned().collect();
        ids.sort();
        ids
    }
}
