//! Hand-rolled retrieval primitives: tokenization/chunking, BM25, top-k
//! selection, score fusion, and bounded LRU caches.
//!
//! These are pure, allocation-cheap building blocks with no knowledge of
//! docsets, files, or persistence; `docs-index` composes them into the
//! full indexing/retrieval pipeline.
pub mod bm25;
pub mod cache;
pub mod fusion;
pub mod text;
pub mod topk;

pub use bm25::Bm25Index;
pub use cache::{BoundedCache, EMBEDDING_CACHE_CAPACITY, QUERY_CACHE_CAPACITY};
pub use fusion::{fuse, min_max_normalize, BM25_WEIGHT, VECTOR_WEIGHT};
pub use text::{chunk_words, normalize_whitespace, tokenize};
pub use topk::top_k_indices;
