//! Indexing, routing, and hybrid retrieval engine for local documentation
//! sets.
//!
//! This crate owns the whole pipeline from "registry of docsets on disk" to
//! "ranked search results": parsing HTML/Markdown/plain text into sections,
//! chunking and embedding them, routing a query to the right docsets, and
//! fusing BM25 with dense-vector scores. [`IndexManager`] is the entry
//! point; everything else is a building block it composes.

pub mod assets;
pub mod build;
pub mod embedding;
pub mod ids;
pub mod index_manager;
pub mod model;
pub mod parser;
pub mod registry;
pub mod retrieval;
pub mod router;
pub mod snapshot;

pub use assets::{resolve_assets, safe_resolve_under_root};
pub use embedding::{Embedder, HashingEmbedder};
pub use index_manager::{IndexManager, OpenedSection, ResolvedAsset, SearchResponse};
pub use model::{Asset, Chunk, DocSection, Docset, DocsetIndex, IndexState};
pub use registry::load_docsets;
pub use retrieval::{SearchResultItem, Snippet};
pub use router::{route_docsets, RoutingDecision, SearchContext};
