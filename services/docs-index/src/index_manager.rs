//! Holds the live, immutable [`IndexState`] and exposes the operations a
//! transport layer calls: `ensure_ready`, `reindex`, `search`, `open`,
//! `asset_path`, `docsets`.
//!
//! Two locks guard the mutable parts: `build_lock` serializes reindex
//! attempts, `embed_lock` serializes calls into the (possibly
//! non-thread-safe) embedder. Readers take an `Arc` snapshot of the
//! current state and never block each other or a concurrent build.

use crate::assets::safe_resolve_under_root;
use crate::build::build_docset_index;
use crate::embedding::{l2_normalize, Embedder};
use crate::ids::sha1_short;
use crate::model::{Asset, DocSection, Docset, IndexState};
use crate::registry::load_docsets;
use crate::retrieval::{search_selected, SearchResultItem};
use crate::router::{route_docsets, RoutingDecision, SearchContext};
use crate::snapshot::{load_snapshot, save_snapshot, snapshot_signature, LoadOutcome};
use docsearch_config::Settings;
use docsearch_core::{DocsearchError, Result};
use docsearch_search::{tokenize, BoundedCache, EMBEDDING_CACHE_CAPACITY, QUERY_CACHE_CAPACITY};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

pub struct SearchResponse {
    pub routing: RoutingDecision,
    pub results: Vec<SearchResultItem>,
}

/// An asset with its `src` resolved into a fetchable `/asset?...` URL, for
/// transport layers that expose one. `url` is `None` for assets whose
/// `path` did not resolve (external/data URLs, or paths escaping the root).
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedAsset {
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub url: Option<String>,
}

/// The full result of `open(doc_ref)`: the section, its docset's version,
/// and its assets with transport-ready URLs.
#[derive(Debug, Clone, Serialize)]
pub struct OpenedSection {
    pub section: DocSection,
    pub version: Option<String>,
    pub assets: Vec<ResolvedAsset>,
}

fn asset_url(docset_id: &str, asset: &Asset) -> Option<String> {
    asset.path.as_ref().map(|path| {
        format!(
            "/asset?docset_id={}&path={}",
            utf8_percent_encode(docset_id, NON_ALPHANUMERIC),
            utf8_percent_encode(path, NON_ALPHANUMERIC),
        )
    })
}

#[derive(Clone)]
struct CacheKey {
    revision: u64,
    query: String,
    source_hint: String,
    language: String,
    dependencies: Vec<String>,
    stacktrace_digest: String,
    top_k: usize,
}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.revision.hash(state);
        self.query.hash(state);
        self.source_hint.hash(state);
        self.language.hash(state);
        self.dependencies.hash(state);
        self.stacktrace_digest.hash(state);
        self.top_k.hash(state);
    }
}
impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.revision == other.revision
            && self.query == other.query
            && self.source_hint == other.source_hint
            && self.language == other.language
            && self.dependencies == other.dependencies
            && self.stacktrace_digest == other.stacktrace_digest
            && self.top_k == other.top_k
    }
}
impl Eq for CacheKey {}

#[derive(Clone)]
struct CachedSearch {
    routing: RoutingDecision,
    results: Vec<SearchResultItem>,
}

/// The process-lifetime mediator around `IndexState`. Own one of these per
/// service instance; do not treat the state it guards as truly global.
pub struct IndexManager {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    state: RwLock<Option<Arc<IndexState>>>,
    build_lock: Mutex<()>,
    embed_lock: Mutex<()>,
    query_cache: BoundedCache<CacheKey, CachedSearch>,
    embedding_cache: BoundedCache<String, Vec<f32>>,
}

impl IndexManager {
    pub fn new(settings: Settings, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            settings,
            embedder,
            state: RwLock::new(None),
            build_lock: Mutex::new(()),
            embed_lock: Mutex::new(()),
            query_cache: BoundedCache::new(QUERY_CACHE_CAPACITY),
            embedding_cache: BoundedCache::new(EMBEDDING_CACHE_CAPACITY),
        }
    }

    fn current_state(&self) -> Option<Arc<IndexState>> {
        self.state.read().unwrap().clone()
    }

    /// Builds the index if none is held yet: tries a snapshot first, then
    /// falls back to a full build if `auto_index` is on. Fails hard if
    /// `auto_index` is off and no usable snapshot exists.
    pub fn ensure_ready(&self) -> Result<()> {
        if self.current_state().is_some() {
            return Ok(());
        }
        let _guard = self.build_lock.lock().unwrap();
        if self.current_state().is_some() {
            return Ok(());
        }

        if let Some(snapshot_path) = &self.settings.snapshot_path {
            let signature = snapshot_signature(
                &self.settings.registry_path,
                &self.settings.embedding_model,
                self.settings.chunk_words,
                self.settings.chunk_overlap_words,
            )?;
            match load_snapshot(snapshot_path, &signature)? {
                LoadOutcome::Loaded(state) => {
                    tracing::info!(path = %snapshot_path.display(), revision = state.revision, "index_snapshot_loaded");
                    self.publish(state);
                    return Ok(());
                }
                LoadOutcome::Missing if !self.settings.auto_index => {
                    tracing::warn!(path = %snapshot_path.display(), "index_snapshot_missing");
                    return Err(DocsearchError::not_ready(format!(
                        "index snapshot not found: {}",
                        snapshot_path.display()
                    )));
                }
                LoadOutcome::Stale if !self.settings.auto_index => {
                    tracing::warn!(path = %snapshot_path.display(), "index_snapshot_stale");
                    return Err(DocsearchError::stale(format!(
                        "index snapshot signature mismatch: {}",
                        snapshot_path.display()
                    )));
                }
                LoadOutcome::Missing => tracing::info!(path = %snapshot_path.display(), "index_snapshot_missing"),
                LoadOutcome::Stale => tracing::info!(path = %snapshot_path.display(), "index_snapshot_stale"),
            }
        } else if !self.settings.auto_index {
            return Err(DocsearchError::not_ready(
                "no index built yet and auto_index is disabled",
            ));
        }

        self.reindex_locked(None)
    }

    /// Reloads the registry and rebuilds the requested docsets (or all of
    /// them when `docset_ids` is `None`), carrying over untouched docsets
    /// from the prior state. Publishes a new `IndexState` with
    /// `revision = prev + 1` only if every targeted build succeeds.
    pub fn reindex(&self, docset_ids: Option<&[String]>) -> Result<()> {
        let _guard = self.build_lock.lock().unwrap();
        self.reindex_locked(docset_ids)
    }

    fn reindex_locked(&self, docset_ids: Option<&[String]>) -> Result<()> {
        let started = std::time::Instant::now();
        let docsets = load_docsets(&self.settings.registry_path)?;
        let enabled: Vec<Docset> = docsets.into_iter().filter(|d| d.enabled).collect();
        if enabled.is_empty() {
            return Err(DocsearchError::configuration("no enabled docsets in registry"));
        }

        if let Some(ids) = docset_ids {
            let enabled_ids: std::collections::HashSet<&str> =
                enabled.iter().map(|d| d.docset_id.as_str()).collect();
            let unknown: Vec<&String> = ids.iter().filter(|id| !enabled_ids.contains(id.as_str())).collect();
            if !unknown.is_empty() {
                return Err(DocsearchError::bad_input(format!(
                    "unknown or disabled docsets: {unknown:?}"
                )));
            }
        }

        let previous = self.current_state();
        let mut indexes = std::collections::HashMap::new();
        let mut doc_ref_to_docset = std::collections::HashMap::new();

        for docset in &enabled {
            let needs_rebuild = docset_ids.map(|ids| ids.contains(&docset.docset_id)).unwrap_or(true);
            let index = if !needs_rebuild {
                previous
                    .as_ref()
                    .and_then(|p| p.indexes.get(&docset.docset_id))
                    .cloned()
            } else {
                None
            };
            let index = match index {
                Some(index) => index,
                None => {
                    let _guard = self.embed_lock.lock().unwrap();
                    build_docset_index(
                        docset,
                        self.settings.chunk_words,
                        self.settings.chunk_overlap_words,
                        self.embedder.as_ref(),
                    )?
                }
            };
            for chunk in &index.chunks {
                doc_ref_to_docset.insert(chunk.doc_ref.clone(), docset.docset_id.clone());
            }
            indexes.insert(docset.docset_id.clone(), index);
        }

        let revision = previous.as_ref().map(|p| p.revision).unwrap_or(0) + 1;
        let state = IndexState {
            revision,
            docsets: enabled.iter().map(|d| (d.docset_id.clone(), d.clone())).collect(),
            indexes,
            doc_ref_to_docset,
        };

        let chunk_total: usize = state.indexes.values().map(|i| i.chunks.len()).sum();
        self.publish(state);

        if let Some(snapshot_path) = &self.settings.snapshot_path {
            let signature = snapshot_signature(
                &self.settings.registry_path,
                &self.settings.embedding_model,
                self.settings.chunk_words,
                self.settings.chunk_overlap_words,
            )?;
            let state = self.current_state().unwrap();
            save_snapshot(snapshot_path, &state, &signature)?;
            tracing::info!(path = %snapshot_path.display(), revision = state.revision, "index_snapshot_saved");
        }

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            docsets = enabled.len(),
            chunks_total = chunk_total,
            "reindex_done"
        );
        Ok(())
    }

    fn publish(&self, state: IndexState) {
        let mut guard = self.state.write().unwrap();
        *guard = Some(Arc::new(state));
        drop(guard);
        self.query_cache.clear();
        self.embedding_cache.clear();
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let _guard = self.embed_lock.lock().unwrap();
        self.embedder.embed(texts)
    }

    fn embed_query_cached(&self, query: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.embedding_cache.get(&query.to_string()) {
            return Ok(cached);
        }
        let mut vectors = self.embed_texts(&[query.to_string()])?;
        let mut vector = vectors.pop().unwrap_or_default();
        l2_normalize(&mut vector);
        self.embedding_cache.put(query.to_string(), vector.clone());
        Ok(vector)
    }

    pub fn docsets(&self) -> Result<Vec<Docset>> {
        self.ensure_ready()?;
        let state = self.current_state().expect("state present after ensure_ready");
        let mut docsets: Vec<Docset> = state.docsets.values().cloned().collect();
        docsets.sort_by(|a, b| a.docset_id.cmp(&b.docset_id));
        Ok(docsets)
    }

    /// Lists docsets straight from the registry file, bypassing the built
    /// state entirely (no reindex required).
    pub fn registry_docsets(&self) -> Result<Vec<Docset>> {
        load_docsets(&self.settings.registry_path)
    }

    pub fn search(
        &self,
        query: &str,
        source_hint: Option<&str>,
        context: Option<&SearchContext>,
        top_k: Option<usize>,
    ) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(DocsearchError::bad_input("query must not be empty"));
        }
        self.ensure_ready()?;
        let state = self.current_state().expect("state present after ensure_ready");

        let mut deps: Vec<String> = context
            .map(|c| c.dependencies.iter().map(|d| d.to_lowercase()).collect())
            .unwrap_or_default();
        deps.sort();
        let language = context.and_then(|c| c.language.clone()).unwrap_or_default();
        let stacktrace_digest = context
            .and_then(|c| c.stacktrace.as_deref())
            .map(|s| sha1_short(s, 12))
            .unwrap_or_default();
        let requested_top_k = top_k.unwrap_or(0).min(20);
        let key = CacheKey {
            revision: state.revision,
            query: query.to_string(),
            source_hint: source_hint.unwrap_or_default().to_string(),
            language,
            dependencies: deps,
            stacktrace_digest,
            top_k: requested_top_k,
        };

        if let Some(cached) = self.query_cache.get(&key) {
            return Ok(SearchResponse {
                routing: cached.routing,
                results: cached.results,
            });
        }

        let started = std::time::Instant::now();
        let docsets: Vec<Docset> = state.docsets.values().cloned().collect();
        let routing = route_docsets(&docsets, query, source_hint, context, self.settings.router_max_docsets);
        if routing.selected_docsets.is_empty() {
            return Err(DocsearchError::not_ready("no docsets selected"));
        }

        let query_tokens = tokenize(query);
        let query_vec = self.embed_query_cached(query)?;
        let k = if requested_top_k > 0 {
            requested_top_k
        } else {
            self.settings.results_top_k
        };
        let results = search_selected(
            query,
            &query_tokens,
            &query_vec,
            &routing.selected_docsets,
            &state,
            self.settings.bm25_top_k,
            self.settings.vector_top_k,
            k,
        );

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            query_len = query.len(),
            selected_docsets = ?routing.selected_docsets,
            results = results.len(),
            "search_done"
        );

        self.query_cache.put(
            key,
            CachedSearch {
                routing: routing.clone(),
                results: results.clone(),
            },
        );

        Ok(SearchResponse { routing, results })
    }

    pub fn open(&self, doc_ref: &str) -> Result<OpenedSection> {
        self.ensure_ready()?;
        let state = self.current_state().expect("state present after ensure_ready");
        let docset_id = state
            .doc_ref_to_docset
            .get(doc_ref)
            .ok_or_else(|| DocsearchError::not_found(format!("unknown doc_ref: {doc_ref}")))?;
        let index = &state.indexes[docset_id];
        let chunk = index
            .chunk_for_doc_ref(doc_ref)
            .ok_or_else(|| DocsearchError::not_found(format!("unknown doc_ref: {doc_ref}")))?;
        let section = index
            .sections
            .get(&chunk.section_ref)
            .cloned()
            .ok_or_else(|| DocsearchError::not_found(format!("unknown doc_ref: {doc_ref}")))?;

        let assets = section
            .assets
            .iter()
            .map(|asset| ResolvedAsset {
                alt: asset.alt.clone(),
                caption: asset.caption.clone(),
                url: asset_url(docset_id, asset),
            })
            .collect();

        Ok(OpenedSection {
            version: index.docset.version.clone(),
            section,
            assets,
        })
    }

    pub fn asset_path(&self, docset_id: &str, relative_path: &str) -> Result<PathBuf> {
        self.ensure_ready()?;
        let state = self.current_state().expect("state present after ensure_ready");
        let docset = state
            .docsets
            .get(docset_id)
            .ok_or_else(|| DocsearchError::not_found(format!("unknown docset_id: {docset_id}")))?;
        let target = safe_resolve_under_root(&docset.root_path, relative_path)?;
        if !target.is_file() {
            return Err(DocsearchError::not_found("asset not found"));
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    fn manager_with_one_docset(dir: &std::path::Path) -> IndexManager {
        std::fs::write(
            dir.join("guide.html"),
            "<main><h2>Intro</h2><p>hello world about pandas</p><img src=\"img/a.png\"></main>",
        )
        .unwrap();
        std::fs::create_dir_all(dir.join("img")).unwrap();
        std::fs::write(dir.join("img/a.png"), b"fake-png").unwrap();

        let registry_path = dir.join("docsets.toml");
        std::fs::write(
            &registry_path,
            format!(
                "[[docsets]]\ndocset_id = \"docs\"\nroot_path = \"{}\"\nkeywords = [\"pandas\"]\n",
                dir.display()
            ),
        )
        .unwrap();

        let settings = Settings {
            registry_path,
            snapshot_path: None,
            ..Settings::default()
        };
        IndexManager::new(settings, Arc::new(HashingEmbedder::new(8)))
    }

    #[test]
    fn search_finds_indexed_content() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_one_docset(dir.path());
        let response = manager.search("pandas", None, None, None).unwrap();
        assert!(!response.results.is_empty());
        assert_eq!(response.results[0].docset_id, "docs");
    }

    #[test]
    fn empty_query_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_one_docset(dir.path());
        assert!(manager.search("   ", None, None, None).is_err());
    }

    #[test]
    fn revision_increases_on_each_reindex() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_one_docset(dir.path());
        manager.ensure_ready().unwrap();
        let first = manager.current_state().unwrap().revision;
        manager.reindex(None).unwrap();
        let second = manager.current_state().unwrap().revision;
        assert!(second > first);
    }

    #[test]
    fn open_resolves_asset_urls() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_one_docset(dir.path());
        let response = manager.search("pandas", None, None, None).unwrap();
        let doc_ref = &response.results[0].doc_ref;
        let opened = manager.open(doc_ref).unwrap();
        assert_eq!(opened.assets.len(), 1);
        assert!(opened.assets[0].url.as_ref().unwrap().starts_with("/asset?docset_id=docs&path="));
    }

    #[test]
    fn asset_path_resolves_existing_file_and_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_one_docset(dir.path());
        manager.ensure_ready().unwrap();
        assert!(manager.asset_path("docs", "img/a.png").is_ok());
        assert!(manager.asset_path("docs", "../etc/passwd").is_err());
    }

    #[test]
    fn reindexing_unknown_docset_id_is_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_one_docset(dir.path());
        manager.ensure_ready().unwrap();
        let result = manager.reindex(Some(&["missing".to_string()]));
        assert!(result.is_err());
    }
}
