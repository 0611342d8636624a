//! Per-docset candidate retrieval, cross-docset score fusion, and result
//! rendering.

use crate::model::{Chunk, DocSection, Docset, IndexState};
use docsearch_search::{fuse, top_k_indices};
use ndarray::ArrayView1;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct Candidate {
    doc_ref: String,
    docset: Docset,
    section: DocSection,
    chunk: Chunk,
    bm25_score: f32,
    vector_score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snippet {
    pub text: String,
    pub code_blocks: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    pub doc_ref: String,
    pub docset_id: String,
    pub title: String,
    pub heading_path: Vec<String>,
    pub file_path: String,
    pub anchor: String,
    pub url: String,
    pub snippet: Snippet,
    pub score: f32,
    pub version: Option<String>,
}

/// Gathers top-`bm25_top_k`/`vector_top_k` candidates per selected docset,
/// merging duplicate `doc_ref`s (shouldn't happen given the per-docset id
/// prefix, but handled defensively) by elementwise max.
fn retrieve_candidates(
    query_tokens: &[String],
    query_vec: &[f32],
    selected_docset_ids: &[String],
    state: &IndexState,
    bm25_top_k: usize,
    vector_top_k: usize,
) -> Vec<Candidate> {
    let mut all_candidates: BTreeMap<String, Candidate> = BTreeMap::new();

    for docset_id in selected_docset_ids {
        let Some(index) = state.indexes.get(docset_id) else {
            continue;
        };
        let bm25_scores = index.bm25.scores(query_tokens);
        let bm25_k = bm25_top_k.min(bm25_scores.len());
        let bm25_idx = top_k_indices(&bm25_scores, bm25_k);

        let query_view = ArrayView1::from(query_vec);
        let vec_scores: Vec<f32> = index.embeddings.dot(&query_view).to_vec();
        let vec_k = vector_top_k.min(vec_scores.len());
        let vec_idx = top_k_indices(&vec_scores, vec_k);

        let mut candidate_indices: Vec<usize> = bm25_idx;
        for i in vec_idx {
            if !candidate_indices.contains(&i) {
                candidate_indices.push(i);
            }
        }

        for i in candidate_indices {
            let chunk = &index.chunks[i];
            let section = &index.sections[&chunk.section_ref];
            let bm25_s = bm25_scores[i];
            let vec_s = vec_scores[i];
            all_candidates
                .entry(chunk.doc_ref.clone())
                .and_modify(|existing| {
                    existing.bm25_score = existing.bm25_score.max(bm25_s);
                    existing.vector_score = existing.vector_score.max(vec_s);
                })
                .or_insert_with(|| Candidate {
                    doc_ref: chunk.doc_ref.clone(),
                    docset: index.docset.clone(),
                    section: section.clone(),
                    chunk: chunk.clone(),
                    bm25_score: bm25_s,
                    vector_score: vec_s,
                });
        }
    }

    all_candidates.into_values().collect()
}

fn rerank_candidates(candidates: Vec<Candidate>) -> Vec<SearchResultItem> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let bm25: Vec<f32> = candidates.iter().map(|c| c.bm25_score).collect();
    let vector: Vec<f32> = candidates.iter().map(|c| c.vector_score).collect();
    let fused = fuse(&bm25, &vector);

    let mut scored: Vec<(f32, Candidate)> = fused.into_iter().zip(candidates).collect();
    // Ties (e.g. the all-zero-axis fusion collapse) break on doc_ref so
    // top-k is reproducible across runs rather than depending on iteration
    // order of the candidate collection.
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.doc_ref.cmp(&b.1.doc_ref))
    });

    scored
        .into_iter()
        .map(|(score, c)| render_result(score, c))
        .collect()
}

fn render_result(score: f32, c: Candidate) -> SearchResultItem {
    let title = c
        .section
        .heading_path
        .last()
        .cloned()
        .unwrap_or_else(|| "Untitled".to_string());
    let abs_path = c.docset.root_path.join(&c.section.file_path);
    let url = format!("file://{}{}", abs_path.display(), c.section.anchor);
    let snippet_text = truncate_words(&c.chunk.text, 90);
    let snippet_code = c
        .section
        .code_blocks
        .first()
        .map(|code| vec![truncate_code(code, 1200)])
        .unwrap_or_default();

    SearchResultItem {
        doc_ref: c.doc_ref,
        docset_id: c.docset.docset_id,
        title,
        heading_path: c.section.heading_path,
        file_path: c.section.file_path,
        anchor: c.section.anchor,
        url,
        snippet: Snippet {
            text: snippet_text,
            code_blocks: snippet_code,
        },
        score,
        version: c.docset.version,
    }
}

fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.trim().to_string();
    }
    format!("{}…", words[..max_words].join(" ").trim())
}

fn truncate_code(code: &str, max_chars: usize) -> String {
    let trimmed = code.trim_matches('\n');
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let truncated: String = trimmed.chars().take(max_chars).collect();
    format!("{}\n…", truncated.trim_end())
}

/// Retrieves and fuses candidates from the selected docsets, returning the
/// top `top_k` rendered results.
pub fn search_selected(
    query: &str,
    query_tokens: &[String],
    query_vec: &[f32],
    selected_docset_ids: &[String],
    state: &IndexState,
    bm25_top_k: usize,
    vector_top_k: usize,
    top_k: usize,
) -> Vec<SearchResultItem> {
    let _ = query;
    let candidates = retrieve_candidates(
        query_tokens,
        query_vec,
        selected_docset_ids,
        state,
        bm25_top_k,
        vector_top_k,
    );
    let mut results = rerank_candidates(candidates);
    results.truncate(top_k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::stack_rows;
    use crate::model::{Asset as ModelAsset, DocsetIndex};
    use docsearch_search::{tokenize, Bm25Index};

    fn section(docset_id: &str, section_ref: &str, title: &str, text: &str) -> DocSection {
        DocSection {
            section_ref: section_ref.to_string(),
            docset_id: docset_id.to_string(),
            file_path: format!("{section_ref}.html"),
            anchor: "#".to_string(),
            heading_path: vec![title.to_string()],
            text: text.to_string(),
            code_blocks: Vec::new(),
            assets: Vec::<ModelAsset>::new(),
        }
    }

    /// Builds a single docset with two chunks, `(doc_ref, text, embedding)`
    /// each, so fusion has real spread to normalize over.
    fn two_chunk_docset_state(
        a: (&str, &str, Vec<f32>),
        b: (&str, &str, Vec<f32>),
    ) -> IndexState {
        let docset = Docset {
            docset_id: "docs".to_string(),
            root_path: std::path::PathBuf::from("/docs"),
            tags: Vec::new(),
            keywords: Vec::new(),
            version: None,
            enabled: true,
        };
        let sec_a = section("docs", "sec-a", "A", a.1);
        let sec_b = section("docs", "sec-b", "B", b.1);
        let chunk_a = Chunk {
            doc_ref: a.0.to_string(),
            section_ref: sec_a.section_ref.clone(),
            chunk_index: 0,
            text: a.1.to_string(),
        };
        let chunk_b = Chunk {
            doc_ref: b.0.to_string(),
            section_ref: sec_b.section_ref.clone(),
            chunk_index: 0,
            text: b.1.to_string(),
        };
        let bm25 = Bm25Index::build(&[tokenize(a.1), tokenize(b.1)]);
        let dimension = a.2.len();
        let embeddings = stack_rows(vec![a.2, b.2], dimension).unwrap();
        let mut sections = HashMap::new();
        sections.insert(sec_a.section_ref.clone(), sec_a);
        sections.insert(sec_b.section_ref.clone(), sec_b);
        let mut doc_ref_to_chunk_index = HashMap::new();
        doc_ref_to_chunk_index.insert(a.0.to_string(), 0usize);
        doc_ref_to_chunk_index.insert(b.0.to_string(), 1usize);
        let index = DocsetIndex {
            docset: docset.clone(),
            sections,
            chunks: vec![chunk_a, chunk_b],
            doc_ref_to_chunk_index,
            bm25,
            embeddings,
        };
        let mut indexes = HashMap::new();
        indexes.insert("docs".to_string(), index);
        let mut docsets = HashMap::new();
        docsets.insert("docs".to_string(), docset);
        let mut doc_ref_to_docset = HashMap::new();
        doc_ref_to_docset.insert(a.0.to_string(), "docs".to_string());
        doc_ref_to_docset.insert(b.0.to_string(), "docs".to_string());
        IndexState {
            revision: 1,
            docsets,
            indexes,
            doc_ref_to_docset,
        }
    }

    fn unit(dim: usize, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[axis] = 1.0;
        v
    }

    #[test]
    fn exact_lexical_match_outranks_a_no_dense_signal_peer() {
        // Both chunks are equally (ir)relevant to the query vector, so the
        // vector axis collapses to zero in fusion; only the BM25 axis
        // carries a signal, coming entirely from chunk "a"'s token overlap.
        let state = two_chunk_docset_state(
            ("docs:a", "pandas dataframe merge", unit(2, 0)),
            ("docs:b", "totally unrelated filler text", unit(2, 0)),
        );
        let query_tokens = tokenize("pandas dataframe merge");
        let query_vec = unit(2, 1); // orthogonal to both chunks' embeddings
        let results = search_selected(
            "pandas dataframe merge",
            &query_tokens,
            &query_vec,
            &["docs".to_string()],
            &state,
            20,
            20,
            1,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc_ref, "docs:a");
    }

    #[test]
    fn oracle_dense_match_outranks_a_no_lexical_overlap_peer() {
        // Neither chunk shares any token with the query, so the BM25 axis
        // collapses to zero; only the vector axis carries a signal, coming
        // entirely from chunk "a"'s embedding pointing at the query vector.
        let state = two_chunk_docset_state(
            ("docs:a", "unrelated filler words here", unit(2, 0)),
            ("docs:b", "more unrelated filler words", unit(2, 1)),
        );
        let query_tokens = tokenize("totally different query terms");
        let query_vec = unit(2, 0);
        let results = search_selected(
            "totally different query terms",
            &query_tokens,
            &query_vec,
            &["docs".to_string()],
            &state,
            20,
            20,
            1,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc_ref, "docs:a");
    }

    #[test]
    fn truncate_words_appends_ellipsis_only_when_truncated() {
        assert_eq!(truncate_words("one two three", 90), "one two three");
        let long = (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let truncated = truncate_words(&long, 90);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncated.split_whitespace().count(), 90);
    }

    #[test]
    fn truncate_code_appends_marker_only_when_truncated() {
        assert_eq!(truncate_code("short", 1200), "short");
        let long = "x".repeat(2000);
        let truncated = truncate_code(&long, 1200);
        assert!(truncated.ends_with('\n') == false);
        assert!(truncated.ends_with('…'));
    }
}
