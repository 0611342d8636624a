//! Per-docset index construction: walk files, parse, chunk, build the BM25
//! corpus, and embed.

use crate::embedding::{l2_normalize, stack_rows, Embedder};
use crate::ids::doc_ref;
use crate::model::{Chunk, Docset, DocsetIndex};
use crate::parser::parse_doc_file;
use docsearch_core::{DocsearchError, Result};
use docsearch_search::{chunk_words, tokenize, Bm25Index};
use std::collections::HashMap;

const DOC_EXTENSIONS: [&str; 5] = ["html", "htm", "md", "markdown", "txt"];
const DENSE_INPUT_MAX_CHARS: usize = 4000;

/// Builds a complete [`DocsetIndex`] for `docset`: parses every eligible
/// file under its root, chunks each section, and produces both the BM25
/// corpus and the dense embedding matrix for the resulting chunks.
pub fn build_docset_index(
    docset: &Docset,
    chunk_max_words: usize,
    chunk_overlap_words: usize,
    embedder: &dyn Embedder,
) -> Result<DocsetIndex> {
    let mut sections = HashMap::new();
    let mut chunks = Vec::new();
    let mut doc_ref_to_chunk_index = HashMap::new();

    for path in iter_doc_files(&docset.root_path)? {
        let rel_path = path
            .strip_prefix(&docset.root_path)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        let file_sections = parse_doc_file(&docset.docset_id, &rel_path, &path)?;
        for section in file_sections {
            let chunk_texts = chunk_words(&section.text, chunk_max_words, chunk_overlap_words);
            for (idx, chunk_text) in chunk_texts.into_iter().enumerate() {
                let cref = doc_ref(&docset.docset_id, &section.section_ref, idx);
                doc_ref_to_chunk_index.insert(cref.clone(), chunks.len());
                chunks.push(Chunk {
                    doc_ref: cref,
                    section_ref: section.section_ref.clone(),
                    chunk_index: idx,
                    text: chunk_text,
                });
            }
            sections.insert(section.section_ref.clone(), section);
        }
    }

    if chunks.is_empty() {
        return Err(DocsearchError::bad_input(format!(
            "no chunks produced for docset {}",
            docset.docset_id
        )));
    }

    let mut bm25_corpus = Vec::with_capacity(chunks.len());
    let mut embed_inputs = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let section = &sections[&chunk.section_ref];
        let heading = section.heading_path.join(" > ");
        let code = section
            .code_blocks
            .iter()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n");
        let combined = [heading.as_str(), chunk.text.as_str(), code.as_str()]
            .join("\n\n")
            .trim()
            .to_string();
        bm25_corpus.push(tokenize(&combined));
        let truncated: String = combined.chars().take(DENSE_INPUT_MAX_CHARS).collect();
        embed_inputs.push(truncated);
    }

    let bm25 = Bm25Index::build(&bm25_corpus);
    let mut raw_embeddings = embedder.embed(&embed_inputs)?;
    for row in raw_embeddings.iter_mut() {
        l2_normalize(row);
    }
    let embeddings = stack_rows(raw_embeddings, embedder.dimension())?;

    Ok(DocsetIndex {
        docset: docset.clone(),
        sections,
        chunks,
        doc_ref_to_chunk_index,
        bm25,
        embeddings,
    })
}

fn iter_doc_files(root: &std::path::Path) -> Result<Vec<std::path::PathBuf>> {
    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter() {
        let entry = entry.map_err(|e| DocsearchError::internal(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if DOC_EXTENSIONS.contains(&ext.as_str()) {
            paths.push(entry.path().to_path_buf());
        }
    }
    paths.sort();
    Ok(paths)
}
