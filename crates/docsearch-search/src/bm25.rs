//! Okapi BM25 over a fixed, pre-tokenized corpus.
//!
//! One `Bm25Index` is built per docset from the tokenized chunk corpus and
//! kept alongside the dense embeddings matrix; row `i` here always refers
//! to the same chunk as row `i` of the embeddings matrix.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const K1: f32 = 1.5;
const B: f32 = 0.75;

#[derive(Clone, Serialize, Deserialize)]
pub struct Bm25Index {
    /// document frequency per term
    doc_freq: HashMap<String, u32>,
    /// term frequencies per document, keyed by term
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f32,
    num_docs: usize,
}

impl Bm25Index {
    pub fn build(corpus: &[Vec<String>]) -> Self {
        let num_docs = corpus.len();
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        let mut term_freqs = Vec::with_capacity(num_docs);
        let mut doc_lens = Vec::with_capacity(num_docs);
        let mut total_len = 0usize;

        for doc in corpus {
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for term in doc {
                *freqs.entry(term.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += doc.len();
            doc_lens.push(doc.len());
            term_freqs.push(freqs);
        }

        let avg_doc_len = if num_docs == 0 {
            0.0
        } else {
            total_len as f32 / num_docs as f32
        };

        Self {
            doc_freq,
            term_freqs,
            doc_lens,
            avg_doc_len,
            num_docs,
        }
    }

    fn idf(&self, term: &str) -> f32 {
        let n = self.num_docs as f32;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f32;
        // Robertson/Sparck-Jones IDF with the standard +1 smoothing, as used
        // by rank_bm25's `BM25Okapi`.
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Scores every document in the corpus against `query_tokens`, in
    /// corpus order.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
        let mut out = vec![0.0f32; self.num_docs];
        if self.num_docs == 0 {
            return out;
        }
        for term in query_tokens {
            let idf = self.idf(term);
            if idf == 0.0 {
                continue;
            }
            for (i, freqs) in self.term_freqs.iter().enumerate() {
                let tf = match freqs.get(term) {
                    Some(&tf) => tf as f32,
                    None => continue,
                };
                let doc_len = self.doc_lens[i] as f32;
                let denom = tf + K1 * (1.0 - B + B * doc_len / self.avg_doc_len.max(1.0));
                out[i] += idf * (tf * (K1 + 1.0)) / denom;
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.num_docs
    }

    pub fn is_empty(&self) -> bool {
        self.num_docs == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    #[test]
    fn exact_token_match_scores_highest() {
        let corpus = vec![
            tokenize("pandas dataframe merge how to"),
            tokenize("completely unrelated topic about rocks"),
        ];
        let index = Bm25Index::build(&corpus);
        let scores = index.scores(&tokenize("pandas"));
        assert!(scores[0] > scores[1]);
        assert!(scores[0] > 0.0);
    }

    #[test]
    fn empty_corpus_yields_no_scores() {
        let index = Bm25Index::build(&[]);
        assert!(index.is_empty());
        assert!(index.scores(&tokenize("anything")).is_empty());
    }
}
