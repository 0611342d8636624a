//! The dense embedder is an injected capability: this crate never ships a
//! real model. Callers provide an [`Embedder`]; `HashingEmbedder` is a
//! deterministic stand-in useful for tests and for the CLI's offline mode.

use docsearch_core::{DocsearchError, Result};
use ndarray::Array2;
use sha1::{Digest, Sha1};

/// `embed(texts) -> one L2-normalized row per text`. Implementations may
/// be non-thread-safe; the index manager serializes calls behind a single
/// lock, so `&self` (not `&mut self`) plus interior mutability is enough.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimensionality this embedder produces. Used to size empty matrices
    /// without calling `embed` on an empty batch.
    fn dimension(&self) -> usize;
}

/// Deterministic, content-hash-derived embedder. Produces no semantic
/// signal but is stable across runs and processes, which is what the test
/// suite and offline CLI usage need.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| hash_embed(t, self.dimension)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimension];
    let mut counter: u32 = 0;
    let mut filled = 0;
    while filled < dimension {
        let mut hasher = Sha1::new();
        hasher.update(text.as_bytes());
        hasher.update(counter.to_le_bytes());
        let digest = hasher.finalize();
        for chunk in digest.chunks_exact(4) {
            if filled >= dimension {
                break;
            }
            let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            // Map into [-1, 1] so the resulting vectors aren't all-positive.
            vector[filled] = (raw as f32 / u32::MAX as f32) * 2.0 - 1.0;
            filled += 1;
        }
        counter += 1;
    }
    l2_normalize(&mut vector);
    vector
}

pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Stacks L2-normalized embedding rows into a dense matrix, row `i`
/// corresponding to chunk `i`.
pub fn stack_rows(rows: Vec<Vec<f32>>, dimension: usize) -> Result<Array2<f32>> {
    let num_rows = rows.len();
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((num_rows, dimension), flat)
        .map_err(|e| DocsearchError::internal(format!("embedder returned a ragged matrix: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeddings_are_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(16);
        let a = embedder.embed(&["pandas dataframe".to_string()]).unwrap();
        let b = embedder.embed(&["pandas dataframe".to_string()]).unwrap();
        assert_eq!(a, b);
        let norm = a[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn distinct_texts_yield_distinct_vectors() {
        let embedder = HashingEmbedder::new(16);
        let vectors = embedder
            .embed(&["alpha".to_string(), "beta".to_string()])
            .unwrap();
        assert_ne!(vectors[0], vectors[1]);
    }
}
