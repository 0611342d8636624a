//! Min-max normalization and weighted-sum fusion of BM25 + dense scores.

/// Weight given to normalized BM25 vs. normalized vector scores in the
/// final fused score. Sums to 1.0.
pub const BM25_WEIGHT: f32 = 0.45;
pub const VECTOR_WEIGHT: f32 = 0.55;

/// Min-max normalize `scores` independently. If the spread is below
/// `1e-6`, every value collapses to zero rather than dividing by
/// (near-)zero.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }
    let min = scores.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if max - min < 1e-6 {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|&s| (s - min) / (max - min)).collect()
}

/// Fuses two parallel score vectors (same length, same candidate order)
/// into final scores via `BM25_WEIGHT * bm25_norm + VECTOR_WEIGHT * vec_norm`.
pub fn fuse(bm25_scores: &[f32], vector_scores: &[f32]) -> Vec<f32> {
    debug_assert_eq!(bm25_scores.len(), vector_scores.len());
    let bm25_norm = min_max_normalize(bm25_scores);
    let vec_norm = min_max_normalize(vector_scores);
    bm25_norm
        .iter()
        .zip(vec_norm.iter())
        .map(|(&b, &v)| BM25_WEIGHT * b + VECTOR_WEIGHT * v)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_spans_zero_to_one() {
        let scores = vec![1.0, 3.0, 5.0, 2.0, 4.0];
        let normalized = min_max_normalize(&scores);
        assert_eq!(normalized[0], 0.0);
        assert_eq!(normalized[2], 1.0);
        assert!((normalized[1] - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn flat_scores_collapse_to_zero() {
        let scores = vec![2.0, 2.0, 2.0];
        assert_eq!(min_max_normalize(&scores), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn fuse_weights_favor_vector_signal() {
        let fused = fuse(&[0.0, 1.0], &[1.0, 0.0]);
        assert!((fused[0] - VECTOR_WEIGHT).abs() < 1e-6);
        assert!((fused[1] - BM25_WEIGHT).abs() < 1e-6);
    }
}
