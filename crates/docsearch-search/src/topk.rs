//! argpartition-style top-k selection over a score slice.

/// Indices of the `k` largest scores, sorted by descending score with ties
/// broken by ascending index. When `k >= scores.len()` every index is
/// returned, fully sorted (no partitioning needed).
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    let n = scores.len();
    if k == 0 || n == 0 {
        return Vec::new();
    }

    let cmp = |&a: &usize, &b: &usize| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    };

    if k >= n {
        let mut idx: Vec<usize> = (0..n).collect();
        idx.sort_by(cmp);
        return idx;
    }

    let mut idx: Vec<usize> = (0..n).collect();
    // Partial selection: partition so the top `k` (by score) land in the
    // first `k` slots, then fully sort just that prefix. Mirrors
    // numpy's `argpartition(-scores, k-1)[:k]` followed by a sort.
    idx.select_nth_unstable_by(k - 1, cmp);
    let mut top = idx[..k].to_vec();
    top.sort_by(cmp);
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_all_sorted_when_k_exceeds_len() {
        let scores = vec![0.1, 0.9, 0.5];
        assert_eq!(top_k_indices(&scores, 10), vec![1, 2, 0]);
    }

    #[test]
    fn selects_top_k_with_ascending_tie_break() {
        let scores = vec![1.0, 1.0, 0.5, 2.0, 0.0];
        assert_eq!(top_k_indices(&scores, 3), vec![3, 0, 1]);
    }

    #[test]
    fn k_zero_or_empty_yields_nothing() {
        assert!(top_k_indices(&[1.0, 2.0], 0).is_empty());
        assert!(top_k_indices(&[], 3).is_empty());
    }
}
